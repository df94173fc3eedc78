//! Recursive-descent parser from tokens to the closed expression tree.
//!
//! Precedence, loosest to tightest: `or`, `and`, `not`, comparisons,
//! `+`/`-`, `*`/`/`/`%`, unary minus, then method calls and primaries.

use crate::ast::{BinOp, BoolOp, CmpOp, Expr};
use crate::lexer::{tokenize, Token};
use crate::{EvalError, Result};
use tally_core::Value;

/// Parse formula text into an expression tree.
pub fn parse(input: &str) -> Result<Expr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or_expr()?;
    if let Some(extra) = parser.peek() {
        return Err(EvalError::Syntax(format!(
            "unexpected trailing input near {extra:?}"
        )));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token, context: &str) -> Result<()> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(EvalError::Syntax(format!(
                "expected {expected:?} {context}, found {:?}",
                self.peek()
            )))
        }
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let first = self.and_expr()?;
        let mut operands = vec![first];
        while self.eat(&Token::Or) {
            operands.push(self.and_expr()?);
        }
        Ok(collapse_chain(BoolOp::Or, operands))
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let first = self.not_expr()?;
        let mut operands = vec![first];
        while self.eat(&Token::And) {
            operands.push(self.not_expr()?);
        }
        Ok(collapse_chain(BoolOp::And, operands))
    }

    fn not_expr(&mut self) -> Result<Expr> {
        if self.eat(&Token::Not) {
            Ok(Expr::Not(Box::new(self.not_expr()?)))
        } else {
            self.comparison()
        }
    }

    /// Comparison chain: `a < b <= c` evaluates pairwise, like the
    /// formulas' source language.
    fn comparison(&mut self) -> Result<Expr> {
        let first = self.additive()?;
        let mut rest = Vec::new();

        while let Some(op) = self.comparison_op() {
            let right = self.additive()?;
            rest.push((op, right));
        }

        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn comparison_op(&mut self) -> Option<CmpOp> {
        let op = match self.peek()? {
            Token::EqEq => CmpOp::Eq,
            Token::NotEq => CmpOp::Ne,
            Token::Lt => CmpOp::Lt,
            Token::Le => CmpOp::Le,
            Token::Gt => CmpOp::Gt,
            Token::Ge => CmpOp::Ge,
            Token::In => CmpOp::In,
            Token::Not => {
                // `not in` is the only comparison spelled with two tokens.
                if self.tokens.get(self.pos + 1) == Some(&Token::In) {
                    self.pos += 2;
                    return Some(CmpOp::NotIn);
                }
                return None;
            }
            _ => return None,
        };
        self.pos += 1;
        Some(op)
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.eat(&Token::Minus) {
            Ok(Expr::Neg(Box::new(self.unary()?)))
        } else {
            self.postfix()
        }
    }

    /// Primary expression followed by any number of `.method(args)`
    /// suffixes. Bare attribute access (no call) is not in the grammar.
    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;

        while self.eat(&Token::Dot) {
            let name = match self.advance() {
                Some(Token::Ident(name)) => name,
                other => {
                    return Err(EvalError::Syntax(format!(
                        "expected method name after '.', found {other:?}"
                    )))
                }
            };
            self.expect(Token::LParen, "after method name")?;
            let args = self.arguments()?;
            expr = Expr::Method {
                target: Box::new(expr),
                name,
                args,
            };
        }

        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Int(i)) => Ok(Expr::Literal(Value::Int(i))),
            Some(Token::Float(f)) => Ok(Expr::Literal(Value::Float(f))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::Str(s))),
            Some(Token::True) => Ok(Expr::Literal(Value::Bool(true))),
            Some(Token::False) => Ok(Expr::Literal(Value::Bool(false))),
            Some(Token::Null) => Ok(Expr::Literal(Value::Null)),
            Some(Token::LParen) => {
                let inner = self.or_expr()?;
                self.expect(Token::RParen, "to close parenthesized expression")?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LParen) {
                    let args = self.arguments()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            other => Err(EvalError::Syntax(format!(
                "expected expression, found {other:?}"
            ))),
        }
    }

    /// Comma-separated argument list; the opening parenthesis is already
    /// consumed.
    fn arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.or_expr()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(Token::RParen, "to close argument list")?;
            break;
        }
        Ok(args)
    }
}

fn collapse_chain(op: BoolOp, mut operands: Vec<Expr>) -> Expr {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        Expr::BoolChain { op, operands }
    }
}
