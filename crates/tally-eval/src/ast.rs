//! The closed expression tree.
//!
//! Every node kind the evaluator supports is listed here; the walker in
//! [`crate::eval`] matches exhaustively, so the compiler refuses a new
//! node kind without a handler.

use tally_core::Value;

/// Comparison operators, including membership tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

impl CmpOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        }
    }
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }
}

/// `and` / `or` chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// A parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// String, number, boolean, or null literal.
    Literal(Value),

    /// Field reference, resolved against the record at evaluation time.
    Variable(String),

    /// Comparison chain: `a < b < c` holds pairwise left to right.
    Compare {
        first: Box<Expr>,
        rest: Vec<(CmpOp, Expr)>,
    },

    /// `and`/`or` over two or more operands.
    BoolChain { op: BoolOp, operands: Vec<Expr> },

    /// Unary `not`.
    Not(Box<Expr>),

    /// Unary minus.
    Neg(Box<Expr>),

    /// Binary arithmetic.
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Catalog command call: `amount_to_float(amount)`.
    Call { name: String, args: Vec<Expr> },

    /// Whitelisted string method call: `merchant.contains('amazon')`.
    Method {
        target: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Whether this expression is a plain literal (used by the
    /// value-assignment action path). A negated numeric literal counts.
    pub fn as_literal(&self) -> Option<Value> {
        match self {
            Expr::Literal(v) => Some(v.clone()),
            Expr::Neg(inner) => match inner.as_ref() {
                Expr::Literal(Value::Int(i)) => Some(Value::Int(-i)),
                Expr::Literal(Value::Float(f)) => Some(Value::Float(-f)),
                _ => None,
            },
            _ => None,
        }
    }
}
