//! Tokenizer for formula text.

use crate::{EvalError, Result};

/// A single formula token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    In,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
    Dot,
}

/// Tokenize formula text.
///
/// The boolean/null keywords accept both the JSON-style and the
/// capitalized spellings (`true`/`True`, `null`/`None`) because stored
/// formulas use the latter.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\r' | '\n' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '=' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::EqEq);
                } else {
                    return Err(EvalError::Syntax(
                        "assignment is not supported; use '==' for comparison".into(),
                    ));
                }
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::NotEq);
                } else {
                    return Err(EvalError::Syntax("unexpected '!'".into()));
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '\'' | '"' => {
                tokens.push(read_string(&mut chars)?);
            }
            c if c.is_ascii_digit() => {
                tokens.push(read_number(&mut chars)?);
            }
            c if c.is_alphabetic() || c == '_' => {
                tokens.push(read_word(&mut chars));
            }
            other => {
                return Err(EvalError::Syntax(format!("unexpected character '{other}'")));
            }
        }
    }

    Ok(tokens)
}

fn read_string(chars: &mut std::iter::Peekable<std::str::Chars>) -> Result<Token> {
    let quote = chars.next().unwrap_or('\'');
    let mut out = String::new();
    loop {
        match chars.next() {
            None => return Err(EvalError::Syntax("unterminated string literal".into())),
            Some(c) if c == quote => break,
            Some('\\') => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(escaped) => out.push(escaped),
                None => return Err(EvalError::Syntax("unterminated string literal".into())),
            },
            Some(c) => out.push(c),
        }
    }
    Ok(Token::Str(out))
}

fn read_number(chars: &mut std::iter::Peekable<std::str::Chars>) -> Result<Token> {
    let mut raw = String::new();
    let mut is_float = false;

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            raw.push(c);
            chars.next();
        } else if c == '.' && !is_float {
            // Only consume the dot when a digit follows; `5.contains` is a
            // method call on an integer, not a malformed float.
            let mut lookahead = chars.clone();
            lookahead.next();
            match lookahead.peek() {
                Some(d) if d.is_ascii_digit() => {
                    is_float = true;
                    raw.push(c);
                    chars.next();
                }
                _ => break,
            }
        } else {
            break;
        }
    }

    if is_float {
        raw.parse::<f64>()
            .map(Token::Float)
            .map_err(|_| EvalError::Syntax(format!("invalid number literal '{raw}'")))
    } else {
        raw.parse::<i64>()
            .map(Token::Int)
            .map_err(|_| EvalError::Syntax(format!("invalid number literal '{raw}'")))
    }
}

fn read_word(chars: &mut std::iter::Peekable<std::str::Chars>) -> Token {
    let mut word = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            word.push(c);
            chars.next();
        } else {
            break;
        }
    }

    match word.as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "in" => Token::In,
        "true" | "True" => Token::True,
        "false" | "False" => Token::False,
        "null" | "None" => Token::Null,
        _ => Token::Ident(word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_and_idents() {
        let tokens = tokenize("amount >= 100.5 and merchant == 'Amazon'").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("amount".into()),
                Token::Ge,
                Token::Float(100.5),
                Token::And,
                Token::Ident("merchant".into()),
                Token::EqEq,
                Token::Str("Amazon".into()),
            ]
        );
    }

    #[test]
    fn test_keyword_spellings() {
        assert_eq!(tokenize("None").unwrap(), vec![Token::Null]);
        assert_eq!(tokenize("null").unwrap(), vec![Token::Null]);
        assert_eq!(tokenize("True").unwrap(), vec![Token::True]);
        assert_eq!(tokenize("false").unwrap(), vec![Token::False]);
    }

    #[test]
    fn test_method_call_dot_vs_float_dot() {
        let tokens = tokenize("merchant.lower()").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("merchant".into()),
                Token::Dot,
                Token::Ident("lower".into()),
                Token::LParen,
                Token::RParen,
            ]
        );
        assert_eq!(tokenize("1.5").unwrap(), vec![Token::Float(1.5)]);
    }

    #[test]
    fn test_rejects_assignment_and_garbage() {
        assert!(tokenize("x = 1").is_err());
        assert!(tokenize("a ; b").is_err());
        assert!(tokenize("'unterminated").is_err());
    }
}
