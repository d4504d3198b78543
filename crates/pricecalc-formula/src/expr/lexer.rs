//! Tokenizer for price expressions.
//!
//! Only numeric literals, identifiers, the arithmetic/comparison operators,
//! parentheses, `?`, `:` and whitespace are recognised. Anything else is an
//! error, never passed through.

use std::fmt;

use crate::error::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Question,
    Colon,
    Greater,
    Less,
    GreaterEq,
    LessEq,
    EqEq,
    NotEq,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(name) => f.write_str(name),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Question => f.write_str("?"),
            Token::Colon => f.write_str(":"),
            Token::Greater => f.write_str(">"),
            Token::Less => f.write_str("<"),
            Token::GreaterEq => f.write_str(">="),
            Token::LessEq => f.write_str("<="),
            Token::EqEq => f.write_str("=="),
            Token::NotEq => f.write_str("!="),
        }
    }
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_ident_cont(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split an expression into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let mut end = pos;
            let mut seen_dot = false;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_ascii_digit() {
                    end = i + 1;
                } else if d == '.' && !seen_dot {
                    seen_dot = true;
                    end = i + 1;
                } else if is_ident_cont(d) || d == '.' {
                    // `12abc`, `1.2.3`
                    let mut bad_end = i + d.len_utf8();
                    chars.next();
                    while let Some(&(j, e)) = chars.peek() {
                        if is_ident_cont(e) || e == '.' {
                            bad_end = j + e.len_utf8();
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    return Err(FormulaError::InvalidNumber(input[pos..bad_end].to_string()));
                } else {
                    break;
                }
                chars.next();
            }
            let literal = &input[pos..end];
            let value = literal
                .parse::<f64>()
                .map_err(|_| FormulaError::InvalidNumber(literal.to_string()))?;
            tokens.push(Spanned { token: Token::Number(value), pos });
            continue;
        }

        if is_ident_start(c) {
            let mut end = pos;
            while let Some(&(i, d)) = chars.peek() {
                if is_ident_cont(d) {
                    end = i + 1;
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Spanned { token: Token::Ident(input[pos..end].to_string()), pos });
            continue;
        }

        chars.next();
        let next = chars.peek().map(|&(_, n)| n);
        let token = match (c, next) {
            ('>', Some('=')) => {
                chars.next();
                Token::GreaterEq
            }
            ('<', Some('=')) => {
                chars.next();
                Token::LessEq
            }
            ('=', Some('=')) => {
                chars.next();
                Token::EqEq
            }
            ('!', Some('=')) => {
                chars.next();
                Token::NotEq
            }
            ('>', _) => Token::Greater,
            ('<', _) => Token::Less,
            ('+', _) => Token::Plus,
            ('-', _) => Token::Minus,
            ('*', _) => Token::Star,
            ('/', _) => Token::Slash,
            ('(', _) => Token::LParen,
            (')', _) => Token::RParen,
            ('?', _) => Token::Question,
            (':', _) => Token::Colon,
            (ch, _) => return Err(FormulaError::UnexpectedCharacter { ch, pos }),
        };
        tokens.push(Spanned { token, pos });
    }

    Ok(tokens)
}
