//! Recursive-descent parser.
//!
//! Precedence, lowest first:
//!
//! ```text
//! ternary        := comparison ( "?" ternary ":" ternary )?
//! comparison     := additive ( (">" | "<" | ">=" | "<=" | "==" | "!=") additive )*
//! additive       := multiplicative ( ("+" | "-") multiplicative )*
//! multiplicative := unary ( ("*" | "/") unary )*
//! unary          := ("-" | "+") unary | primary
//! primary        := number | identifier | "(" ternary ")"
//! ```
//!
//! Nesting through parentheses, unary signs and ternary branches is capped at
//! [`MAX_DEPTH`], and the token count at [`MAX_TOKENS`], so the parser and the
//! recursive evaluator stay within a small stack.

use super::ast::{BinaryOp, Expr};
use super::lexer::{tokenize, Spanned, Token};
use crate::error::FormulaError;

/// Deepest allowed nesting of parentheses, unary signs and ternaries.
pub const MAX_DEPTH: usize = 64;

/// Longest accepted expression, in tokens.
pub const MAX_TOKENS: usize = 4096;

/// Parse an expression string into a tree.
pub fn parse(input: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }
    if tokens.len() > MAX_TOKENS {
        return Err(FormulaError::TooLong(MAX_TOKENS));
    }
    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let expr = parser.ternary()?;
    match parser.peek() {
        None => Ok(expr),
        Some(extra) => Err(unexpected(extra)),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

fn unexpected(spanned: &Spanned) -> FormulaError {
    FormulaError::UnexpectedToken {
        found: spanned.token.to_string(),
        pos: spanned.pos,
    }
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Consume the next token if it equals `expected`.
    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek().is_some_and(|s| &s.token == expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), FormulaError> {
        match self.advance() {
            Some(s) if &s.token == expected => Ok(()),
            Some(s) => Err(unexpected(&s)),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, FormulaError>,
    ) -> Result<T, FormulaError> {
        if self.depth >= MAX_DEPTH {
            return Err(FormulaError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn ternary(&mut self) -> Result<Expr, FormulaError> {
        self.nested(Self::ternary_inner)
    }

    fn ternary_inner(&mut self) -> Result<Expr, FormulaError> {
        let condition = self.comparison()?;
        if !self.eat(&Token::Question) {
            return Ok(condition);
        }
        let then_branch = self.ternary()?;
        self.expect(&Token::Colon)?;
        let else_branch = self.ternary()?;
        Ok(Expr::Ternary {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    fn comparison(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.additive()?;
        while let Some(op) = self.peek().and_then(|s| comparison_op(&s.token)) {
            self.pos += 1;
            let right = self.additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek().map(|s| &s.token) {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek().map(|s| &s.token) {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.pos += 1;
            let right = self.unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        if self.eat(&Token::Minus) {
            let operand = self.nested(Self::unary)?;
            return Ok(Expr::Negate(Box::new(operand)));
        }
        if self.eat(&Token::Plus) {
            return self.nested(Self::unary);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let Some(spanned) = self.advance() else {
            return Err(FormulaError::UnexpectedEnd);
        };
        match spanned.token {
            Token::Number(n) => Ok(Expr::Literal(n)),
            Token::Ident(name) => Ok(Expr::Variable(name)),
            Token::LParen => {
                let inner = self.ternary()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            _ => Err(unexpected(&spanned)),
        }
    }
}

fn comparison_op(token: &Token) -> Option<BinaryOp> {
    match token {
        Token::Greater => Some(BinaryOp::Greater),
        Token::Less => Some(BinaryOp::Less),
        Token::GreaterEq => Some(BinaryOp::GreaterEq),
        Token::LessEq => Some(BinaryOp::LessEq),
        Token::EqEq => Some(BinaryOp::Eq),
        Token::NotEq => Some(BinaryOp::NotEq),
        _ => None,
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
