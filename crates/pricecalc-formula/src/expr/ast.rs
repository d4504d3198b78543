//! Expression tree.

use std::fmt;

use crate::error::FormulaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Greater,
    Less,
    GreaterEq,
    LessEq,
    Eq,
    NotEq,
}

impl BinaryOp {
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOp::Add => left + right,
            BinaryOp::Sub => left - right,
            BinaryOp::Mul => left * right,
            BinaryOp::Div => left / right,
            BinaryOp::Greater => bool_to_f64(left > right),
            BinaryOp::Less => bool_to_f64(left < right),
            BinaryOp::GreaterEq => bool_to_f64(left >= right),
            BinaryOp::LessEq => bool_to_f64(left <= right),
            BinaryOp::Eq => bool_to_f64(left == right),
            BinaryOp::NotEq => bool_to_f64(left != right),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Greater => ">",
            BinaryOp::Less => "<",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::LessEq => "<=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
        }
    }
}

fn bool_to_f64(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    Variable(String),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
}

impl Expr {
    /// Evaluate a fully substituted tree.
    ///
    /// Comparisons yield 1 or 0; a ternary condition is true when non-zero.
    pub fn eval(&self) -> Result<f64, FormulaError> {
        match self {
            Expr::Literal(n) => Ok(*n),
            Expr::Variable(name) => Err(FormulaError::UnresolvedIdentifier(name.clone())),
            Expr::Negate(inner) => Ok(-inner.eval()?),
            Expr::Binary { op, left, right } => Ok(op.apply(left.eval()?, right.eval()?)),
            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                let c = condition.eval()?;
                if c != 0.0 && !c.is_nan() {
                    then_branch.eval()
                } else {
                    else_branch.eval()
                }
            }
        }
    }

    /// Push every variable name in evaluation order, duplicates included.
    pub fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Variable(name) => out.push(name),
            Expr::Negate(inner) => inner.collect_variables(out),
            Expr::Binary { left, right, .. } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.collect_variables(out);
                then_branch.collect_variables(out);
                else_branch.collect_variables(out);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(n) => write!(f, "{}", n),
            Expr::Variable(name) => f.write_str(name),
            Expr::Negate(inner) => write!(f, "(-{})", inner),
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => write!(f, "({} ? {} : {})", condition, then_branch, else_branch),
        }
    }
}
