//! Error types for loading and evaluating formulas.

use thiserror::Error;

/// Errors raised while tokenizing, parsing or evaluating an expression.
///
/// A formula that passed [`crate::validation::validate`] should never produce
/// one of these at evaluation time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedCharacter { ch: char, pos: usize },

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("unexpected token '{found}' at position {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unresolved identifier '{0}'")]
    UnresolvedIdentifier(String),

    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),

    #[error("expression has more than {0} tokens")]
    TooLong(usize),
}

/// Structural problems in a formula definition, reported when it is loaded
/// or saved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid variable id '{0}': expected letters, digits and '_' not starting with a digit")]
    InvalidVariableId(String),

    #[error("duplicate variable id '{0}'")]
    DuplicateVariableId(String),

    #[error("variable '{variable}' has min {min} greater than max {max}")]
    InvalidRange { variable: String, min: f64, max: f64 },

    #[error("formula references unknown variable '{0}'")]
    UnknownToken(String),

    #[error("invalid formula expression: {0}")]
    Expression(#[from] FormulaError),

    #[error("variable '{variable}' uses unsupported condition '{condition}'")]
    UnsupportedCondition { variable: String, condition: String },

    #[error("variable '{variable}' depends on unknown variable '{depends_on}'")]
    UnknownDependency { variable: String, depends_on: String },

    #[error("variable '{variable}' depends on '{depends_on}', which is declared after it")]
    ForwardReference { variable: String, depends_on: String },

    #[error("conditional dependency cycle: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),
}

/// Errors that can occur while reading formula definitions.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("formula '{name}' not found (searched {searched})")]
    NotFound { name: String, searched: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
