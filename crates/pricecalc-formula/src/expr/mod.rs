//! Safe evaluation of price expressions.
//!
//! A formula template such as `(hasPermit ? 50 : 0) + base * sqft` is turned
//! into a number in three steps:
//!
//! 1. [`substitute`] replaces each variable id with its numeric contribution,
//!    matching whole identifier tokens only.
//! 2. The substituted text is tokenized and parsed into an [`Expr`] tree.
//!    Only numbers, `+ - * / ( ) ? : > < >= <= == !=` and whitespace are
//!    accepted.
//! 3. The tree is evaluated and the result rounded and clamped at zero by
//!    [`finalize_price`].
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use pricecalc_formula::expr::evaluate;
//!
//! let contributions = HashMap::from([("squareFootage".to_string(), 12.0)]);
//! assert_eq!(evaluate("10 * squareFootage", &contributions).unwrap(), 120.0);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, Expr};
pub use parser::parse;

use crate::error::FormulaError;
use crate::types::Contributions;
use lexer::is_ident_cont;

/// A parsed expression together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    ast: Expr,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        Ok(Self {
            source: source.to_string(),
            ast: parse(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    /// Distinct identifiers referenced, in order of first appearance.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut all = Vec::new();
        self.ast.collect_variables(&mut all);
        let mut seen = Vec::with_capacity(all.len());
        for name in all {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }
}

/// Substitute contributions into a template.
///
/// Ids are replaced longest first and only where they form a whole token, so
/// `sq` never rewrites part of `sqft`. Negative numbers are parenthesized to
/// keep `a - b` well-formed when `b` is negative. Identifiers with no
/// contribution are left in place.
pub fn substitute(template: &str, contributions: &Contributions) -> String {
    let mut ids: Vec<(&String, &f64)> = contributions.iter().collect();
    ids.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

    let mut text = template.to_string();
    for (id, value) in ids {
        if id.is_empty() {
            continue;
        }
        text = replace_token(&text, id, &format_number(*value));
    }
    text
}

/// Replace whole-token occurrences of `token` in `haystack`.
fn replace_token(haystack: &str, token: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(haystack.len());
    let mut rest = 0;
    let mut search = 0;
    while let Some(found) = haystack[search..].find(token) {
        let start = search + found;
        let end = start + token.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !is_ident_cont(c));
        let after_ok = haystack[end..].chars().next().is_none_or(|c| !is_ident_cont(c));
        if before_ok && after_ok {
            out.push_str(&haystack[rest..start]);
            out.push_str(replacement);
            rest = end;
            search = end;
        } else {
            // Step past the first char of this match and keep looking.
            search = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
        }
    }
    out.push_str(&haystack[rest..]);
    out
}

fn format_number(value: f64) -> String {
    if value < 0.0 {
        format!("({})", value)
    } else {
        format!("{}", value)
    }
}

/// Round to the nearest whole unit and clamp at zero.
///
/// Non-finite results (division by zero) price at zero.
pub fn finalize_price(raw: f64) -> f64 {
    if !raw.is_finite() {
        tracing::warn!(result = %raw, "expression produced a non-finite result, pricing at 0");
        return 0.0;
    }
    let rounded = raw.round();
    if rounded > 0.0 { rounded } else { 0.0 }
}

/// Evaluate a template against numeric contributions and return the price.
///
/// An identifier that has no contribution is a [`FormulaError`], never a
/// silent zero.
pub fn evaluate(template: &str, contributions: &Contributions) -> Result<f64, FormulaError> {
    let substituted = substitute(template, contributions);
    let expression = Expression::parse(&substituted)?;
    if let Some(first) = expression.identifiers().first() {
        return Err(FormulaError::UnresolvedIdentifier((*first).to_string()));
    }
    let raw = expression.ast().eval()?;
    tracing::debug!(template, substituted = %substituted, raw, "evaluated expression");
    Ok(finalize_price(raw))
}
