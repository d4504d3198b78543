//! Turning effective values into numeric contributions.
//!
//! Coercion problems are never errors here: a value that cannot be read as a
//! number, or that matches no option, contributes 0 so a customer always gets
//! a price.

use pricecalc_core::{Value, VariableType};

use crate::types::{Contributions, ValueMap, Variable};

/// The number a variable contributes to its formula.
///
/// Always finite: an infinite or NaN result (an overflowing sum, an `inf`
/// option value) contributes 0.
pub fn normalize(variable: &Variable, value: &Value) -> f64 {
    let n = coerce(variable, value);
    if n.is_finite() {
        n
    } else {
        tracing::warn!(variable = %variable.id, result = %n, "non-finite contribution, using 0");
        0.0
    }
}

fn coerce(variable: &Variable, value: &Value) -> f64 {
    match &variable.var_type {
        VariableType::Number | VariableType::Slider | VariableType::Stepper => {
            let n = value.as_number().unwrap_or(0.0);
            if variable.var_type.is_bounded() {
                clamp(n, variable.min.unwrap_or(0.0), variable.max.unwrap_or(f64::INFINITY))
            } else {
                n
            }
        }
        VariableType::Select => variable
            .find_option(value)
            .and_then(|o| o.multiplier.or(o.numeric_value))
            .unwrap_or(0.0),
        VariableType::Dropdown => variable
            .find_option(value)
            .and_then(|o| o.numeric_value)
            .unwrap_or(0.0),
        VariableType::MultipleChoice => value
            .as_slice()
            .iter()
            .filter_map(|item| variable.find_option(item))
            .filter_map(|o| o.numeric_value)
            .sum(),
        VariableType::Text | VariableType::Other(_) => 0.0,
    }
}

/// Contributions for every variable, read from the effective values.
pub fn contributions(variables: &[Variable], effective: &ValueMap) -> Contributions {
    variables
        .iter()
        .map(|v| {
            let value = effective.get(&v.id).unwrap_or(&Value::Null);
            (v.id.clone(), normalize(v, value))
        })
        .collect()
}

/// Like `f64::clamp` but never panics when `lo > hi`.
fn clamp(n: f64, lo: f64, hi: f64) -> f64 {
    if n < lo {
        lo
    } else if n > hi {
        hi
    } else {
        n
    }
}
