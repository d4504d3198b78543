//! Evaluation of visibility conditions against a value snapshot.
//!
//! Evaluation never fails: a missing variable reads as null, and any type
//! mismatch makes the predicate false.

use pricecalc_core::{ConditionKind, Value};

use crate::types::{Condition, ConditionalLogic, ValueMap};

/// Evaluate one condition against the values resolved so far.
pub fn evaluate_condition(condition: &Condition, snapshot: &ValueMap) -> bool {
    let actual = snapshot
        .get(&condition.depends_on_variable)
        .unwrap_or(&Value::Null);

    match &condition.condition {
        ConditionKind::Equals => equals(actual, condition),
        ConditionKind::NotEquals => !equals(actual, condition),
        ConditionKind::GreaterThan => compare(actual, condition, |a, b| a > b),
        ConditionKind::LessThan => compare(actual, condition, |a, b| a < b),
        ConditionKind::Contains => contains(actual, condition),
        ConditionKind::IsEmpty => actual.is_empty(),
        ConditionKind::IsNotEmpty => !actual.is_empty(),
        ConditionKind::Other(kind) => {
            tracing::debug!(condition = %kind, "unknown condition kind evaluates to false");
            false
        }
    }
}

/// Combine every condition of a rule with its operator.
///
/// A rule without conditions does not hide anything.
pub fn evaluate_logic(logic: &ConditionalLogic, snapshot: &ValueMap) -> bool {
    if logic.conditions.is_empty() {
        return true;
    }
    logic
        .operator
        .combine(logic.conditions.iter().map(|c| evaluate_condition(c, snapshot)))
}

/// `expectedValue` if set, otherwise any of `expectedValues`.
fn equals(actual: &Value, condition: &Condition) -> bool {
    match &condition.expected_value {
        Some(expected) => matches_expected(actual, expected),
        None => condition
            .expected_values
            .iter()
            .any(|expected| matches_expected(actual, expected)),
    }
}

/// Lists match a scalar by membership.
fn matches_expected(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::List(items), scalar) if !matches!(scalar, Value::List(_)) => {
            items.iter().any(|item| item.loose_eq(scalar))
        }
        _ => actual.loose_eq(expected),
    }
}

fn compare(actual: &Value, condition: &Condition, op: impl Fn(f64, f64) -> bool) -> bool {
    let expected = condition.expected_value.as_ref().unwrap_or(&Value::Null);
    match (actual.as_number(), expected.as_number()) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

fn contains(actual: &Value, condition: &Condition) -> bool {
    let candidates: &[Value] = if condition.expected_values.is_empty() {
        match &condition.expected_value {
            Some(expected) => std::slice::from_ref(expected),
            None => &[],
        }
    } else {
        &condition.expected_values
    };
    actual
        .as_slice()
        .iter()
        .any(|item| candidates.iter().any(|c| item.loose_eq(c)))
}
