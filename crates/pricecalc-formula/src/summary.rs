//! Human-readable lines for a priced selection.

use pricecalc_core::Value;
use serde::Serialize;

use crate::types::{Formula, Variable};
use crate::visibility::Resolution;

/// One visible input as a customer would read it on a quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub variable_id: String,
    pub label: String,
    pub display: String,
}

/// Describe every visible variable. Hidden variables are left out.
pub fn summarize(formula: &Formula, resolution: &Resolution) -> Vec<LineItem> {
    formula
        .variables
        .iter()
        .filter(|v| resolution.is_visible(&v.id))
        .map(|v| LineItem {
            variable_id: v.id.clone(),
            label: if v.name.is_empty() { v.id.clone() } else { v.name.clone() },
            display: display(v, resolution.value(&v.id)),
        })
        .collect()
}

fn display(variable: &Variable, value: &Value) -> String {
    if variable.var_type.is_choice() {
        return value
            .as_slice()
            .iter()
            .map(|item| match variable.find_option(item) {
                Some(option) if !option.label.is_empty() => option.label.clone(),
                _ => item.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
    }

    if variable.var_type.is_numeric() {
        let n = value.as_number().unwrap_or(0.0);
        return match &variable.unit {
            Some(unit) if !unit.is_empty() => format!("{} {}", n, unit),
            _ => n.to_string(),
        };
    }

    value.to_string()
}
