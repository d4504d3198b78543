//! Visibility resolution.
//!
//! Variables are walked once in declaration order. Each conditional rule is
//! evaluated against the effective values of the variables before it, never
//! against the raw input, which may still hold values for fields that are now
//! hidden. Validation guarantees conditions only look backwards, so a single
//! pass is enough.

use pricecalc_core::Value;
use serde::Serialize;

use crate::condition::evaluate_logic;
use crate::types::{ValueMap, Variable};

/// Outcome of resolving a formula's variables against user input.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Resolution {
    /// Ids of visible variables, in declaration order.
    pub visible: Vec<String>,

    /// Value every variable takes for pricing. Hidden variables carry their
    /// rule's default.
    pub effective: ValueMap,
}

impl Resolution {
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.iter().any(|v| v == id)
    }

    /// Effective value of a variable; null if it was never resolved.
    pub fn value(&self, id: &str) -> &Value {
        self.effective.get(id).unwrap_or(&Value::Null)
    }
}

/// Decide which variables are visible and what value each one contributes.
pub fn resolve(variables: &[Variable], raw_values: &ValueMap) -> Resolution {
    let mut resolution = Resolution {
        visible: Vec::with_capacity(variables.len()),
        effective: ValueMap::with_capacity(variables.len()),
    };

    for variable in variables {
        let shown = variable
            .active_logic()
            .is_none_or(|logic| evaluate_logic(logic, &resolution.effective));

        let value = if shown {
            supplied(raw_values.get(&variable.id))
                .or_else(|| supplied(variable.default_value.as_ref()))
                .cloned()
                .unwrap_or_else(|| variable.var_type.zero_value())
        } else {
            variable
                .active_logic()
                .and_then(|logic| supplied(logic.default_value.as_ref()))
                .cloned()
                .unwrap_or_else(|| variable.var_type.zero_value())
        };

        tracing::trace!(variable = %variable.id, shown, value = %value, "resolved variable");

        if shown {
            resolution.visible.push(variable.id.clone());
        }
        resolution.effective.insert(variable.id.clone(), value);
    }

    resolution
}

/// A present, non-null value.
fn supplied(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}
