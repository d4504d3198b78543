//! Formula data model: variables, options, conditional logic.
//!
//! Field names follow the camelCase JSON produced by the calculator editor
//! and the generation service, so a definition deserializes unchanged.

use std::collections::HashMap;

use pricecalc_core::{ConditionKind, LogicOperator, Value, VariableType};
use serde::{Deserialize, Deserializer, Serialize};

/// Variable id -> value.
pub type ValueMap = HashMap<String, Value>;

/// Variable id -> numeric contribution.
pub type Contributions = HashMap<String, f64>;

/// A pricing calculator: an expression over its variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formula {
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Expression template referencing variable ids, e.g. `base + sqft * 2`.
    pub formula: String,

    /// Inputs in declaration order. Conditions may only look backwards.
    #[serde(default)]
    pub variables: Vec<Variable>,

    /// Where this formula was loaded from (set by the parser).
    #[serde(skip)]
    pub source: String,
}

impl Formula {
    /// Look up a declared variable.
    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.id == id)
    }

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// One typed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default, deserialize_with = "deserialize_variable_type")]
    pub var_type: VariableType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<PriceOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_logic: Option<ConditionalLogic>,
}

impl Variable {
    /// A variable of the given type with no options, bounds or logic.
    pub fn new(id: impl Into<String>, var_type: VariableType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            var_type,
            unit: None,
            min: None,
            max: None,
            default_value: None,
            options: Vec::new(),
            conditional_logic: None,
        }
    }

    /// First option whose value loosely equals `value`.
    pub fn find_option(&self, value: &Value) -> Option<&PriceOption> {
        self.options.iter().find(|o| o.value.loose_eq(value))
    }

    /// The conditional logic, if present and switched on.
    pub fn active_logic(&self) -> Option<&ConditionalLogic> {
        self.conditional_logic.as_ref().filter(|l| l.enabled)
    }
}

fn deserialize_variable_type<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<VariableType, D::Error> {
    VariableType::deserialize(deserializer).map(|t| t.normalize())
}

/// A choice offered by select, dropdown and multiple-choice variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceOption {
    #[serde(default)]
    pub label: String,

    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}

/// Rules deciding whether a variable is shown, and its value when hidden.
///
/// Both the current shape (a `conditions` list) and the legacy shape (one
/// condition inline) deserialize into this type; the legacy shape becomes a
/// one-element `conditions` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ConditionalLogicRepr")]
pub struct ConditionalLogic {
    pub enabled: bool,

    #[serde(default)]
    pub operator: LogicOperator,

    pub conditions: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

/// A single predicate on an earlier variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default)]
    pub id: String,

    pub depends_on_variable: String,

    #[serde(default)]
    pub condition: ConditionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_values: Vec<Value>,
}

/// Wire form of [`ConditionalLogic`] accepting both shapes.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConditionalLogicRepr {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    operator: LogicOperator,
    #[serde(default)]
    conditions: Vec<Condition>,
    #[serde(default)]
    default_value: Option<Value>,

    // Legacy inline condition.
    #[serde(default)]
    depends_on_variable: Option<String>,
    #[serde(default)]
    condition: Option<ConditionKind>,
    #[serde(default)]
    expected_value: Option<Value>,
    #[serde(default)]
    expected_values: Vec<Value>,
}

impl From<ConditionalLogicRepr> for ConditionalLogic {
    fn from(repr: ConditionalLogicRepr) -> Self {
        let conditions = match repr.depends_on_variable {
            Some(depends_on) if repr.conditions.is_empty() => vec![Condition {
                id: "legacy".to_string(),
                depends_on_variable: depends_on,
                condition: repr.condition.unwrap_or_default(),
                expected_value: repr.expected_value,
                expected_values: repr.expected_values,
            }],
            _ => repr.conditions,
        };
        Self {
            enabled: repr.enabled,
            operator: repr.operator,
            conditions,
            default_value: repr.default_value,
        }
    }
}

/// One instantiated formula with the values a customer entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub formula: Formula,

    #[serde(default)]
    pub values: ValueMap,
}

impl ServiceSelection {
    pub fn new(formula: Formula, values: ValueMap) -> Self {
        Self { formula, values }
    }
}
