//! Enum types for calculator definitions.
//!
//! Enums that come from authored JSON have:
//! - Custom Serialize (as the wire string)
//! - Custom Deserialize (known variants + catch-all `Other(String)`)
//! - `as_str()`, `is_builtin()`, `Display` impl

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::value::Value;

// ---------------------------------------------------------------------------
// Macro: defines an enum with known string variants + an Other(String) fallback.
// ---------------------------------------------------------------------------
macro_rules! define_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident, custom_variant = $custom_variant:ident,
        variants: [
            $( ($variant:ident, $str:literal) ),+ $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant, )+
            $custom_variant(String),
        }

        impl $name {
            /// Wire names of the built-in variants, in declaration order.
            pub const BUILTIN_NAMES: &'static [&'static str] = &[$( $str, )+];

            /// Returns the string representation.
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $str, )+
                    Self::$custom_variant(s) => s.as_str(),
                }
            }

            /// Returns `true` if this is a built-in (non-custom) variant.
            pub fn is_builtin(&self) -> bool {
                !matches!(self, Self::$custom_variant(_))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from(s.as_str()))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $( $str => Self::$variant, )+
                    other => Self::$custom_variant(other.to_owned()),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.as_str() {
                    $( $str => Self::$variant, )+
                    _ => Self::$custom_variant(s),
                }
            }
        }
    };
}

// ===========================================================================
// VariableType
// ===========================================================================

define_enum! {
    /// The input widget a variable is rendered as, which decides how its
    /// value turns into a number.
    VariableType, default = Number, custom_variant = Other,
    variants: [
        (Number, "number"),
        (Slider, "slider"),
        (Stepper, "stepper"),
        (Select, "select"),
        (Dropdown, "dropdown"),
        (MultipleChoice, "multiple-choice"),
        (Text, "text"),
    ]
}

impl VariableType {
    /// Normalises spellings seen in generated definitions to their canonical form.
    pub fn normalize(&self) -> Self {
        match self.as_str() {
            "multiple_choice" | "multiselect" | "multi-select" | "checkboxes" => {
                Self::MultipleChoice
            }
            "range" => Self::Slider,
            "counter" => Self::Stepper,
            _ => self.clone(),
        }
    }

    /// Plain numeric inputs: number, slider, stepper.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Slider | Self::Stepper)
    }

    /// Inputs whose value is one or more option values.
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Select | Self::Dropdown | Self::MultipleChoice)
    }

    /// Inputs that clamp into `[min, max]`.
    pub fn is_bounded(&self) -> bool {
        matches!(self, Self::Slider | Self::Stepper)
    }

    /// Value used when neither the user nor the definition supplies one.
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Number | Self::Slider | Self::Stepper => Value::Number(0.0),
            Self::MultipleChoice => Value::List(Vec::new()),
            Self::Select | Self::Dropdown | Self::Text | Self::Other(_) => {
                Value::Text(String::new())
            }
        }
    }
}

// ===========================================================================
// ConditionKind
// ===========================================================================

define_enum! {
    /// Predicate applied by a single visibility condition.
    ConditionKind, default = Equals, custom_variant = Other,
    variants: [
        (Equals, "equals"),
        (NotEquals, "not_equals"),
        (GreaterThan, "greater_than"),
        (LessThan, "less_than"),
        (Contains, "contains"),
        (IsEmpty, "is_empty"),
        (IsNotEmpty, "is_not_empty"),
    ]
}

// ===========================================================================
// LogicOperator
// ===========================================================================

/// How the conditions of one rule are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LogicOperator {
    /// Every condition must hold.
    #[default]
    #[serde(rename = "AND", alias = "and", alias = "And")]
    And,
    /// At least one condition must hold.
    #[serde(rename = "OR", alias = "or", alias = "Or")]
    Or,
}

impl LogicOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    /// Folds a sequence of condition results.
    pub fn combine<I: IntoIterator<Item = bool>>(&self, results: I) -> bool {
        let mut iter = results.into_iter();
        match self {
            Self::And => iter.all(|r| r),
            Self::Or => iter.any(|r| r),
        }
    }
}

impl fmt::Display for LogicOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn variable_type_roundtrip_serde() {
        let t = VariableType::MultipleChoice;
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#""multiple-choice""#);
        let back: VariableType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn builtin_names_parse_back_to_builtins() {
        assert_eq!(VariableType::BUILTIN_NAMES.len(), 7);
        for name in VariableType::BUILTIN_NAMES {
            assert!(VariableType::from(*name).is_builtin(), "{name}");
        }
        for name in ConditionKind::BUILTIN_NAMES {
            assert_eq!(ConditionKind::from(*name).as_str(), *name);
        }
        assert!(ConditionKind::BUILTIN_NAMES.contains(&"is_not_empty"));
    }

    #[test]
    fn variable_type_unknown_is_other() {
        let t: VariableType = serde_json::from_str(r#""color-picker""#).unwrap();
        assert_eq!(t, VariableType::Other("color-picker".into()));
        assert!(!t.is_builtin());
        assert!(!t.is_numeric());
        assert_eq!(t.zero_value(), Value::Text(String::new()));
    }

    #[test]
    fn variable_type_normalize_aliases() {
        assert_eq!(
            VariableType::from("multiple_choice").normalize(),
            VariableType::MultipleChoice
        );
        assert_eq!(VariableType::from("range").normalize(), VariableType::Slider);
        assert_eq!(VariableType::Select.normalize(), VariableType::Select);
    }

    #[test]
    fn variable_type_zero_values() {
        assert_eq!(VariableType::Slider.zero_value(), Value::Number(0.0));
        assert_eq!(VariableType::MultipleChoice.zero_value(), Value::List(vec![]));
        assert_eq!(VariableType::Dropdown.zero_value(), Value::Text(String::new()));
    }

    #[test]
    fn condition_kind_as_str() {
        assert_eq!(ConditionKind::NotEquals.as_str(), "not_equals");
        assert_eq!(ConditionKind::from("is_not_empty"), ConditionKind::IsNotEmpty);
        assert_eq!(
            ConditionKind::from("matches"),
            ConditionKind::Other("matches".into())
        );
    }

    #[test]
    fn logic_operator_accepts_both_cases() {
        let and: LogicOperator = serde_json::from_str(r#""and""#).unwrap();
        let or: LogicOperator = serde_json::from_str(r#""OR""#).unwrap();
        assert_eq!(and, LogicOperator::And);
        assert_eq!(or, LogicOperator::Or);
        assert_eq!(serde_json::to_string(&or).unwrap(), r#""OR""#);
        assert_eq!(LogicOperator::default(), LogicOperator::And);
    }

    #[test]
    fn logic_operator_truth_tables() {
        assert!(!LogicOperator::And.combine([true, false]));
        assert!(LogicOperator::Or.combine([true, false]));
        assert!(LogicOperator::And.combine([true, true]));
        assert!(LogicOperator::Or.combine([true, true]));
        assert!(!LogicOperator::Or.combine([false, false]));
    }
}
