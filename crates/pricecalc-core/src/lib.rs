//! Core types for the pricecalc system.
//!
//! This crate holds the value model shared by every calculator component and
//! the enumerations that appear in authored formula definitions.

pub mod enums;
pub mod value;

pub use enums::{ConditionKind, LogicOperator, VariableType};
pub use value::Value;
