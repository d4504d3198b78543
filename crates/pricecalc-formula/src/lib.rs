//! Formula engine for pricing calculators.
//!
//! A [`Formula`](types::Formula) is an arithmetic template over typed
//! variables. Pricing runs in three steps:
//!
//! 1. [`visibility::resolve`] decides which variables are shown and the
//!    effective value of each (hidden variables take their rule's default).
//! 2. [`normalize::contributions`] turns effective values into numbers.
//! 3. [`expr::evaluate`] substitutes those numbers into the template and
//!    evaluates it with a restricted parser.
//!
//! [`engine`] wires the steps together and totals multi-service quotes.
//! Formulas are checked once by [`validation::validate`] when loaded.

pub mod condition;
pub mod engine;
pub mod error;
pub mod expr;
pub mod normalize;
pub mod parser;
pub mod summary;
pub mod types;
pub mod validation;
pub mod visibility;

/// Engine version, reported by front ends.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use engine::{aggregate, breakdown, price, price_selection, Breakdown, Quote, ServicePrice};
pub use error::{FormulaError, LoadError, ValidationError};
pub use types::{Formula, ServiceSelection, ValueMap, Variable};
