//! Pricing pipeline: resolve visibility, normalize values, evaluate the
//! expression, and aggregate across services.

use std::collections::BTreeMap;

use pricecalc_core::Value;
use serde::Serialize;

use crate::error::FormulaError;
use crate::expr;
use crate::normalize::contributions;
use crate::types::{Formula, ServiceSelection, ValueMap};
use crate::visibility::{resolve, Resolution};

/// Price of one selected service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrice {
    pub formula_id: String,
    pub price: f64,
}

/// Prices for every selection and their sum.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub per_service: Vec<ServicePrice>,
    pub total: f64,
}

/// Every intermediate result of pricing one formula.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub formula_id: String,
    pub price: f64,
    pub visible: Vec<String>,
    pub effective: BTreeMap<String, Value>,
    pub contributions: BTreeMap<String, f64>,
    /// The template after substitution, as it was parsed.
    pub expression: String,
}

/// Price a formula for the given raw values.
pub fn price(formula: &Formula, values: &ValueMap) -> Result<f64, FormulaError> {
    let resolution = resolve(&formula.variables, values);
    price_resolved(formula, &resolution)
}

/// Price a formula whose visibility has already been resolved.
pub fn price_resolved(formula: &Formula, resolution: &Resolution) -> Result<f64, FormulaError> {
    let contributions = contributions(&formula.variables, &resolution.effective);
    expr::evaluate(&formula.formula, &contributions).inspect_err(|e| {
        tracing::warn!(formula = %formula.id, error = %e, "formula evaluation failed");
    })
}

/// Price a single selection.
pub fn price_selection(selection: &ServiceSelection) -> Result<ServicePrice, FormulaError> {
    Ok(ServicePrice {
        formula_id: selection.formula.id.clone(),
        price: price(&selection.formula, &selection.values)?,
    })
}

/// Price every selection independently and total them.
///
/// Each selection is resolved against its own values only; nothing from one
/// selection is visible to another.
pub fn aggregate(selections: &[ServiceSelection]) -> Result<Quote, FormulaError> {
    let per_service = selections
        .iter()
        .map(price_selection)
        .collect::<Result<Vec<_>, _>>()?;
    let total = per_service.iter().map(|s| s.price).sum();
    tracing::debug!(services = per_service.len(), total, "aggregated quote");
    Ok(Quote { per_service, total })
}

/// Price a formula and keep the intermediate results.
pub fn breakdown(formula: &Formula, values: &ValueMap) -> Result<Breakdown, FormulaError> {
    let resolution = resolve(&formula.variables, values);
    let contributions = contributions(&formula.variables, &resolution.effective);
    let price = expr::evaluate(&formula.formula, &contributions)?;
    Ok(Breakdown {
        formula_id: formula.id.clone(),
        price,
        expression: expr::substitute(&formula.formula, &contributions),
        visible: resolution.visible,
        effective: resolution.effective.into_iter().collect(),
        contributions: contributions.into_iter().collect(),
    })
}
