//! `pcalc visibility` -- show which inputs are visible for a set of answers.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use pricecalc_core::Value;
use pricecalc_formula::visibility::resolve;

use super::eval::{check_known, parse_var_flags};
use crate::cli::VisibilityArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

#[derive(Serialize)]
struct VisibilityView<'a> {
    formula: &'a str,
    visible: &'a [String],
    hidden: Vec<&'a str>,
    effective: BTreeMap<&'a str, &'a Value>,
}

/// Execute the `pcalc visibility` command.
pub fn run(ctx: &RuntimeContext, args: &VisibilityArgs) -> Result<()> {
    let formula = ctx.load_formula(&args.formula)?;
    let values = parse_var_flags(&args.vars)?;
    check_known(&formula, &values)?;

    let resolution = resolve(&formula.variables, &values);

    if ctx.json {
        output_json(&VisibilityView {
            formula: &formula.id,
            visible: &resolution.visible,
            hidden: formula
                .variables
                .iter()
                .filter(|v| !resolution.is_visible(&v.id))
                .map(|v| v.id.as_str())
                .collect(),
            effective: resolution
                .effective
                .iter()
                .map(|(k, v)| (k.as_str(), v))
                .collect(),
        });
        return Ok(());
    }

    let rows: Vec<Vec<String>> = formula
        .variables
        .iter()
        .map(|v| {
            vec![
                v.id.clone(),
                v.var_type.to_string(),
                if resolution.is_visible(&v.id) { "yes" } else { "hidden" }.to_string(),
                resolution.value(&v.id).to_string(),
            ]
        })
        .collect();
    output_table(&["Variable", "Type", "Shown", "Value"], &rows);
    if !ctx.quiet {
        println!(
            "\n{} of {} inputs visible",
            resolution.visible.len(),
            formula.variables.len()
        );
    }
    Ok(())
}
