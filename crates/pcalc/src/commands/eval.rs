//! `pcalc eval` -- price one formula for a set of answers.

use anyhow::{Result, bail};

use pricecalc_core::Value;
use pricecalc_formula::{Formula, ValueMap, engine};

use crate::cli::EvalArgs;
use crate::context::RuntimeContext;
use crate::output::{format_price, output_json, output_table, render_accent, render_muted};

/// Execute the `pcalc eval` command.
pub fn run(ctx: &RuntimeContext, args: &EvalArgs) -> Result<()> {
    let formula = ctx.load_formula(&args.formula)?;
    let values = parse_var_flags(&args.vars)?;
    check_known(&formula, &values)?;

    if args.breakdown {
        let breakdown = engine::breakdown(&formula, &values)?;
        if ctx.json {
            output_json(&breakdown);
            return Ok(());
        }

        let rows: Vec<Vec<String>> = formula
            .variables
            .iter()
            .map(|v| {
                let shown = breakdown.visible.contains(&v.id);
                vec![
                    v.id.clone(),
                    if shown { "yes" } else { "hidden" }.to_string(),
                    breakdown.effective.get(&v.id).map(Value::to_string).unwrap_or_default(),
                    breakdown.contributions.get(&v.id).copied().unwrap_or(0.0).to_string(),
                ]
            })
            .collect();
        if !rows.is_empty() {
            output_table(&["Variable", "Shown", "Value", "Contribution"], &rows);
            println!();
        }
        println!("{} {}", render_muted("Formula:   "), formula.formula);
        println!("{} {}", render_muted("Evaluated: "), breakdown.expression);
        println!("{} {}", render_accent("Price:     "), format_price(breakdown.price));
        return Ok(());
    }

    let price = engine::price(&formula, &values)?;
    if ctx.json {
        output_json(&serde_json::json!({
            "formulaId": formula.id,
            "price": price,
        }));
    } else if ctx.quiet {
        println!("{}", format_price(price));
    } else {
        println!("{}: {}", formula.display_name(), format_price(price));
    }
    Ok(())
}

/// Parse `--var key=value` flags into a value map.
///
/// The value is read as JSON when it parses (`12`, `true`, `["a","b"]`),
/// otherwise it is taken as text.
pub(crate) fn parse_var_flags(vars: &[String]) -> Result<ValueMap> {
    let mut map = ValueMap::new();
    for v in vars {
        let Some((key, raw)) = v.split_once('=') else {
            bail!("invalid variable format '{}': expected key=value", v);
        };
        if key.is_empty() {
            bail!("invalid variable format '{}': empty key", v);
        }
        map.insert(key.to_string(), parse_var_value(raw));
    }
    Ok(map)
}

fn parse_var_value(raw: &str) -> Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(_)) | Err(_) => Value::Text(raw.to_string()),
        Ok(json) => Value::from(json),
    }
}

/// Reject values for ids the formula does not declare.
pub(crate) fn check_known(formula: &Formula, values: &ValueMap) -> Result<()> {
    let mut unknown: Vec<&str> = values
        .keys()
        .filter(|id| formula.variable(id).is_none())
        .map(String::as_str)
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    unknown.sort_unstable();
    let declared: Vec<&str> = formula.variables.iter().map(|v| v.id.as_str()).collect();
    bail!(
        "unknown variable(s) {} for formula '{}' (declared: {})",
        unknown.join(", "),
        formula.id,
        declared.join(", ")
    )
}
