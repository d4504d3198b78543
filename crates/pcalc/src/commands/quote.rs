//! `pcalc quote` -- price a multi-service selections file.

use anyhow::{Context, Result};
use serde::Serialize;

use pricecalc_formula::summary::{LineItem, summarize};
use pricecalc_formula::visibility::resolve;
use pricecalc_formula::{aggregate, parser};

use crate::cli::QuoteArgs;
use crate::commands::eval::check_known;
use crate::context::RuntimeContext;
use crate::output::{format_price, output_json, output_table, render_accent, render_muted};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceView {
    formula_id: String,
    name: String,
    price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    lines: Option<Vec<LineItem>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteView {
    per_service: Vec<ServiceView>,
    total: f64,
}

/// Execute the `pcalc quote` command.
pub fn run(ctx: &RuntimeContext, args: &QuoteArgs) -> Result<()> {
    let path = ctx.cwd.join(&args.selections);
    let selections = parser::load_selections(&path, &ctx.search_dirs())
        .with_context(|| format!("failed to load selections from {}", path.display()))?;
    for (index, selection) in selections.iter().enumerate() {
        check_known(&selection.formula, &selection.values)
            .with_context(|| format!("selection {} in {}", index + 1, path.display()))?;
    }
    let quote = aggregate(&selections)?;

    let view = QuoteView {
        per_service: selections
            .iter()
            .zip(&quote.per_service)
            .map(|(selection, priced)| ServiceView {
                formula_id: priced.formula_id.clone(),
                name: selection.formula.display_name().to_string(),
                price: priced.price,
                lines: args.summary.then(|| {
                    summarize(
                        &selection.formula,
                        &resolve(&selection.formula.variables, &selection.values),
                    )
                }),
            })
            .collect(),
        total: quote.total,
    };

    if ctx.json {
        output_json(&view);
        return Ok(());
    }

    if ctx.quiet {
        println!("{}", format_price(view.total));
        return Ok(());
    }

    if args.summary {
        for service in &view.per_service {
            println!("{}  {}", service.name, format_price(service.price));
            for line in service.lines.iter().flatten() {
                println!("  {} {}", render_muted(&format!("{}:", line.label)), line.display);
            }
        }
        println!();
    } else if !view.per_service.is_empty() {
        let rows: Vec<Vec<String>> = view
            .per_service
            .iter()
            .map(|s| vec![s.name.clone(), format_price(s.price)])
            .collect();
        output_table(&["Service", "Price"], &rows);
        println!();
    }
    println!("{} {}", render_accent("Total:"), format_price(view.total));
    Ok(())
}
