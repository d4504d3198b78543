//! `pcalc validate` -- load a formula and report structural problems.

use anyhow::{Context, Result};

use pricecalc_formula::parser;

use crate::cli::ValidateArgs;
use crate::context::RuntimeContext;
use crate::output::{ICON_FAIL, ICON_PASS, output_json, render_fail, render_pass};

/// Execute the `pcalc validate` command.
pub fn run(ctx: &RuntimeContext, args: &ValidateArgs) -> Result<()> {
    let path = parser::find_formula(&args.formula, &ctx.cwd, &ctx.search_dirs())?;

    let formula = match parser::load_formula(&path) {
        Ok(formula) => formula,
        Err(e) => {
            if !ctx.json && !ctx.quiet {
                eprintln!("{} {}", render_fail(ICON_FAIL), path.display());
            }
            return Err(e).with_context(|| format!("invalid formula {}", path.display()));
        }
    };

    if ctx.json {
        output_json(&serde_json::json!({
            "valid": true,
            "formulaId": formula.id,
            "path": path.display().to_string(),
            "variables": formula.variables.len(),
        }));
    } else if !ctx.quiet {
        println!(
            "{} {} ({} variables, {})",
            render_pass(ICON_PASS),
            formula.display_name(),
            formula.variables.len(),
            path.display()
        );
    }
    Ok(())
}
