//! `pcalc version` -- print the CLI and engine versions and what the engine
//! understands.

use anyhow::Result;
use serde::Serialize;

use pricecalc_core::{ConditionKind, LogicOperator, VariableType};
use pricecalc_formula::expr::parser::{MAX_DEPTH, MAX_TOKENS};

use crate::context::RuntimeContext;
use crate::output::{output_json, render_muted};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build identifier, set with `PCALC_BUILD` at compile time.
const BUILD: &str = match option_env!("PCALC_BUILD") {
    Some(b) => b,
    None => "dev",
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionInfo {
    version: &'static str,
    build: &'static str,
    engine: &'static str,
    variable_types: &'static [&'static str],
    conditions: &'static [&'static str],
    operators: [&'static str; 2],
    max_depth: usize,
    max_tokens: usize,
}

fn info() -> VersionInfo {
    VersionInfo {
        version: VERSION,
        build: BUILD,
        engine: pricecalc_formula::VERSION,
        variable_types: VariableType::BUILTIN_NAMES,
        conditions: ConditionKind::BUILTIN_NAMES,
        operators: [LogicOperator::And.as_str(), LogicOperator::Or.as_str()],
        max_depth: MAX_DEPTH,
        max_tokens: MAX_TOKENS,
    }
}

/// Execute the `pcalc version` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let info = info();
    if ctx.json {
        output_json(&info);
        return Ok(());
    }

    println!("pcalc {} ({}), engine {}", info.version, info.build, info.engine);
    if ctx.quiet {
        return Ok(());
    }
    println!("  {} {}", render_muted("variable types:"), info.variable_types.join(", "));
    println!("  {} {}", render_muted("conditions:    "), info.conditions.join(", "));
    println!("  {} {}", render_muted("rule operators:"), info.operators.join(", "));
    println!(
        "  {} nesting {}, {} tokens",
        render_muted("limits:        "),
        info.max_depth,
        info.max_tokens
    );
    Ok(())
}
