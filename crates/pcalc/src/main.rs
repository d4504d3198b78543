//! `pcalc` -- pricing calculator formula CLI.
//!
//! Parses CLI arguments with clap, resolves the runtime context, and
//! dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, GlobalArgs};
use context::RuntimeContext;

fn main() {
    let cli = Cli::parse();
    let json = cli.global.json;

    if let Err(e) = run(&cli.global, cli.command) {
        if json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run(global: &GlobalArgs, command: Option<Commands>) -> Result<()> {
    let ctx = RuntimeContext::from_global_args(global)?;
    init_logging(&ctx);
    tracing::debug!(cwd = %ctx.cwd.display(), calc_dir = ?ctx.calc_dir, "resolved context");

    match command {
        Some(Commands::Validate(args)) => commands::validate::run(&ctx, &args),
        Some(Commands::Eval(args)) => commands::eval::run(&ctx, &args),
        Some(Commands::Visibility(args)) => commands::visibility::run(&ctx, &args),
        Some(Commands::Quote(args)) => commands::quote::run(&ctx, &args),
        Some(Commands::Config(args)) => commands::config_cmd::run(&ctx, &args),
        Some(Commands::Version) => commands::version::run(&ctx),
        None => {
            // No subcommand -- print help
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    }
}

/// Log to stderr when `--verbose` is given or `RUST_LOG` is set.
///
/// `RUST_LOG` wins; otherwise the configured `log-level` applies.
fn init_logging(ctx: &RuntimeContext) {
    let from_env = EnvFilter::try_from_default_env().ok();
    if !ctx.verbose && from_env.is_none() {
        return;
    }
    let filter = from_env.unwrap_or_else(|| EnvFilter::new(&ctx.config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
