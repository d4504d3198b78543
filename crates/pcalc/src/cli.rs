//! Clap CLI definitions for the `pcalc` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// pcalc -- evaluate pricing calculator formulas.
///
/// Loads calculator definitions (JSON or TOML), resolves which inputs are
/// visible for a set of answers, and prices single services or whole quotes.
#[derive(Parser, Debug)]
#[command(
    name = "pcalc",
    about = "Evaluate pricing calculator formulas",
    long_about = "Loads calculator definitions, resolves conditional inputs and prices services and multi-service quotes.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a formula and check its structure.
    Validate(ValidateArgs),

    /// Price one formula for a set of answers.
    #[command(alias = "price")]
    Eval(EvalArgs),

    /// Show which inputs are visible and the value each one takes.
    Visibility(VisibilityArgs),

    /// Price every service in a selections file and total them.
    Quote(QuoteArgs),

    /// Show or initialize configuration.
    Config(ConfigArgs),

    /// Print version information.
    Version,
}

/// Arguments for `pcalc validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Formula name or file path.
    pub formula: String,
}

/// Arguments for `pcalc eval`.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Formula name or file path.
    pub formula: String,

    /// Input value (id=value), repeatable. Values are read as JSON when
    /// possible, so `--var extras='["cover"]'` gives a list.
    #[arg(long = "var", num_args = 1..)]
    pub vars: Vec<String>,

    /// Show visibility, contributions and the substituted expression.
    #[arg(long)]
    pub breakdown: bool,
}

/// Arguments for `pcalc visibility`.
#[derive(Args, Debug)]
pub struct VisibilityArgs {
    /// Formula name or file path.
    pub formula: String,

    /// Input value (id=value), repeatable.
    #[arg(long = "var", num_args = 1..)]
    pub vars: Vec<String>,
}

/// Arguments for `pcalc quote`.
#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// JSON file holding an array of `{ "formula": ..., "values": {...} }`.
    pub selections: PathBuf,

    /// Also list each service's visible inputs.
    #[arg(long)]
    pub summary: bool,
}

/// Arguments for `pcalc config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommands>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration (default).
    Show,
    /// Print the path of the configuration file.
    Path,
    /// Create `.pricecalc/` with a default `config.yaml` in the current directory.
    Init,
}
