//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds what a command handler needs: global flags,
//! the discovered `.pricecalc/` directory and the loaded configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pricecalc_config::{CalcConfig, find_calc_dir, load_config, load_default_config};
use pricecalc_formula::Formula;
use pricecalc_formula::parser;

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Whether to produce JSON output (`--json` or `json: true` in config).
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,

    /// Working directory the command was started in.
    pub cwd: PathBuf,

    /// Discovered `.pricecalc/` directory, if any.
    pub calc_dir: Option<PathBuf>,

    /// Effective configuration.
    pub config: CalcConfig,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        let calc_dir = find_calc_dir(&cwd);
        let config = match &calc_dir {
            Some(dir) => load_config(dir)
                .with_context(|| format!("failed to load config from {}", dir.display()))?,
            None => load_default_config().context("failed to load config")?,
        };

        Ok(Self {
            json: global.json || config.json,
            verbose: global.verbose,
            quiet: global.quiet,
            cwd,
            calc_dir,
            config,
        })
    }

    /// Directory that relative paths in the configuration resolve against:
    /// the parent of `.pricecalc/`, or the working directory.
    pub fn project_root(&self) -> &Path {
        self.calc_dir
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(self.cwd.as_path())
    }

    /// Formula directories to search after the working directory.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(dir) = &self.calc_dir {
            dirs.push(dir.join("formulas"));
        }
        dirs.extend(self.config.search_dirs(self.project_root()));
        dirs
    }

    /// Resolve a formula name or path and load it.
    pub fn load_formula(&self, name: &str) -> Result<Formula> {
        let path = parser::find_formula(name, &self.cwd, &self.search_dirs())?;
        parser::load_formula(&path)
            .with_context(|| format!("failed to load formula {}", path.display()))
    }
}
