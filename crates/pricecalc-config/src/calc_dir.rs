//! Discovery and creation of the `.pricecalc/` directory.
//!
//! `.pricecalc/` holds a project's `config.yaml` and its `formulas/`
//! directory. It is found by walking up from the working directory, so
//! commands work from any subdirectory of a project.

use crate::config::ConfigError;
use std::path::{Path, PathBuf};

/// The name of the project metadata directory.
pub const CALC_DIR_NAME: &str = ".pricecalc";

/// Environment variable that overrides discovery.
pub const CALC_DIR_ENV: &str = "PRICECALC_DIR";

/// Walk up from `start` looking for a `.pricecalc/` directory.
///
/// `PRICECALC_DIR`, when it names an existing directory, wins over the walk.
///
/// # Examples
///
/// ```no_run
/// use pricecalc_config::calc_dir::find_calc_dir;
/// use std::path::Path;
///
/// if let Some(dir) = find_calc_dir(Path::new(".")) {
///     println!("Found project at {}", dir.display());
/// }
/// ```
pub fn find_calc_dir(start: &Path) -> Option<PathBuf> {
    if let Ok(env_dir) = std::env::var(CALC_DIR_ENV) {
        let env_path = PathBuf::from(&env_dir);
        if env_path.is_dir() {
            return Some(env_path);
        }
    }

    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .map(|dir| dir.join(CALC_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Like [`find_calc_dir`], but a missing directory is an error.
pub fn find_calc_dir_or_error(start: &Path) -> Result<PathBuf, ConfigError> {
    find_calc_dir(start).ok_or(ConfigError::CalcDirNotFound)
}

/// Create `.pricecalc/` (and `formulas/` inside it) under `path`.
///
/// If `path` already ends in `.pricecalc` it is used as is. Returns the
/// `.pricecalc/` path.
pub fn ensure_calc_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let calc_dir = if path.ends_with(CALC_DIR_NAME) {
        path.to_path_buf()
    } else {
        path.join(CALC_DIR_NAME)
    };

    std::fs::create_dir_all(calc_dir.join("formulas"))?;
    Ok(calc_dir)
}
