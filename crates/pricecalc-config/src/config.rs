//! Configuration types and loading.
//!
//! [`CalcConfig`] is built from three layers, later layers winning:
//!
//! 1. built-in defaults
//! 2. `.pricecalc/config.yaml`
//! 3. `PRICECALC_JSON` and `PRICECALC_LOG_LEVEL` from the environment
//!
//! [`save_config`] writes the YAML layer back out.

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the YAML layer inside `.pricecalc/`.
pub const CONFIG_FILE: &str = "config.yaml";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The configuration could not be serialized as YAML.
    #[error("failed to write config file: {0}")]
    SerializeError(#[from] serde_yaml::Error),

    /// A layer held a value of the wrong shape.
    #[error("invalid configuration: {0}")]
    ExtractError(#[from] Box<figment::Error>),

    /// The `.pricecalc/` directory was not found.
    #[error("no .pricecalc directory found (run 'pcalc config init' first)")]
    CalcDirNotFound,
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Project configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CalcConfig {
    /// Extra directories searched for formula files, after the project's own
    /// `.pricecalc/formulas/`. Relative paths resolve against the project root.
    #[serde(default)]
    pub formulas_dir: Vec<PathBuf>,

    /// Emit JSON by default.
    #[serde(default)]
    pub json: bool,

    /// Default tracing filter when `--verbose` is given without `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            formulas_dir: Vec::new(),
            json: false,
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl CalcConfig {
    /// Formula search directories made absolute against `root`.
    pub fn search_dirs(&self, root: &Path) -> Vec<PathBuf> {
        self.formulas_dir
            .iter()
            .map(|d| if d.is_absolute() { d.clone() } else { root.join(d) })
            .collect()
    }
}

/// Load configuration for the `.pricecalc/` directory `calc_dir`.
///
/// A missing or empty `config.yaml` contributes nothing.
pub fn load_config(calc_dir: &Path) -> Result<CalcConfig> {
    let mut figment = Figment::from(Serialized::defaults(CalcConfig::default()));

    let config_path = calc_dir.join(CONFIG_FILE);
    if config_path.is_file() && !std::fs::read_to_string(&config_path)?.trim().is_empty() {
        figment = figment.merge(Yaml::file(&config_path));
    }

    figment = figment.merge(env_layer());
    figment.extract().map_err(|e| ConfigError::ExtractError(Box::new(e)))
}

/// Configuration from defaults and environment only, for use outside a project.
pub fn load_default_config() -> Result<CalcConfig> {
    Figment::from(Serialized::defaults(CalcConfig::default()))
        .merge(env_layer())
        .extract()
        .map_err(|e| ConfigError::ExtractError(Box::new(e)))
}

/// Write `config.yaml` inside `calc_dir`, creating the directory if needed.
pub fn save_config(calc_dir: &Path, config: &CalcConfig) -> Result<()> {
    std::fs::create_dir_all(calc_dir)?;
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(calc_dir.join(CONFIG_FILE), yaml)?;
    Ok(())
}

/// `PRICECALC_JSON` -> `json`, `PRICECALC_LOG_LEVEL` -> `log-level`.
fn env_layer() -> Env {
    Env::prefixed("PRICECALC_")
        .map(|key| key.as_str().replace('_', "-").into())
        .only(&["json", "log-level"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let cfg = CalcConfig::default();
        assert!(cfg.formulas_dir.is_empty());
        assert!(!cfg.json);
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_| {
            let cfg = load_config(Path::new("/nonexistent/.pricecalc")).map_err(|e| e.to_string())?;
            assert_eq!(cfg, CalcConfig::default());
            Ok(())
        });
    }

    #[test]
    fn yaml_layer_overrides_defaults() {
        Jail::expect_with(|jail| {
            let calc_dir = jail.directory().join(".pricecalc");
            std::fs::create_dir(&calc_dir).map_err(|e| e.to_string())?;
            jail.create_file(
                ".pricecalc/config.yaml",
                "formulas-dir:\n  - catalog\n  - /srv/formulas\njson: true\n",
            )?;

            let cfg = load_config(&calc_dir).map_err(|e| e.to_string())?;
            assert_eq!(
                cfg.formulas_dir,
                vec![PathBuf::from("catalog"), PathBuf::from("/srv/formulas")]
            );
            assert!(cfg.json);
            assert_eq!(cfg.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_yaml() {
        Jail::expect_with(|jail| {
            let calc_dir = jail.directory().join(".pricecalc");
            std::fs::create_dir(&calc_dir).map_err(|e| e.to_string())?;
            jail.create_file(".pricecalc/config.yaml", "json: true\nlog-level: info\n")?;
            jail.set_env("PRICECALC_JSON", "false");
            jail.set_env("PRICECALC_LOG_LEVEL", "trace");

            let cfg = load_config(&calc_dir).map_err(|e| e.to_string())?;
            assert!(!cfg.json);
            assert_eq!(cfg.log_level, "trace");
            Ok(())
        });
    }

    #[test]
    fn empty_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let calc_dir = jail.directory().join(".pricecalc");
            std::fs::create_dir(&calc_dir).map_err(|e| e.to_string())?;
            jail.create_file(".pricecalc/config.yaml", "  \n")?;
            let cfg = load_config(&calc_dir).map_err(|e| e.to_string())?;
            assert_eq!(cfg, CalcConfig::default());
            Ok(())
        });
    }

    #[test]
    fn roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let calc_dir = dir.path().join(".pricecalc");

        let cfg = CalcConfig {
            formulas_dir: vec![PathBuf::from("shared")],
            json: true,
            log_level: "info".to_string(),
        };
        save_config(&calc_dir, &cfg).unwrap();

        let written = std::fs::read_to_string(calc_dir.join(CONFIG_FILE)).unwrap();
        assert!(written.contains("formulas-dir"));

        let loaded: CalcConfig = serde_yaml::from_str(&written).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn search_dirs_resolve_against_root() {
        let cfg = CalcConfig {
            formulas_dir: vec![PathBuf::from("catalog"), PathBuf::from("/abs")],
            ..CalcConfig::default()
        };
        assert_eq!(
            cfg.search_dirs(Path::new("/project")),
            vec![PathBuf::from("/project/catalog"), PathBuf::from("/abs")]
        );
    }
}
