//! Configuration for pricecalc projects.
//!
//! This crate finds the `.pricecalc/` directory, loads and saves
//! `.pricecalc/config.yaml`, and applies environment overrides.

pub mod calc_dir;
pub mod config;

pub use calc_dir::{ensure_calc_dir, find_calc_dir};
pub use config::{CalcConfig, ConfigError, load_config, load_default_config, save_config};
