//! Command handlers, one module per subcommand.

pub mod config_cmd;
pub mod eval;
pub mod quote;
pub mod validate;
pub mod version;
pub mod visibility;
