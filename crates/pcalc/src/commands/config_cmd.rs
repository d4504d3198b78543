//! `pcalc config` -- show or initialize configuration.

use anyhow::{Context, Result};

use pricecalc_config::calc_dir::find_calc_dir_or_error;
use pricecalc_config::config::CONFIG_FILE;
use pricecalc_config::{CalcConfig, ensure_calc_dir, save_config};

use crate::cli::{ConfigArgs, ConfigCommands};
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `pcalc config` command.
pub fn run(ctx: &RuntimeContext, args: &ConfigArgs) -> Result<()> {
    match args.command.as_ref().unwrap_or(&ConfigCommands::Show) {
        ConfigCommands::Show => {
            if ctx.json {
                output_json(&ctx.config);
            } else {
                let yaml = serde_yaml::to_string(&ctx.config)
                    .context("failed to render configuration")?;
                print!("{}", yaml);
            }
        }

        ConfigCommands::Path => {
            let calc_dir = find_calc_dir_or_error(&ctx.cwd)?;
            let path = calc_dir.join(CONFIG_FILE);
            if ctx.json {
                output_json(&serde_json::json!({
                    "path": path.display().to_string(),
                    "exists": path.is_file(),
                }));
            } else {
                println!("{}", path.display());
            }
        }

        ConfigCommands::Init => {
            let calc_dir = ensure_calc_dir(&ctx.cwd)?;
            let path = calc_dir.join(CONFIG_FILE);
            let created = !path.exists();
            if created {
                save_config(&calc_dir, &CalcConfig::default())?;
            }
            if ctx.json {
                output_json(&serde_json::json!({
                    "path": path.display().to_string(),
                    "created": created,
                }));
            } else if !ctx.quiet {
                if created {
                    println!("Initialized {}", calc_dir.display());
                } else {
                    println!("{} already exists", path.display());
                }
            }
        }
    }
    Ok(())
}
