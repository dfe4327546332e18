//! `unidash config`: print the effective configuration.

use unidash_config::{Config, config_path, render_config};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let source = global.config.clone().unwrap_or_else(config_path);
    println!("# source: {}", source.display());
    output::print_output(render_config(cfg)?.trim_end());
    Ok(())
}
