//! `unidash check-access`: evaluate addresses against the allowlist.

use unidash_config::Config;

use crate::cli::{CheckAccessArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &CheckAccessArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let access = cfg.access_list()?;
    let color = output::should_color(global.color);

    let mut denied = 0;
    for address in &args.addresses {
        match access.rule_for(address) {
            Some(rule) => println!(
                "{address}  {}  {}",
                output::verdict(true, color),
                output::muted(&format!("(matched {rule})"), color)
            ),
            None => {
                denied += 1;
                println!("{address}  {}", output::verdict(false, color));
            }
        }
    }

    if denied > 0 {
        return Err(CliError::AccessDenied {
            denied,
            total: args.addresses.len(),
        });
    }
    Ok(())
}
