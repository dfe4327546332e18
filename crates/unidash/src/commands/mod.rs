//! Command dispatch.

mod check_access;
mod config_cmd;
mod serve;
mod sites;
mod sync;

use unidash_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler. Completions are handled in `main`.
pub async fn dispatch(cmd: Command, cfg: Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Serve(args) => serve::handle(args, cfg).await,
        Command::Sync(args) => sync::handle(args, &cfg).await,
        Command::Sites(args) => sites::handle(&args, &cfg).await,
        Command::CheckAccess(args) => check_access::handle(&args, &cfg, global),
        Command::Config => config_cmd::handle(&cfg, global),
        Command::Completions(_) => Err(CliError::Internal(
            "completions are generated before configuration is loaded".into(),
        )),
    }
}
