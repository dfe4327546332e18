//! `unidash serve`: run the dashboard.

use std::sync::Arc;

use tracing::{info, warn};

use unidash::{AppState, serve};
use unidash_config::{Config, ConfigError};
use unidash_core::{ControllerConfig, DirectoryBackend, DirectorySource, LiveSource, SnapshotStore};

use crate::cli::ServeArgs;
use crate::error::CliError;

pub async fn handle(args: ServeArgs, mut cfg: Config) -> Result<(), CliError> {
    if let Some(port) = args.port {
        cfg.server.port = port;
    }
    if let Some(bind) = args.bind {
        cfg.server.bind = bind;
    }
    if let Some(dir) = args.static_dir {
        cfg.server.static_dir = dir;
    }

    let addr = cfg.bind_addr()?;
    let access = cfg.access_list()?;
    if access.is_empty() {
        warn!("allowlist is empty, every request will be denied");
    }
    let search = cfg.search_options()?;

    let (controller, directories) = backends(&cfg)?;
    info!(
        backend = %cfg.search.backend,
        controller = controller.as_ref().map_or("<none>", |c| c.url.as_str()),
        "starting dashboard"
    );

    let state = Arc::new(AppState {
        access,
        trust_forwarded_for: cfg.server.trust_forwarded_for,
        directories,
        controller,
        search,
        static_dir: cfg.server.static_dir.clone(),
    });
    serve(state, addr).await?;
    Ok(())
}

/// The controller (for board lookups and provisioning) and the directory
/// backing the MAC search.
///
/// A snapshot-backed server may run without credentials; the controller
/// endpoints then answer with an internal error.
fn backends(
    cfg: &Config,
) -> Result<(Option<ControllerConfig>, Arc<dyn DirectorySource>), CliError> {
    match cfg.search.backend {
        DirectoryBackend::Live => {
            let controller = cfg.controller_config()?;
            let source = LiveSource::new(controller.clone());
            Ok((Some(controller), Arc::new(source)))
        }
        DirectoryBackend::Snapshot => {
            let store = SnapshotStore::open(&cfg.snapshot.path)?;
            let controller = match cfg.controller_config() {
                Ok(c) => Some(c),
                Err(ConfigError::NoCredentials { field, .. }) => {
                    warn!(missing = field, "no controller credentials, board and VLAN endpoints disabled");
                    None
                }
                Err(e) => return Err(e.into()),
            };
            Ok((controller, Arc::new(store)))
        }
    }
}
