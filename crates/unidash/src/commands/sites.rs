//! `unidash sites`: list sites from the controller or the snapshot.

use tabled::Tabled;
use tracing::warn;

use unidash_config::Config;
use unidash_core::{ControllerSession, Site, SnapshotStore};

use crate::cli::SitesArgs;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Name")]
    id: String,
}

impl From<&Site> for SiteRow {
    fn from(s: &Site) -> Self {
        Self {
            description: s.description.clone(),
            id: s.id.clone(),
        }
    }
}

pub async fn handle(args: &SitesArgs, cfg: &Config) -> Result<(), CliError> {
    let mut sites = if args.snapshot {
        SnapshotStore::open(&cfg.snapshot.path)?.sites()?
    } else {
        let session = ControllerSession::login(&cfg.controller_config()?).await?;
        let sites = session.list_sites().await;
        if let Err(e) = session.logout().await {
            warn!(error = %e, "logout failed");
        }
        sites?
    };
    sites.sort_by(|a, b| a.description.cmp(&b.description));

    let out = output::render_list(
        args.output,
        &sites,
        |s| SiteRow::from(s),
        |s| s.description.clone(),
    )?;
    output::print_output(&out);
    Ok(())
}
