//! `unidash sync`: refresh the local device snapshot from the controller.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use unidash_config::Config;
use unidash_core::{ControllerSession, SnapshotStore, SyncStep, sync_snapshot};

use crate::cli::SyncArgs;
use crate::error::CliError;

const BAR_TEMPLATE: &str = "{spinner} [{bar:30}] {pos}/{len} {msg}";

pub async fn handle(args: SyncArgs, cfg: &Config) -> Result<(), CliError> {
    let path = args.db.unwrap_or_else(|| cfg.snapshot.path.clone());
    let controller = cfg.controller_config()?;
    let store = SnapshotStore::open(&path)?;

    let session = ControllerSession::login(&controller).await?;

    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
        bar.set_style(style.progress_chars("=> "));
    }
    let progress = bar.clone();
    let outcome = sync_snapshot(&session, &store, move |step| match step {
        SyncStep::Started { total } => progress.set_length(u64::try_from(total).unwrap_or(u64::MAX)),
        SyncStep::Site { site, saved } => {
            let note = saved.map_or_else(
                || format!("{} (skipped)", site.description),
                |n| format!("{} ({n} devices)", site.description),
            );
            progress.set_message(note);
            progress.inc(1);
        }
    })
    .await;
    bar.finish_and_clear();

    if let Err(e) = session.logout().await {
        warn!(error = %e, "logout failed");
    }
    let report = outcome?;

    eprintln!(
        "Synced {} devices across {} sites into {}",
        report.devices,
        report.sites,
        path.display()
    );
    if !report.failed_sites.is_empty() {
        eprintln!(
            "Skipped {} site(s): {}",
            report.failed_sites.len(),
            report.failed_sites.join(", ")
        );
    }
    Ok(())
}
