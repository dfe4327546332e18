// ── Device directory abstraction ──
//
// The MAC search and the snapshot sync only ever need two reads: the
// site list and one site's device roster. `DeviceDirectory` is that seam;
// `DirectorySource` hands out one directory per request.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{Device, Site};
use crate::session::ControllerSession;

/// Read access to sites and their device rosters.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// Every site visible to this directory.
    async fn list_sites(&self) -> Result<Vec<Site>, CoreError>;

    /// The devices currently adopted at `site`.
    async fn list_devices(&self, site: &Site) -> Result<Vec<Device>, CoreError>;

    /// Called once the request using this directory is finished.
    async fn release(&self) {}
}

/// Factory for request-scoped directories.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Open a directory for one request (for the live backend: log in).
    async fn open(&self) -> Result<Arc<dyn DeviceDirectory>, CoreError>;
}

/// Live backend: a fresh controller session per request.
#[derive(Debug, Clone)]
pub struct LiveSource {
    config: ControllerConfig,
}

impl LiveSource {
    pub fn new(config: ControllerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DirectorySource for LiveSource {
    async fn open(&self) -> Result<Arc<dyn DeviceDirectory>, CoreError> {
        debug!(url = %self.config.url, "opening live controller session");
        let session = ControllerSession::login(&self.config).await?;
        Ok(Arc::new(session))
    }
}
