// Legacy API site endpoints
//
// Site listing is controller-scoped (not site-scoped), using
// `/api/self/sites` rather than the usual `/api/s/{site}/...` pattern.

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::{Endpoint, LegacyClient};
use crate::legacy::models::LegacySite;

impl LegacyClient {
    /// List all sites visible to the authenticated user.
    ///
    /// `GET /api/self/sites`
    pub async fn list_sites(&self) -> Result<Vec<LegacySite>, Error> {
        debug!("listing sites");
        self.fetch(Endpoint::Controller("self/sites")).await
    }
}
