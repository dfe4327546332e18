// Legacy API device endpoints

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::{Endpoint, LegacyClient};
use crate::legacy::models::LegacyDevice;

impl LegacyClient {
    /// List all adopted devices of a site.
    ///
    /// `GET /api/s/{site}/stat/device`
    pub async fn list_devices(&self, site: &str) -> Result<Vec<LegacyDevice>, Error> {
        debug!(site, "listing devices");
        self.fetch(Endpoint::Site {
            site,
            path: "stat/device",
        })
        .await
    }
}
