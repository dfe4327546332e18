// Wireless endpoints. `rest/wlanconf` holds SSIDs; older controllers also
// want a WLAN group and a user group on every new SSID.

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::{Endpoint, LegacyClient};
use crate::legacy::models::{LegacyGroup, LegacyWlan, NewWlan};
use crate::legacy::networks::single;

const WLANCONF: &str = "rest/wlanconf";

impl LegacyClient {
    /// `GET /api/s/{site}/rest/wlanconf`
    pub async fn list_wlans(&self, site: &str) -> Result<Vec<LegacyWlan>, Error> {
        debug!(site, "listing wlans");
        self.fetch(Endpoint::Site {
            site,
            path: WLANCONF,
        })
        .await
    }

    /// Create an SSID and return the object the controller stored.
    pub async fn create_wlan(&self, site: &str, wlan: &NewWlan) -> Result<LegacyWlan, Error> {
        debug!(site, ssid = %wlan.name, "creating wlan");
        let created = self
            .submit(
                Endpoint::Site {
                    site,
                    path: WLANCONF,
                },
                wlan,
            )
            .await?;
        single(created, "wlan")
    }

    pub async fn list_wlan_groups(&self, site: &str) -> Result<Vec<LegacyGroup>, Error> {
        debug!(site, "listing wlan groups");
        self.fetch(Endpoint::Site {
            site,
            path: "rest/wlangroup",
        })
        .await
    }

    pub async fn list_user_groups(&self, site: &str) -> Result<Vec<LegacyGroup>, Error> {
        debug!(site, "listing user groups");
        self.fetch(Endpoint::Site {
            site,
            path: "rest/usergroup",
        })
        .await
    }
}
