// Network configuration endpoints (`rest/networkconf`): the site's LAN,
// VLAN and WAN definitions.

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::{Endpoint, LegacyClient};
use crate::legacy::models::{LegacyNetwork, NewNetwork};

const NETWORKCONF: &str = "rest/networkconf";

impl LegacyClient {
    /// `GET /api/s/{site}/rest/networkconf`
    pub async fn list_networks(&self, site: &str) -> Result<Vec<LegacyNetwork>, Error> {
        debug!(site, "listing networks");
        self.fetch(Endpoint::Site {
            site,
            path: NETWORKCONF,
        })
        .await
    }

    /// Create a network and return the object the controller stored.
    ///
    /// `POST /api/s/{site}/rest/networkconf`
    pub async fn create_network(
        &self,
        site: &str,
        network: &NewNetwork,
    ) -> Result<LegacyNetwork, Error> {
        debug!(site, name = %network.name, vlan = network.vlan, "creating network");
        let created = self
            .submit(
                Endpoint::Site {
                    site,
                    path: NETWORKCONF,
                },
                network,
            )
            .await?;
        single(created, "network")
    }

    /// `DELETE /api/s/{site}/rest/networkconf/{id}`
    pub async fn delete_network(&self, site: &str, network_id: &str) -> Result<(), Error> {
        debug!(site, network_id, "deleting network");
        let path = format!("{NETWORKCONF}/{network_id}");
        self.remove(Endpoint::Site { site, path: &path }).await
    }
}

/// The one object a `rest/*` create answers with.
pub(crate) fn single<T>(mut created: Vec<T>, kind: &str) -> Result<T, Error> {
    created.pop().ok_or_else(|| Error::LegacyApi {
        message: format!("controller returned no {kind} object"),
        status: None,
    })
}
