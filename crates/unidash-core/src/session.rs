// ── Controller session ──
//
// One authenticated legacy-API session. Every caller opens a session for
// one unit of work and logs out once it is done.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use unidash_api::legacy::models::{LegacyGroup, NewNetwork, NewWlan};
use unidash_api::LegacyClient;

use crate::board::board_revision_report;
use crate::config::ControllerConfig;
use crate::directory::DeviceDirectory;
use crate::error::CoreError;
use crate::model::{Device, Site};
use crate::vlan::{ProvisionedVlan, VlanPlan};

pub struct ControllerSession {
    client: LegacyClient,
    timeout: Duration,
}

impl ControllerSession {
    /// Log into the controller described by `config`.
    ///
    /// The platform is probed when the config does not pin one.
    pub async fn login(config: &ControllerConfig) -> Result<Self, CoreError> {
        let transport = config.transport();
        let lift = |e| lift_timeout(e, config.timeout);

        let platform = match config.platform {
            Some(platform) => platform,
            None => {
                let platform = LegacyClient::detect_platform(&config.url, &transport)
                    .await
                    .map_err(lift)?;
                debug!(?platform, "detected controller platform");
                platform
            }
        };

        let client = LegacyClient::new(config.url.clone(), platform, &transport).map_err(lift)?;
        client
            .login(&config.username, &config.password)
            .await
            .map_err(lift)?;
        debug!("session authentication successful");

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    pub async fn logout(&self) -> Result<(), CoreError> {
        self.client.logout().await.map_err(|e| self.lift(e))
    }

    fn lift(&self, err: unidash_api::Error) -> CoreError {
        lift_timeout(err, self.timeout)
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn list_sites(&self) -> Result<Vec<Site>, CoreError> {
        let sites = self.client.list_sites().await.map_err(|e| self.lift(e))?;
        Ok(sites.into_iter().map(Site::from).collect())
    }

    /// Devices of the site with internal name `site_id`.
    pub async fn list_devices(&self, site_id: &str) -> Result<Vec<Device>, CoreError> {
        let devices = self
            .client
            .list_devices(site_id)
            .await
            .map_err(|e| self.lift(e))?;
        Ok(devices
            .into_iter()
            .map(|d| Device::from_legacy(d, site_id))
            .collect())
    }

    /// Find a site by description, falling back to its internal name.
    pub async fn resolve_site(&self, key: &str) -> Result<Site, CoreError> {
        let sites = self.list_sites().await?;
        let found = sites
            .iter()
            .find(|s| s.description == key)
            .or_else(|| sites.iter().find(|s| s.matches(key)));
        found.cloned().ok_or_else(|| CoreError::SiteNotFound {
            name: key.to_owned(),
        })
    }

    /// Board revision lines for every device at the named site.
    pub async fn board_revisions(&self, site: &str) -> Result<Vec<String>, CoreError> {
        let site = self.resolve_site(site).await?;
        let devices = self.list_devices(&site.id).await?;
        debug!(site = %site.id, devices = devices.len(), "building board revision report");
        Ok(board_revision_report(&devices))
    }

    // ── VLAN provisioning ────────────────────────────────────────────

    /// Create the network and WLAN for `plan` and render the router script.
    pub async fn provision_vlan(&self, plan: &VlanPlan) -> Result<ProvisionedVlan, CoreError> {
        let site = self.resolve_site(&plan.site).await?;
        self.check_conflicts(&site, plan).await?;

        let network = self
            .client
            .create_network(&site.id, &NewNetwork::vlan_only(&plan.network_name, plan.vlan_id))
            .await
            .map_err(|e| self.lift(e))?;
        info!(
            site = %site.id,
            vlan = plan.vlan_id,
            network_id = %network.id,
            "created VLAN network"
        );

        let mut wlan = NewWlan::wpa2_personal(&plan.ssid, plan.expose_passphrase(), &network.id);
        wlan.wlangroup_id = self
            .default_group(&site, "WLAN", self.client.list_wlan_groups(&site.id).await)
            .map(|g| g.id);
        wlan.usergroup_id = self
            .default_group(&site, "user", self.client.list_user_groups(&site.id).await)
            .map(|g| g.id);

        let created = match self.client.create_wlan(&site.id, &wlan).await {
            Ok(created) => created,
            Err(e) => {
                warn!(
                    site = %site.id,
                    network_id = %network.id,
                    "WLAN creation failed, removing the new network"
                );
                if let Err(cleanup) = self.client.delete_network(&site.id, &network.id).await {
                    warn!(
                        site = %site.id,
                        network_id = %network.id,
                        error = %self.lift(cleanup),
                        "could not remove orphaned network"
                    );
                }
                return Err(self.lift(e));
            }
        };
        info!(site = %site.id, ssid = %plan.ssid, wlan_id = %created.id, "created WLAN");

        Ok(ProvisionedVlan {
            network_id: network.id,
            wlan_id: created.id,
            script: plan.router_script(&site.description),
        })
    }

    async fn check_conflicts(&self, site: &Site, plan: &VlanPlan) -> Result<(), CoreError> {
        let wanted_network = plan.network_name.to_lowercase();
        let networks = self
            .client
            .list_networks(&site.id)
            .await
            .map_err(|e| self.lift(e))?;
        if networks
            .iter()
            .any(|n| n.name.to_lowercase() == wanted_network)
        {
            return Err(CoreError::Conflict {
                message: format!(
                    "a network named '{}' already exists on site '{}'",
                    plan.network_name, site.description
                ),
            });
        }

        let wanted_ssid = plan.ssid.to_lowercase();
        let wlans = self
            .client
            .list_wlans(&site.id)
            .await
            .map_err(|e| self.lift(e))?;
        if wlans.iter().any(|w| w.name.to_lowercase() == wanted_ssid) {
            return Err(CoreError::Conflict {
                message: format!(
                    "a WLAN with SSID '{}' already exists on site '{}'",
                    plan.ssid, site.description
                ),
            });
        }
        Ok(())
    }

    /// Pick the site's default group, tolerating a failed lookup.
    fn default_group(
        &self,
        site: &Site,
        kind: &str,
        groups: Result<Vec<LegacyGroup>, unidash_api::Error>,
    ) -> Option<LegacyGroup> {
        match groups {
            Ok(groups) => groups.into_iter().find(LegacyGroup::is_default),
            Err(e) => {
                warn!(site = %site.id, error = %self.lift(e), "{kind} group lookup failed, continuing without");
                None
            }
        }
    }
}

fn lift_timeout(err: unidash_api::Error, timeout: Duration) -> CoreError {
    match CoreError::from(err) {
        CoreError::Timeout { .. } => CoreError::Timeout {
            timeout_secs: timeout.as_secs(),
        },
        other => other,
    }
}

#[async_trait]
impl DeviceDirectory for ControllerSession {
    async fn list_sites(&self) -> Result<Vec<Site>, CoreError> {
        ControllerSession::list_sites(self).await
    }

    async fn list_devices(&self, site: &Site) -> Result<Vec<Device>, CoreError> {
        ControllerSession::list_devices(self, &site.id).await
    }

    async fn release(&self) {
        if let Err(e) = self.logout().await {
            warn!(error = %e, "controller logout failed");
        }
    }
}
