// ── VLAN provisioning plan ──
//
// A `VlanRequest` arrives straight from the dashboard form. `validate()`
// turns it into a `VlanPlan` without touching the controller; the session
// then applies the plan and renders the router half as a RouterOS script.

use std::fmt;
use std::net::Ipv4Addr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const DEFAULT_PARENT_INTERFACE: &str = "ether2";

const VLAN_ID_RANGE: std::ops::RangeInclusive<i64> = 1..=4094;
const MAX_NETWORK_NAME_CHARS: usize = 64;
/// 802.11 limits the SSID to 32 octets, not characters.
const MAX_SSID_BYTES: usize = 32;
const PASSPHRASE_LEN: std::ops::RangeInclusive<usize> = 8..=63;
const DHCP_POOL_START: u8 = 100;
const DHCP_POOL_END: u8 = 254;

/// Raw provisioning input as posted by the dashboard.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VlanRequest {
    /// Site description or internal name.
    pub site: String,
    /// Signed so out-of-range input reaches validation instead of failing
    /// deserialization.
    pub vlan_id: i64,
    pub network_name: String,
    pub ssid: String,
    pub passphrase: String,
    /// `a.b.c.0`, `a.b.c` or `a.b.c.0/24`.
    pub base_address: String,
    #[serde(default)]
    pub parent_interface: Option<String>,
}

impl fmt::Debug for VlanRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VlanRequest")
            .field("site", &self.site)
            .field("vlan_id", &self.vlan_id)
            .field("network_name", &self.network_name)
            .field("ssid", &self.ssid)
            .field("passphrase", &"[REDACTED]")
            .field("base_address", &self.base_address)
            .field("parent_interface", &self.parent_interface)
            .finish()
    }
}

/// A validated provisioning request.
#[derive(Debug, Clone)]
pub struct VlanPlan {
    pub site: String,
    pub vlan_id: u16,
    pub network_name: String,
    pub ssid: String,
    passphrase: SecretString,
    /// Network address of the /24 (last octet always 0).
    pub subnet: Ipv4Addr,
    pub parent_interface: String,
}

/// What a successful provisioning run created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedVlan {
    pub network_id: String,
    pub wlan_id: String,
    pub script: String,
}

impl VlanRequest {
    /// Check every field and build the plan. Never contacts the controller.
    pub fn validate(&self) -> Result<VlanPlan, CoreError> {
        let site = self.site.trim();
        if site.is_empty() {
            return Err(CoreError::validation("site is required"));
        }

        if !VLAN_ID_RANGE.contains(&self.vlan_id) {
            return Err(CoreError::validation(format!(
                "VLAN id must be between 1 and 4094 (got {})",
                self.vlan_id
            )));
        }
        let vlan_id = u16::try_from(self.vlan_id)
            .map_err(|_| CoreError::validation("VLAN id out of range"))?;

        let network_name = self.network_name.trim();
        validate_network_name(network_name)?;

        let ssid = self.ssid.trim();
        if ssid.is_empty() || ssid.len() > MAX_SSID_BYTES {
            return Err(CoreError::validation("SSID must be 1 to 32 bytes long"));
        }

        let passphrase = &self.passphrase;
        if !PASSPHRASE_LEN.contains(&passphrase.len())
            || !passphrase.chars().all(|c| c.is_ascii() && !c.is_ascii_control())
        {
            return Err(CoreError::validation(
                "passphrase must be 8 to 63 printable ASCII characters",
            ));
        }

        let subnet = parse_base_address(&self.base_address)?;

        let parent_interface = match self.parent_interface.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_PARENT_INTERFACE.to_owned(),
            Some(iface) if iface.chars().all(|c| c.is_ascii_alphanumeric() || "-_.".contains(c)) => {
                iface.to_owned()
            }
            Some(iface) => {
                return Err(CoreError::validation(format!(
                    "invalid parent interface '{iface}'"
                )));
            }
        };

        Ok(VlanPlan {
            site: site.to_owned(),
            vlan_id,
            network_name: network_name.to_owned(),
            ssid: ssid.to_owned(),
            passphrase: SecretString::from(passphrase.clone()),
            subnet,
            parent_interface,
        })
    }
}

fn validate_network_name(name: &str) -> Result<(), CoreError> {
    let chars = name.chars().count();
    if chars == 0 || chars > MAX_NETWORK_NAME_CHARS {
        return Err(CoreError::validation(
            "network name must be 1 to 64 characters long",
        ));
    }
    // The name ends up inside quoted script comments.
    if name.chars().any(|c| c == '"' || c.is_control()) {
        return Err(CoreError::validation(
            "network name must not contain quotes or control characters",
        ));
    }
    Ok(())
}

/// Parse the /24 base address, masking off any host part.
fn parse_base_address(raw: &str) -> Result<Ipv4Addr, CoreError> {
    let raw = raw.trim();
    let invalid = || {
        CoreError::validation(format!(
            "invalid base address '{raw}' (expected a.b.c.0, a.b.c or a.b.c.0/24)"
        ))
    };

    let addr = match raw.split_once('/') {
        Some((addr, "24")) => addr,
        Some((_, prefix)) => {
            return Err(CoreError::validation(format!(
                "only /24 networks are supported (got /{prefix})"
            )));
        }
        None => raw,
    };

    let addr = if addr.split('.').count() == 3 {
        format!("{addr}.0")
    } else {
        addr.to_owned()
    };

    let ip: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
    let [a, b, c, _] = ip.octets();
    Ok(Ipv4Addr::new(a, b, c, 0))
}

impl VlanPlan {
    pub fn gateway(&self) -> Ipv4Addr {
        self.host(1)
    }

    fn host(&self, last: u8) -> Ipv4Addr {
        let [a, b, c, _] = self.subnet.octets();
        Ipv4Addr::new(a, b, c, last)
    }

    /// RouterOS commands for the gateway side of the VLAN.
    pub fn router_script(&self, site_description: &str) -> String {
        let id = self.vlan_id;
        let name = &self.network_name;
        let parent = &self.parent_interface;
        let subnet = self.subnet;
        let gateway = self.gateway();
        let pool_start = self.host(DHCP_POOL_START);
        let pool_end = self.host(DHCP_POOL_END);

        [
            format!("# unidash: VLAN {id} ({name}) on {site_description}"),
            format!(
                "/interface vlan add name=vlan{id} vlan-id={id} interface={parent} comment=\"{name}\""
            ),
            format!("/ip address add address={gateway}/24 interface=vlan{id} comment=\"{name}\""),
            format!("/ip pool add name=pool-vlan{id} ranges={pool_start}-{pool_end}"),
            format!(
                "/ip dhcp-server network add address={subnet}/24 gateway={gateway} dns-server={gateway} comment=\"{name}\""
            ),
            format!(
                "/ip dhcp-server add name=dhcp-vlan{id} interface=vlan{id} address-pool=pool-vlan{id} disabled=no"
            ),
        ]
        .join("\n")
            + "\n"
    }

    pub(crate) fn expose_passphrase(&self) -> &str {
        self.passphrase.expose_secret()
    }
}
