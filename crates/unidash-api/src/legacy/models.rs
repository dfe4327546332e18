// Legacy API response types
//
// Models for the UniFi controller's legacy JSON API. All responses are wrapped
// in the `LegacyResponse<T>` envelope. Fields use `#[serde(default)]` liberally
// because the API is inconsistent about field presence across firmware versions.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard UniFi legacy API response envelope.
///
/// Every legacy endpoint wraps its payload:
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    pub data: Vec<T>,
}

/// Metadata from the legacy envelope. `rc` == `"ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Site ─────────────────────────────────────────────────────────────

/// Site object from `/api/self/sites`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacySite {
    #[serde(rename = "_id")]
    pub id: String,
    /// Internal reference name used in `/api/s/{name}/...` paths.
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Device ───────────────────────────────────────────────────────────

/// Device object from `stat/device`.
///
/// The legacy API returns 100+ fields per device. Only the ones the
/// dashboard reads are modeled; everything else lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyDevice {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub mac: String,
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Hardware board revision, absent on some models.
    #[serde(default)]
    pub board_rev: Option<i64>,
    #[serde(default)]
    pub adopted: bool,
    /// 0=offline, 1=online, 2=pending, 4=upgrading, 5=provisioning
    #[serde(default)]
    pub state: i32,
    #[serde(default)]
    pub site_id: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Network ──────────────────────────────────────────────────────────

/// Network configuration from `rest/networkconf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyNetwork {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub vlan_enabled: Option<bool>,
    /// Older firmware serializes the VLAN id as a string.
    #[serde(default)]
    pub vlan: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body for `POST rest/networkconf`.
#[derive(Debug, Clone, Serialize)]
pub struct NewNetwork {
    pub name: String,
    pub purpose: String,
    pub vlan_enabled: bool,
    pub vlan: u16,
    pub enabled: bool,
}

impl NewNetwork {
    /// A tagged VLAN whose gateway lives on an external router.
    pub fn vlan_only(name: impl Into<String>, vlan: u16) -> Self {
        Self {
            name: name.into(),
            purpose: "vlan-only".into(),
            vlan_enabled: true,
            vlan,
            enabled: true,
        }
    }
}

// ── WLAN ─────────────────────────────────────────────────────────────

/// WLAN configuration from `rest/wlanconf`. `name` is the broadcast SSID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyWlan {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub security: Option<String>,
    #[serde(default)]
    pub networkconf_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body for `POST rest/wlanconf`.
#[derive(Debug, Clone, Serialize)]
pub struct NewWlan {
    pub name: String,
    pub x_passphrase: String,
    pub security: String,
    pub wpa_mode: String,
    pub wpa_enc: String,
    pub enabled: bool,
    pub networkconf_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wlangroup_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usergroup_id: Option<String>,
}

impl NewWlan {
    /// WPA2-PSK (CCMP) SSID bound to `networkconf_id`.
    pub fn wpa2_personal(
        ssid: impl Into<String>,
        passphrase: impl Into<String>,
        networkconf_id: impl Into<String>,
    ) -> Self {
        Self {
            name: ssid.into(),
            x_passphrase: passphrase.into(),
            security: "wpapsk".into(),
            wpa_mode: "wpa2".into(),
            wpa_enc: "ccmp".into(),
            enabled: true,
            networkconf_id: networkconf_id.into(),
            wlangroup_id: None,
            usergroup_id: None,
        }
    }
}

// ── Groups ───────────────────────────────────────────────────────────

/// Entry from `rest/wlangroup` or `rest/usergroup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyGroup {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Set on the built-in "Default" group of each site.
    #[serde(default)]
    pub attr_no_delete: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LegacyGroup {
    /// Whether this is the site's built-in default group.
    pub fn is_default(&self) -> bool {
        self.attr_no_delete.unwrap_or(false) || self.name.eq_ignore_ascii_case("default")
    }
}
