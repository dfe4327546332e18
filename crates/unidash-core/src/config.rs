// ── Runtime connection configuration ──
//
// These types describe *how* to reach the controller and how the search
// behaves. They carry credential data and tuning, but never touch disk.
// The config crate builds them and hands them in.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use unidash_api::{ControllerPlatform, TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for controllers.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for connecting to the controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller URL (e.g., `https://unifi.example.com:8443`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// Fixed platform, or `None` to probe on every login.
    pub platform: Option<ControllerPlatform>,
    pub tls: TlsVerification,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl ControllerConfig {
    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            cookie_jar: None,
        }
    }
}

/// Where the MAC search reads device rosters from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DirectoryBackend {
    /// Query the controller for every request.
    #[default]
    Live,
    /// Read the locally synced SQLite snapshot.
    Snapshot,
}

/// Timing bounds for one fan-out search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Upper bound on a single site's device-roster fetch.
    pub site_timeout: Duration,
    /// Upper bound on the whole search.
    pub deadline: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            site_timeout: Duration::from_secs(15),
            deadline: Duration::from_secs(120),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn backend_round_trips_through_strings() {
        assert_eq!("snapshot".parse::<DirectoryBackend>().unwrap(), DirectoryBackend::Snapshot);
        assert_eq!(DirectoryBackend::Live.to_string(), "live");
    }

    #[test]
    fn transport_follows_tls_setting() {
        let cfg = ControllerConfig {
            url: "https://unifi.example.com:8443".parse().unwrap(),
            username: "admin".into(),
            password: SecretString::from("pw".to_string()),
            platform: None,
            tls: TlsVerification::SystemDefaults,
            timeout: Duration::from_secs(5),
        };
        let transport = cfg.transport();
        assert!(matches!(transport.tls, TlsMode::System));
        assert_eq!(transport.timeout, Duration::from_secs(5));
    }
}
