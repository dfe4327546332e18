//! Configuration for the unidash server and CLI.
//!
//! TOML file + environment, credential resolution, and translation into the
//! runtime types `unidash_core` consumes (`ControllerConfig`, `AccessList`,
//! `SearchOptions`).

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use unidash_api::ControllerPlatform;
use unidash_core::{AccessList, ControllerConfig, DirectoryBackend, SearchOptions, TlsVerification};

/// File name looked up in the working directory before the platform config dir.
pub const LOCAL_CONFIG_FILE: &str = "unidash.toml";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no controller {field} configured (set controller.{field} or UNIFI_{env})")]
    NoCredentials { field: &'static str, env: &'static str },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub controller: ControllerSection,

    #[serde(default)]
    pub search: SearchSection,

    #[serde(default)]
    pub snapshot: SnapshotSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind")]
    pub bind: String,

    /// Directory the dashboard page is served from.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Take the client address from the left-most `X-Forwarded-For` entry.
    #[serde(default)]
    pub trust_forwarded_for: bool,

    /// Source addresses and CIDR blocks allowed to reach the dashboard.
    #[serde(default = "default_allowlist")]
    pub allowlist: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            static_dir: default_static_dir(),
            trust_forwarded_for: false,
            allowlist: default_allowlist(),
        }
    }
}

fn default_port() -> u16 {
    5000
}
fn default_bind() -> String {
    "0.0.0.0".into()
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("web")
}
fn default_allowlist() -> Vec<String> {
    vec!["127.0.0.1".into(), "::1".into()]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerSection {
    /// Controller base URL (e.g., "https://unifi.example.com:8443").
    #[serde(default = "default_controller_url")]
    pub url: String,

    pub username: Option<String>,

    /// Plaintext password; prefer `UNIFI_PASS`.
    pub password: Option<String>,

    /// Accept self-signed certificates. Defaults to true unless `ca_cert` is set.
    pub insecure: Option<bool>,

    /// Path to a custom CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// "auto", "classic" or "unifi-os".
    #[serde(default = "default_platform")]
    pub platform: String,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            url: default_controller_url(),
            username: None,
            password: None,
            insecure: None,
            ca_cert: None,
            timeout: default_timeout(),
            platform: default_platform(),
        }
    }
}

fn default_controller_url() -> String {
    "https://127.0.0.1:8443".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_platform() -> String {
    "auto".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchSection {
    #[serde(default)]
    pub backend: DirectoryBackend,

    #[serde(default = "default_site_timeout")]
    pub site_timeout_secs: u64,

    #[serde(default = "default_deadline")]
    pub deadline_secs: u64,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            backend: DirectoryBackend::default(),
            site_timeout_secs: default_site_timeout(),
            deadline_secs: default_deadline(),
        }
    }
}

fn default_site_timeout() -> u64 {
    15
}
fn default_deadline() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotSection {
    #[serde(default = "default_snapshot_path")]
    pub path: PathBuf,
}

impl Default for SnapshotSection {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("devices.db")
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `./unidash.toml` when present, otherwise
/// the platform config directory.
pub fn config_path() -> PathBuf {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return local;
    }
    ProjectDirs::from("com", "nexuswifi", "unidash").map_or(local, |dirs| {
        dirs.config_dir().join("config.toml")
    })
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from defaults, file and environment.
///
/// Later sources win: defaults, the TOML file (`path` or [`config_path`]),
/// the dashboard's historical `UNIFI_USER` / `UNIFI_PASS` / `PORT`
/// variables, then `UNIDASH_*` with `__` as the section separator
/// (`UNIDASH_SERVER__PORT=8080`). A missing file is not an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    let historical = Env::raw().filter_map(|key| {
        if key == "UNIFI_USER" {
            Some("controller.username".into())
        } else if key == "UNIFI_PASS" {
            Some("controller.password".into())
        } else if key == "PORT" {
            Some("server.port".into())
        } else {
            None
        }
    });

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(historical)
        .merge(Env::prefixed("UNIDASH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Render the effective config as TOML with the password masked.
pub fn render_config(cfg: &Config) -> Result<String, ConfigError> {
    let mut shown = cfg.clone();
    if shown.controller.password.is_some() {
        shown.controller.password = Some("********".into());
    }
    Ok(toml::to_string_pretty(&shown)?)
}

// ── Translation to runtime types ────────────────────────────────────

impl Config {
    /// Controller connection settings with resolved credentials.
    pub fn controller_config(&self) -> Result<ControllerConfig, ConfigError> {
        let section = &self.controller;

        let url: url::Url = section
            .url
            .parse()
            .map_err(|_| invalid("controller.url", format!("invalid URL: {}", section.url)))?;

        let username = section
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::NoCredentials {
                field: "username",
                env: "USER",
            })?;
        let password = section
            .password
            .clone()
            .filter(|p| !p.is_empty())
            .map(SecretString::from)
            .ok_or(ConfigError::NoCredentials {
                field: "password",
                env: "PASS",
            })?;

        let tls = match (section.insecure, &section.ca_cert) {
            (Some(true), _) => TlsVerification::DangerAcceptInvalid,
            (_, Some(ca_path)) => TlsVerification::CustomCa(ca_path.clone()),
            (Some(false), None) => TlsVerification::SystemDefaults,
            // Controllers typically run with self-signed certs.
            (None, None) => TlsVerification::DangerAcceptInvalid,
        };

        if section.timeout == 0 {
            return Err(invalid("controller.timeout", "must be at least 1 second"));
        }

        Ok(ControllerConfig {
            url,
            username,
            password,
            platform: parse_platform(&section.platform)?,
            tls,
            timeout: Duration::from_secs(section.timeout),
        })
    }

    /// The parsed source-address allowlist.
    pub fn access_list(&self) -> Result<AccessList, ConfigError> {
        AccessList::parse(&self.server.allowlist)
            .map_err(|e| invalid("server.allowlist", e.to_string()))
    }

    pub fn search_options(&self) -> Result<SearchOptions, ConfigError> {
        let search = &self.search;
        if search.site_timeout_secs == 0 {
            return Err(invalid("search.site_timeout_secs", "must be at least 1"));
        }
        if search.deadline_secs == 0 {
            return Err(invalid("search.deadline_secs", "must be at least 1"));
        }
        Ok(SearchOptions {
            site_timeout: Duration::from_secs(search.site_timeout_secs),
            deadline: Duration::from_secs(search.deadline_secs),
        })
    }

    /// Socket address the HTTP server listens on.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .server
            .bind
            .parse()
            .map_err(|_| invalid("server.bind", format!("not an IP address: {}", self.server.bind)))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

fn parse_platform(raw: &str) -> Result<Option<ControllerPlatform>, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "auto" | "" => Ok(None),
        "classic" => Ok(Some(ControllerPlatform::ClassicController)),
        "unifi-os" | "unifios" => Ok(Some(ControllerPlatform::UnifiOs)),
        other => Err(invalid(
            "controller.platform",
            format!("expected 'auto', 'classic' or 'unifi-os', got '{other}'"),
        )),
    }
}
