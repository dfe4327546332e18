// Legacy API HTTP client
//
// One `reqwest::Client` per controller session. Requests go out through
// `fetch`/`submit`, answers come back through `decode_envelope`, which
// turns every controller failure shape into an `Error`.

use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::legacy::models::LegacyResponse;
use crate::transport::TransportConfig;

/// Longest slice of a response body quoted in an error message.
const BODY_PREVIEW_CHARS: usize = 200;

/// Where a request goes, relative to the controller root.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Endpoint<'a> {
    /// Root-relative path, never prefixed (`/api/login`).
    Root(&'a str),
    /// Controller-scoped API path: `{prefix}/api/{path}`.
    Controller(&'a str),
    /// Site-scoped API path: `{prefix}/api/s/{site}/{path}`.
    Site { site: &'a str, path: &'a str },
}

/// Session-scoped client for the controller's legacy JSON API.
///
/// Every method returns the unwrapped `data` array of the
/// `{ meta: { rc, msg }, data: [...] }` envelope.
pub struct LegacyClient {
    http: reqwest::Client,
    base_url: Url,
    platform: ControllerPlatform,
    csrf: CsrfToken,
    /// `None` when built from a caller-supplied `reqwest::Client`.
    cookie_jar: Option<Arc<Jar>>,
}

impl LegacyClient {
    /// Build a client with its own cookie jar.
    pub fn new(
        base_url: Url,
        platform: ControllerPlatform,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let jar = transport
            .cookie_jar
            .clone()
            .unwrap_or_else(|| Arc::new(Jar::default()));
        let http = TransportConfig {
            cookie_jar: Some(Arc::clone(&jar)),
            ..transport.clone()
        }
        .build_client()?;

        Ok(Self {
            http,
            base_url,
            platform,
            csrf: CsrfToken::default(),
            cookie_jar: Some(jar),
        })
    }

    /// Wrap an existing `reqwest::Client`. Without a tracked jar, login
    /// cannot check that a session cookie was issued.
    pub fn with_client(http: reqwest::Client, base_url: Url, platform: ControllerPlatform) -> Self {
        Self {
            http,
            base_url,
            platform,
            csrf: CsrfToken::default(),
            cookie_jar: None,
        }
    }

    pub fn platform(&self) -> ControllerPlatform {
        self.platform
    }

    /// The `Cookie` header the jar would send to the controller, if any.
    pub fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookie_jar.as_ref()?.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn tracks_cookies(&self) -> bool {
        self.cookie_jar.is_some()
    }

    pub(crate) fn csrf(&self) -> &CsrfToken {
        &self.csrf
    }

    pub(crate) fn url(&self, endpoint: Endpoint<'_>) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let prefix = self.platform.legacy_prefix();
        let full = match endpoint {
            Endpoint::Root(path) => format!("{base}{path}"),
            Endpoint::Controller(path) => format!("{base}{prefix}/api/{path}"),
            Endpoint::Site { site, path } => format!("{base}{prefix}/api/s/{site}/{path}"),
        };
        Ok(Url::parse(&full)?)
    }

    /// `GET` an endpoint and unwrap its envelope.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint<'_>,
    ) -> Result<Vec<T>, Error> {
        let url = self.url(endpoint)?;
        debug!(%url, "GET");
        let resp = self.http.get(url).send().await?;
        self.read(resp).await
    }

    /// `POST` a JSON body to an endpoint and unwrap its envelope.
    pub(crate) async fn submit<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint<'_>,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<T>, Error> {
        let url = self.url(endpoint)?;
        debug!(%url, "POST");
        let request = self.csrf.attach(self.http.post(url).json(body));
        let resp = request.send().await?;
        self.read(resp).await
    }

    /// `DELETE` an endpoint, discarding whatever the envelope carries.
    pub(crate) async fn remove(&self, endpoint: Endpoint<'_>) -> Result<(), Error> {
        let url = self.url(endpoint)?;
        debug!(%url, "DELETE");
        let request = self.csrf.attach(self.http.delete(url));
        let resp = request.send().await?;
        self.read::<serde_json::Value>(resp).await.map(drop)
    }

    async fn read<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<Vec<T>, Error> {
        self.csrf.observe(resp.headers());
        let status = resp.status();
        let body = resp.text().await?;
        decode_envelope(status, &body)
    }
}

// ── CSRF ─────────────────────────────────────────────────────────────

/// UniFi OS CSRF token: captured at login, rotated by responses, sent on
/// every mutating request.
#[derive(Debug, Default)]
pub(crate) struct CsrfToken(Mutex<Option<String>>);

impl CsrfToken {
    /// Remember a token offered in `headers`, if any.
    pub(crate) fn observe(&self, headers: &HeaderMap) {
        let offered = ["x-updated-csrf-token", "x-csrf-token"]
            .iter()
            .find_map(|name| headers.get(*name))
            .and_then(|v| v.to_str().ok());
        if let (Some(token), Ok(mut slot)) = (offered, self.0.lock()) {
            trace!("CSRF token updated");
            *slot = Some(token.to_owned());
        }
    }

    fn attach(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.0.lock().ok().and_then(|slot| slot.clone());
        match token {
            Some(token) => request.header("X-CSRF-Token", token),
            None => request,
        }
    }
}

// ── Envelope decoding ────────────────────────────────────────────────

/// UniFi OS reports some failures as HTTP 200 with
/// `{"error":{"code":N,"message":"..."}}`.
#[derive(serde::Deserialize)]
struct OsErrorBody {
    error: Option<OsError>,
}

#[derive(serde::Deserialize)]
struct OsError {
    code: u16,
    message: Option<String>,
}

pub(crate) fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> Result<Vec<T>, Error> {
    match status {
        StatusCode::UNAUTHORIZED => {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }
        StatusCode::FORBIDDEN => {
            return Err(Error::LegacyApi {
                message: "insufficient permissions (HTTP 403)".into(),
                status: Some(403),
            });
        }
        s if !s.is_success() => {
            return Err(Error::LegacyApi {
                message: format!("HTTP {s}: {}", preview(body)),
                status: Some(s.as_u16()),
            });
        }
        _ => {}
    }

    if let Ok(OsErrorBody { error: Some(err) }) = serde_json::from_str::<OsErrorBody>(body) {
        let message = err.message.unwrap_or_default();
        return Err(if err.code == 401 {
            Error::Authentication { message }
        } else {
            Error::LegacyApi {
                message: format!("UniFi OS error {}: {message}", err.code),
                status: Some(err.code),
            }
        });
    }

    let envelope: LegacyResponse<T> =
        serde_json::from_str(body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(body)),
            body: body.to_owned(),
        })?;

    if envelope.meta.rc == "ok" {
        return Ok(envelope.data);
    }
    Err(Error::LegacyApi {
        message: envelope
            .meta
            .msg
            .unwrap_or_else(|| format!("rc={}", envelope.meta.rc)),
        status: None,
    })
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
