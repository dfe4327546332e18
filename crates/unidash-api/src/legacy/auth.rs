// Session login/logout and platform detection.
//
// Login stores the session cookie in the client's jar; every later request
// replays it. UniFi OS additionally hands out a CSRF token here.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::legacy::client::{Endpoint, LegacyClient};
use crate::transport::TransportConfig;

/// Probe order for [`LegacyClient::detect_platform`].
const PROBES: [ControllerPlatform; 2] = [
    ControllerPlatform::UnifiOs,
    ControllerPlatform::ClassicController,
];

impl LegacyClient {
    /// Log in with username and password.
    ///
    /// A success status without a session cookie is still a failed login.
    /// The rejection message never quotes the controller's response body.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.url(Endpoint::Root(self.platform().login_path()))?;
        debug!(%url, username, "logging in");

        let credentials = json!({
            "username": username,
            "password": password.expose_secret(),
        });
        let resp = self.http().post(url).json(&credentials).send().await?;

        if !resp.status().is_success() {
            return Err(Error::Authentication {
                message: format!("login rejected (HTTP {})", resp.status()),
            });
        }
        self.csrf().observe(resp.headers());

        if self.tracks_cookies() && self.cookie_header().is_none() {
            return Err(Error::Authentication {
                message: "controller did not issue a session cookie".into(),
            });
        }
        debug!("session established");
        Ok(())
    }

    /// End the session. The response body is ignored.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.url(Endpoint::Root(self.platform().logout_path()))?;
        debug!(%url, "logging out");
        let request = self.http().post(url);
        request.send().await?;
        Ok(())
    }

    /// Work out which platform serves `base_url`.
    ///
    /// The first platform whose login path answers anything but 404 wins;
    /// an unreachable UniFi OS probe falls through to the classic one.
    /// Only a transport failure on the last probe is an error.
    pub async fn detect_platform(
        base_url: &Url,
        transport: &TransportConfig,
    ) -> Result<ControllerPlatform, Error> {
        let http = transport.build_client()?;
        let base = base_url.as_str().trim_end_matches('/');

        for platform in PROBES {
            let probe = Url::parse(&format!("{base}{}", platform.login_path()))?;
            debug!(%probe, ?platform, "probing controller platform");

            match http.get(probe).send().await {
                Ok(resp) if resp.status() != reqwest::StatusCode::NOT_FOUND => {
                    debug!(?platform, "controller platform detected");
                    return Ok(platform);
                }
                Ok(_) => {}
                Err(e) if platform == ControllerPlatform::ClassicController => {
                    return Err(e.into());
                }
                Err(e) => debug!(error = %e, ?platform, "probe failed"),
            }
        }
        // Neither login path exists; the classic controller is the safer guess.
        Ok(ControllerPlatform::ClassicController)
    }
}
