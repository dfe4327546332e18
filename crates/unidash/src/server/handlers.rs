//! Route handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use unidash_core::{
    ControllerConfig, ControllerSession, CoreError, DeviceDirectory, DirectorySource, MacAddress,
    VlanRequest, search_for_mac,
};

use super::AppState;
use super::error::ApiError;
use super::ndjson;

type ApiResult<T> = Result<T, ApiError>;

fn controller(state: &AppState) -> ApiResult<&ControllerConfig> {
    state.controller.as_ref().ok_or_else(|| {
        ApiError::Core(CoreError::Config {
            message: "no controller credentials configured".into(),
        })
    })
}

// ── Board revisions ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct BoardRevisionRequest {
    #[serde(default, alias = "site_desc")]
    site: String,
}

pub(crate) async fn board_revision(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BoardRevisionRequest>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Json(req) = body?;
    let site = req.site.trim();
    if site.is_empty() {
        return Err(ApiError::BadRequest("Missing site description".into()));
    }

    let session = ControllerSession::login(controller(&state)?).await?;
    let results = session.board_revisions(site).await;
    session.release().await;
    let results = results?;
    info!(site, devices = results.len(), "board revision lookup");
    Ok(Json(json!({ "results": results })))
}

// ── MAC search ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct MacLookupRequest {
    #[serde(default)]
    mac: String,
}

pub(crate) async fn mac_lookup(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MacLookupRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = body?;
    if req.mac.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing MAC address".into()));
    }
    let target: MacAddress = req.mac.parse().map_err(CoreError::from)?;

    let directory = state.directories.open().await?;
    let sites = match directory.list_sites().await {
        Ok(sites) => sites,
        Err(e) => {
            directory.release().await;
            return Err(e.into());
        }
    };
    info!(mac = %target, sites = sites.len(), "starting MAC search");

    let events = search_for_mac(directory, sites, target, state.search);
    Ok(ndjson::stream_response(events))
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct SiteEntry {
    name: String,
    desc: String,
}

pub(crate) async fn list_sites(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<serde_json::Value>> {
    let directory = state.directories.open().await?;
    let listed = directory.list_sites().await;
    directory.release().await;
    let mut sites: Vec<SiteEntry> = listed?
        .into_iter()
        .map(|s| SiteEntry {
            name: s.id,
            desc: s.description,
        })
        .collect();
    sites.sort_by(|a, b| a.desc.cmp(&b.desc));
    debug!(count = sites.len(), "listed sites");
    Ok(Json(json!({ "sites": sites })))
}

// ── VLAN provisioning ────────────────────────────────────────────────

pub(crate) async fn create_vlan(
    State(state): State<Arc<AppState>>,
    body: Result<Json<VlanRequest>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Json(req) = body?;
    let plan = req.validate()?;

    let session = ControllerSession::login(controller(&state)?).await?;
    let created = session.provision_vlan(&plan).await;
    session.release().await;
    let created = created?;
    info!(
        site = %plan.site,
        vlan = plan.vlan_id,
        network_id = %created.network_id,
        wlan_id = %created.wlan_id,
        "VLAN provisioned"
    );
    Ok(Json(json!({ "script": created.script })))
}

// ── Health ───────────────────────────────────────────────────────────

pub(crate) async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
