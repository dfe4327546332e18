//! Allowlist middleware.
//!
//! Runs before routing, so a denied caller never reaches a handler, the
//! controller or the static files.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use super::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

pub(crate) async fn enforce_allowlist(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let source = source_address(&state, &request);

    match source.as_deref() {
        Some(addr) if state.access.is_allowed(addr) => {
            debug!(source = addr, path = %request.uri().path(), "request allowed");
            next.run(request).await
        }
        other => {
            warn!(
                source = other.unwrap_or("<unknown>"),
                method = %request.method(),
                path = %request.uri().path(),
                "request denied by allowlist"
            );
            (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({ "error": "Access denied" })),
            )
                .into_response()
        }
    }
}

/// The address the allowlist judges: the peer socket, or the left-most
/// `X-Forwarded-For` entry when the server sits behind a trusted proxy.
fn source_address(state: &AppState, request: &Request) -> Option<String> {
    if state.trust_forwarded_for {
        if let Some(forwarded) = request
            .headers()
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return Some(forwarded.to_owned());
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(peer)| peer.ip().to_string())
}
