//! HTTP server setup and routing.

mod access;
mod error;
mod handlers;
mod ndjson;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use unidash_core::{AccessList, ControllerConfig, DirectorySource, SearchOptions};

pub use error::ApiError;

/// Shared state of the dashboard server.
pub struct AppState {
    /// Source-address allowlist applied to every request.
    pub access: AccessList,
    /// Honor the left-most `X-Forwarded-For` entry.
    pub trust_forwarded_for: bool,
    /// Backend for `/sites` and the MAC search.
    pub directories: Arc<dyn DirectorySource>,
    /// Controller for board revisions and VLAN provisioning. `None` when
    /// running snapshot-only without credentials.
    pub controller: Option<ControllerConfig>,
    pub search: SearchOptions,
    pub static_dir: PathBuf,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/board-revision", post(handlers::board_revision))
        .route("/mac-lookup", post(handlers::mac_lookup))
        .route("/sites", get(handlers::list_sites))
        .route("/create-vlan", post(handlers::create_vlan))
        .route("/healthz", get(handlers::healthz))
        // Dashboard page and assets
        .fallback_service(ServeDir::new(&state.static_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // The allowlist wraps everything above, static files and CORS preflights included.
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            access::enforce_allowlist,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the dashboard on `addr` until Ctrl-C.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let rules = state.access.rules().len();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, allow_rules = rules, "dashboard listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
