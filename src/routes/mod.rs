//! API Routes
//!
//! - `/api/v1/album/new`, `/api/v1/album/{id}` - album creation and deletion
//! - `/api/v1/song/new`, `/api/v1/song/{id}` - song creation, thumbnail, deletion
//! - `/api/health` - health check (no auth)
//!
//! Every `/api/v1` handler takes an `Identity` extractor, so requests without
//! a valid bearer token are rejected before the handler runs.

pub mod albums;
pub mod form;
pub mod health;
pub mod songs;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::middleware::cors_layer;
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    info!("Creating application router");

    let admin_routes = Router::new()
        .merge(albums::router())
        .merge(songs::router());

    Router::new()
        .nest("/api/v1", admin_routes)
        .merge(health::router())
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(cors_layer(&server.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
