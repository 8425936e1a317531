// Catalog Admin - write API for an audio catalog: uploads, metadata, cache invalidation

pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod storage;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use catalog::CatalogService;
pub use config::Config;
pub use models::AppState;
pub use types::{AppError, AppResult};

pub fn create_router(state: AppState, server: &config::ServerConfig) -> axum::Router {
    routes::create_router(state, server)
}
