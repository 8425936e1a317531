use axum::{extract::State, routing::get, Json, Router};

use crate::models::{AppState, HealthResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = state.catalog.health().await;

    let status_of = |up: bool| if up { "connected" } else { "unavailable" }.to_string();

    Json(HealthResponse {
        status: if report.database { "ok" } else { "degraded" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database: status_of(report.database),
        cache: status_of(report.cache),
    })
}
