use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing::get};
use serde_json::json;

use crate::HealthResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}

/// Service banner with the main endpoints.
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": format!("CRACK PROTOCOL API v{}", env!("CARGO_PKG_VERSION")),
        "status": "active",
        "endpoints": {
            "register": "/api/auth/register",
            "chat": "/api/chat/{username}",
            "leaderboard": "/api/leaderboard",
            "stats": "/api/stats",
            "predictions": "/api/predictions",
            "docs": "/swagger-ui"
        }
    }))
}

/// Health check endpoint: verifies the API and database are operational
/// and reports whether NEO is backed by the completion endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };
    let http_status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let persona = if state.guard.is_online() { "online" } else { "fallback" };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            persona: persona.to_string(),
        }),
    )
}
