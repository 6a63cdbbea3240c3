//! Health check endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::sqlite::SqliteService;

/// Shared state for the health endpoint
#[derive(Clone)]
pub struct HealthApiState {
    pub database: Arc<SqliteService>,
}

/// Build health API routes
pub fn routes(database: Arc<SqliteService>) -> Router<()> {
    Router::new()
        .route("/", get(health))
        .with_state(HealthApiState { database })
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// "ok" or "unavailable"
    pub database: &'static str,
}

/// Health check endpoint with a database liveness check
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service and database are healthy", body = HealthResponse),
        (status = 503, description = "Database is unreachable", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<HealthApiState>) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = sqlx::query("SELECT 1")
        .execute(state.database.pool())
        .await
        .is_ok();

    let (code, status, database) = if database_ok {
        (StatusCode::OK, "ok", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}
