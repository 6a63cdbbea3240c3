//! Counter metadata endpoint for the map view

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::types::ApiError;
use crate::data::series::SeriesStore;
use crate::data::types::CounterRow;

/// Shared state for the counters endpoint
#[derive(Clone)]
pub struct CountersApiState {
    pub store: Arc<dyn SeriesStore>,
}

/// Build counters API routes
pub fn routes(store: Arc<dyn SeriesStore>) -> Router<()> {
    let state = CountersApiState { store };

    Router::new()
        .route("/", get(list_counters))
        .with_state(state)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListCountersResponse {
    pub counters: Vec<CounterRow>,
}

/// List all known counters with their metadata
#[utoipa::path(
    get,
    path = "/api/v1/counters",
    tag = "counters",
    responses(
        (status = 200, description = "All known counters, active and inactive", body = ListCountersResponse)
    )
)]
pub async fn list_counters(
    State(state): State<CountersApiState>,
) -> Result<Json<ListCountersResponse>, ApiError> {
    let counters = state
        .store
        .list_counters()
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(Json(ListCountersResponse { counters }))
}
