use axum::{
    Json, Router,
    extract::State,
    routing::post,
};

use crate::wizard::{
    ActionWindow, Invocation, OpenProductQuantitiesByWarehouse, ProductByLocation, StockWizard,
};
use super::{ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stock/by-location/start", post(by_location_start))
        .route("/stock/by-location/open", post(by_location_open))
        .route(
            "/stock/quantities-by-warehouse/start",
            post(quantities_start),
        )
        .route("/stock/quantities-by-warehouse/open", post(quantities_open))
}

async fn by_location_start(
    State(state): State<AppState>,
    Json(ctx): Json<Invocation>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let defaults = state
        .by_location
        .default_start(&[], &ctx)
        .map_err(ApiError::from)?;
    Ok(Json(defaults))
}

/// `null` in the response body means no view opens.
async fn by_location_open(
    State(state): State<AppState>,
    Json(ctx): Json<Invocation>,
) -> Result<Json<Option<ActionWindow>>, ApiError> {
    let opened = state
        .by_location
        .do_open(ProductByLocation::action(), &ctx)
        .map_err(ApiError::from)?;
    Ok(Json(opened))
}

async fn quantities_start(
    State(state): State<AppState>,
    Json(ctx): Json<Invocation>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let defaults = state
        .quantities
        .default_start(&[], &ctx)
        .map_err(ApiError::from)?;
    Ok(Json(defaults))
}

async fn quantities_open(
    State(state): State<AppState>,
    Json(ctx): Json<Invocation>,
) -> Result<Json<Option<ActionWindow>>, ApiError> {
    let opened = state
        .quantities
        .do_open(OpenProductQuantitiesByWarehouse::action(), &ctx)
        .map_err(ApiError::from)?;
    Ok(Json(opened))
}
