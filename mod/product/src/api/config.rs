use axum::{
    Json, Router,
    extract::State,
    routing::get,
};

use crate::model::ProductConfig;
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new().route("/config", get(get_config).put(set_config))
}

async fn get_config(
    State(state): State<AppState>,
) -> Result<Json<ProductConfig>, ApiError> {
    let config = state.service.get_config().map_err(ApiError::from)?;
    Ok(Json(config.unwrap_or_default()))
}

async fn set_config(
    State(state): State<AppState>,
    Json(body): Json<ProductConfig>,
) -> Result<Json<ProductConfig>, ApiError> {
    ok_json(state.service.set_config(body))
}
