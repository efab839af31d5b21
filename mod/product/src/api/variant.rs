use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use erp_core::{ListParams, ListResult};

use crate::model::{CreateVariant, Variant};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/variants", post(create_variant).get(list_variants))
        .route("/variants/batch", post(create_variants))
        .route(
            "/variants/{id}",
            get(get_variant).patch(update_variant).delete(delete_variant),
        )
}

async fn create_variant(
    State(state): State<AppState>,
    Json(body): Json<CreateVariant>,
) -> Result<Json<Variant>, ApiError> {
    ok_json(state.service.create_variant(body))
}

/// Create several variants in one validated batch.
async fn create_variants(
    State(state): State<AppState>,
    Json(body): Json<Vec<CreateVariant>>,
) -> Result<Json<Vec<Variant>>, ApiError> {
    ok_json(state.service.create_variants(body))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantQuery {
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    offset: Option<usize>,
    template_id: Option<String>,
}

async fn list_variants(
    State(state): State<AppState>,
    Query(query): Query<VariantQuery>,
) -> Result<Json<ListResult<Variant>>, ApiError> {
    let defaults = ListParams::default();
    let params = ListParams {
        limit: query.limit.unwrap_or(defaults.limit),
        offset: query.offset.unwrap_or(0),
        q: None,
    };
    ok_json(state.service.list_variants(&params, query.template_id.as_deref()))
}

async fn get_variant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Variant>, ApiError> {
    ok_json(state.service.get_variant(&id))
}

async fn update_variant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Variant>, ApiError> {
    ok_json(state.service.update_variant(&id, patch))
}

async fn delete_variant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.service.delete_variant(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
