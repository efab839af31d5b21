use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use erp_core::{ListParams, ListResult, ServiceError};

use crate::model::{CreateTemplate, Template};
use crate::service::code::CodeClause;
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/templates", post(create_template).get(list_templates))
        .route(
            "/templates/{id}",
            get(get_template).patch(update_template).delete(delete_template),
        )
        .route("/templates/{id}/code", get(get_code).put(set_code))
}

async fn create_template(
    State(state): State<AppState>,
    Json(body): Json<CreateTemplate>,
) -> Result<Json<Template>, ApiError> {
    ok_json(state.service.create_template(body))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateQuery {
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    offset: Option<usize>,
    /// Free-text record-name query.
    q: Option<String>,
    /// Exact derived-code match.
    code: Option<String>,
    /// Substring derived-code match.
    code_contains: Option<String>,
}

/// List templates. `q` runs the record-name search (name OR variant code);
/// `code` / `codeContains` search on the derived code field.
async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Json<ListResult<Template>>, ApiError> {
    let defaults = ListParams::default();
    let limit = query.limit.unwrap_or(defaults.limit);
    let offset = query.offset.unwrap_or(0);

    let result: Result<ListResult<Template>, ServiceError> = (|| {
        let items = if let Some(code) = &query.code {
            state.service.search_templates_by_code(&CodeClause::eq(code))?
        } else if let Some(fragment) = &query.code_contains {
            state.service.search_templates_by_code(&CodeClause::contains(fragment))?
        } else if let Some(q) = &query.q {
            state.service.search_templates_rec_name(&CodeClause::contains(q))?
        } else {
            return state.service.list_templates(&ListParams { limit, offset, q: None });
        };
        Ok(paginate(items, limit, offset))
    })();
    ok_json(result)
}

/// Apply the list window to search results; `total` counts all matches.
fn paginate<T: serde::Serialize>(items: Vec<T>, limit: usize, offset: usize) -> ListResult<T> {
    let total = items.len();
    let items = items.into_iter().skip(offset).take(limit).collect();
    ListResult { items, total }
}

async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Template>, ApiError> {
    ok_json(state.service.get_template(&id))
}

async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Template>, ApiError> {
    ok_json(state.service.update_template(&id, patch))
}

async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.service.delete_template(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

async fn get_code(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let code = state.service.get_template_code(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"code": code})))
}

#[derive(Deserialize)]
struct SetCodeBody {
    code: Option<String>,
}

async fn set_code(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SetCodeBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .service
        .set_template_code(&[id.clone()], body.code.as_deref())
        .map_err(ApiError::from)?;
    let code = state.service.get_template_code(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"code": code})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_results_are_windowed() {
        let result = paginate(vec![1, 2, 3, 4, 5], 2, 1);
        assert_eq!(result.total, 5);
        assert_eq!(result.items, vec![2, 3]);

        let past_end = paginate(vec![1, 2], 10, 5);
        assert_eq!(past_end.total, 2);
        assert!(past_end.items.is_empty());
    }
}
