pub mod config;
pub mod stock;
pub mod template;
pub mod variant;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use erp_core::ServiceError;

use crate::service::ProductService;
use crate::wizard::{
    OpenProductQuantitiesByWarehouse, ProductByLocation, UniqueVariantRedirect,
};

/// Shared application state: the service plus the two wrapped wizards.
pub struct ProductState {
    pub service: Arc<ProductService>,
    pub by_location: UniqueVariantRedirect<ProductByLocation>,
    pub quantities: UniqueVariantRedirect<OpenProductQuantitiesByWarehouse>,
}

pub type AppState = Arc<ProductState>;

/// Build the product API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/product/v1", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(template::routes())
        .merge(variant::routes())
        .merge(config::routes())
        .merge(stock::routes())
}

/// Standard API error response body.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        }));
        (status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let code = err.status_code().as_u16();
        ApiError {
            code,
            message: err.to_string(),
        }
    }
}

/// Wrap a Result<T, ServiceError> into an API response.
pub(crate) fn ok_json<T: Serialize>(result: Result<T, ServiceError>) -> Result<Json<T>, ApiError> {
    result.map(Json).map_err(ApiError::from)
}
