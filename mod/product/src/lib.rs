pub mod api;
pub mod model;
pub mod service;
pub mod wizard;

use std::sync::Arc;

use axum::Router;
use erp_core::Module;

use service::ProductService;
use wizard::{OpenProductQuantitiesByWarehouse, ProductByLocation, UniqueVariantRedirect};

/// Product module — templates, variants, the unique-variant rule and the
/// stock-view redirection wizards.
pub struct ProductModule {
    state: api::AppState,
}

impl ProductModule {
    pub fn new(service: ProductService) -> Self {
        let service = Arc::new(service);
        let state = Arc::new(api::ProductState {
            by_location: UniqueVariantRedirect::new(ProductByLocation, Arc::clone(&service)),
            quantities: UniqueVariantRedirect::new(
                OpenProductQuantitiesByWarehouse,
                Arc::clone(&service),
            ),
            service,
        });
        Self { state }
    }
}

impl Module for ProductModule {
    fn name(&self) -> &str {
        "product"
    }

    fn routes(&self) -> Router {
        api::router(self.state.clone())
    }
}
