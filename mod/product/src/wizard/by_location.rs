use erp_core::ServiceError;

use super::{ActionWindow, Invocation, StockWizard, stamp_context};

/// Host wizard opening the "products by location" report for the acting
/// record.
pub struct ProductByLocation;

impl ProductByLocation {
    /// The act-window descriptor this wizard opens.
    pub fn action() -> ActionWindow {
        ActionWindow {
            name: "Products by Location".to_string(),
            res_model: "product.by_location".to_string(),
            active_id: None,
            active_ids: Vec::new(),
        }
    }
}

impl StockWizard for ProductByLocation {
    fn do_open(
        &self,
        action: ActionWindow,
        ctx: &Invocation,
    ) -> Result<Option<ActionWindow>, ServiceError> {
        Ok(Some(stamp_context(action, ctx)))
    }
}
