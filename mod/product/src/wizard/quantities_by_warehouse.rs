use erp_core::ServiceError;

use super::{ActionWindow, Invocation, StockWizard, stamp_context};

/// Host wizard opening the "product quantities by warehouse" report for
/// the acting record.
pub struct OpenProductQuantitiesByWarehouse;

impl OpenProductQuantitiesByWarehouse {
    /// The act-window descriptor this wizard opens.
    pub fn action() -> ActionWindow {
        ActionWindow {
            name: "Product Quantities By Warehouse".to_string(),
            res_model: "stock.product_quantities_warehouse".to_string(),
            active_id: None,
            active_ids: Vec::new(),
        }
    }
}

impl StockWizard for OpenProductQuantitiesByWarehouse {
    fn do_open(
        &self,
        action: ActionWindow,
        ctx: &Invocation,
    ) -> Result<Option<ActionWindow>, ServiceError> {
        Ok(Some(stamp_context(action, ctx)))
    }
}
