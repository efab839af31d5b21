use erp_core::ServiceError;
use erp_sql::Value;

use crate::model::ProductConfig;
use super::ProductService;

/// Fixed id of the singleton configuration row.
const CONFIG_ID: &str = "config";

impl ProductService {
    /// Get the configuration singleton, if one has been written.
    pub fn get_config(&self) -> Result<Option<ProductConfig>, ServiceError> {
        match self.get_record::<ProductConfig>("product_config", CONFIG_ID) {
            Ok(config) => Ok(Some(config)),
            Err(ServiceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write the configuration singleton (upsert).
    pub fn set_config(&self, config: ProductConfig) -> Result<ProductConfig, ServiceError> {
        let json = serde_json::to_string(&config)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.sql
            .exec(
                "INSERT INTO product_config (id, data) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data",
                &[Value::Text(CONFIG_ID.to_string()), Value::Text(json)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(config)
    }

    /// Default for `unique_variant` on new templates: the singleton's
    /// field, or `None` when no configuration record exists.
    pub fn default_unique_variant(&self) -> Result<Option<bool>, ServiceError> {
        Ok(self.get_config()?.and_then(|c| c.unique_variant))
    }
}
