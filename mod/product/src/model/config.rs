use serde::{Deserialize, Serialize};

/// Product configuration singleton.
///
/// `unique_variant` is the process-wide default consulted when a new
/// template is created without an explicit value. When no configuration
/// record exists, new templates get no default (the flag stays off).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_variant: Option<bool>,
}
