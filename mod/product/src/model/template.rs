use serde::{Deserialize, Serialize};

/// Template — a product definition that may own one or more variants.
///
/// With `unique_variant` set, the template is restricted to owning at
/// most one variant, and its derived `code` mirrors that variant's code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,

    /// Record name, matched by free-text search.
    pub name: String,

    /// Restricts this template to at most one owned variant.
    #[serde(default)]
    pub unique_variant: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

/// Input for creating a template.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplate {
    pub name: String,

    /// Left unset, the value comes from the product configuration singleton.
    #[serde(default)]
    pub unique_variant: Option<bool>,
}
