use serde::{Deserialize, Serialize};

/// Variant ("product") — a concrete sellable/stockable unit referencing
/// exactly one [`Template`](super::Template).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,

    /// Owning template (many-to-one).
    pub template_id: String,

    /// Variant code. Nullable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

/// Input for creating a variant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariant {
    pub template_id: String,

    #[serde(default)]
    pub code: Option<String>,
}
