pub mod config;
pub mod template;
pub mod variant;

pub use config::ProductConfig;
pub use template::{CreateTemplate, Template};
pub use variant::{CreateVariant, Variant};
