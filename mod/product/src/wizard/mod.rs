//! Stock-view wizard redirection.
//!
//! Report wizards invoked with a template as the active subject are
//! redirected to the template's sole variant, since the underlying stock
//! reports only understand variants. The redirection is a decorator over
//! the host wizard rather than an override of it.

pub mod by_location;
pub mod quantities_by_warehouse;

pub use by_location::ProductByLocation;
pub use quantities_by_warehouse::OpenProductQuantitiesByWarehouse;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use erp_core::ServiceError;

use crate::service::ProductService;

/// The entity kind a wizard was invoked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveModel {
    #[serde(rename = "product.template")]
    Template,
    #[serde(rename = "product.product")]
    Variant,
}

/// Typed invocation context: which record the caller had active when the
/// wizard was launched. Replaces the host's ambient context dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub active_model: ActiveModel,
    pub active_id: String,
    #[serde(default)]
    pub active_ids: Vec<String>,
}

impl Invocation {
    pub fn for_template(id: &str) -> Self {
        Self {
            active_model: ActiveModel::Template,
            active_id: id.to_string(),
            active_ids: vec![id.to_string()],
        }
    }

    pub fn for_variant(id: &str) -> Self {
        Self {
            active_model: ActiveModel::Variant,
            active_id: id.to_string(),
            active_ids: vec![id.to_string()],
        }
    }
}

/// A window action descriptor handed back to the client, directing it to
/// open a report view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionWindow {
    pub name: String,
    pub res_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_id: Option<String>,
    #[serde(default)]
    pub active_ids: Vec<String>,
}

/// Extension point for stock-view wizards.
pub trait StockWizard: Send + Sync {
    /// Compute default values for the wizard's start form. The default
    /// implementation returns an empty defaults object, so wizards without
    /// a start step need not provide one.
    fn default_start(
        &self,
        _fields: &[&str],
        _ctx: &Invocation,
    ) -> Result<serde_json::Value, ServiceError> {
        Ok(serde_json::json!({}))
    }

    /// Execute the wizard's open action. `None` means no view opens.
    fn do_open(
        &self,
        action: ActionWindow,
        ctx: &Invocation,
    ) -> Result<Option<ActionWindow>, ServiceError>;
}

fn not_unique_variant(name: &str) -> ServiceError {
    ServiceError::Validation(format!(
        "The template \"{name}\" must be marked as unique variant in order to be able to see it's stock"
    ))
}

/// Decorator redirecting a template-invoked stock wizard to the template's
/// sole variant.
///
/// `default_start` guards the invocation: a template not flagged
/// `unique_variant` is rejected before the wizard starts. `do_open`
/// substitutes the template's first variant as the active subject, or
/// opens nothing when the template owns no variants. Invocations from
/// other models pass through unchanged.
pub struct UniqueVariantRedirect<W> {
    inner: W,
    products: Arc<ProductService>,
}

impl<W: StockWizard> UniqueVariantRedirect<W> {
    pub fn new(inner: W, products: Arc<ProductService>) -> Self {
        Self { inner, products }
    }
}

impl<W: StockWizard> StockWizard for UniqueVariantRedirect<W> {
    fn default_start(
        &self,
        fields: &[&str],
        ctx: &Invocation,
    ) -> Result<serde_json::Value, ServiceError> {
        if ctx.active_model == ActiveModel::Template {
            let template = self.products.get_template(&ctx.active_id)?;
            if !template.unique_variant {
                return Err(not_unique_variant(&template.name));
            }
        }
        self.inner.default_start(fields, ctx)
    }

    fn do_open(
        &self,
        action: ActionWindow,
        ctx: &Invocation,
    ) -> Result<Option<ActionWindow>, ServiceError> {
        if ctx.active_model == ActiveModel::Template {
            let variants = self.products.variants_of(&ctx.active_id)?;
            let Some(first) = variants.first() else {
                return Ok(None);
            };
            let substituted = Invocation::for_variant(&first.id);
            return self.inner.do_open(action, &substituted);
        }
        self.inner.do_open(action, ctx)
    }
}

/// Stamp the acting record of the (possibly substituted) context into an
/// action window. Shared by the host wizards.
pub(crate) fn stamp_context(action: ActionWindow, ctx: &Invocation) -> ActionWindow {
    let active_ids = if ctx.active_ids.is_empty() {
        vec![ctx.active_id.clone()]
    } else {
        ctx.active_ids.clone()
    };
    ActionWindow {
        active_id: Some(ctx.active_id.clone()),
        active_ids,
        ..action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{make_template, make_variant, test_service};

    fn setup() -> (Arc<ProductService>, UniqueVariantRedirect<ProductByLocation>) {
        let svc = Arc::new(test_service());
        let wizard = UniqueVariantRedirect::new(ProductByLocation, Arc::clone(&svc));
        (svc, wizard)
    }

    #[test]
    fn start_rejects_non_unique_template() {
        let (svc, wizard) = setup();
        let t = make_template(&svc, "Bookshelf", false);

        let err = wizard
            .default_start(&[], &Invocation::for_template(&t.id))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The template \"Bookshelf\" must be marked as unique variant in order to be able to see it's stock"
        );
    }

    #[test]
    fn start_passes_unique_template_through() {
        let (svc, wizard) = setup();
        let t = make_template(&svc, "Chair", true);

        let defaults = wizard
            .default_start(&[], &Invocation::for_template(&t.id))
            .unwrap();
        assert_eq!(defaults, serde_json::json!({}));
    }

    #[test]
    fn open_without_variants_opens_nothing() {
        let (svc, wizard) = setup();
        let t = make_template(&svc, "Chair", true);

        let opened = wizard
            .do_open(ProductByLocation::action(), &Invocation::for_template(&t.id))
            .unwrap();
        assert_eq!(opened, None);
    }

    #[test]
    fn open_substitutes_the_sole_variant() {
        let (svc, wizard) = setup();
        let t = make_template(&svc, "Chair", true);
        let v = make_variant(&svc, &t.id, Some("1"));

        let opened = wizard
            .do_open(ProductByLocation::action(), &Invocation::for_template(&t.id))
            .unwrap()
            .unwrap();
        assert_eq!(opened.active_id.as_deref(), Some(v.id.as_str()));
        assert_eq!(opened.active_ids, vec![v.id.clone()]);
    }

    #[test]
    fn open_from_variant_passes_through_unchanged() {
        let (svc, wizard) = setup();
        let t = make_template(&svc, "Chair", false);
        let v = make_variant(&svc, &t.id, Some("1"));

        let opened = wizard
            .do_open(ProductByLocation::action(), &Invocation::for_variant(&v.id))
            .unwrap()
            .unwrap();
        assert_eq!(opened.active_id.as_deref(), Some(v.id.as_str()));
    }

    #[test]
    fn both_wizards_share_the_redirect_behavior() {
        let svc = Arc::new(test_service());
        let wizard = UniqueVariantRedirect::new(
            OpenProductQuantitiesByWarehouse,
            Arc::clone(&svc),
        );
        let t = make_template(&svc, "Chair", true);
        let v = make_variant(&svc, &t.id, Some("1"));

        let opened = wizard
            .do_open(
                OpenProductQuantitiesByWarehouse::action(),
                &Invocation::for_template(&t.id),
            )
            .unwrap()
            .unwrap();
        assert_eq!(opened.active_id.as_deref(), Some(v.id.as_str()));
        assert_eq!(opened.res_model, "stock.product_quantities_warehouse");
    }

    #[test]
    fn invocation_wire_names() {
        let inv = Invocation::for_template("t1");
        let json = serde_json::to_string(&inv).unwrap();
        assert!(json.contains("product.template"));
        let back: Invocation = serde_json::from_str(&json).unwrap();
        assert_eq!(inv, back);
    }
}
