use erp_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use erp_sql::Value;

use crate::model::{CreateTemplate, Template};
use super::ProductService;

impl ProductService {
    /// Create a new template. An unset `unique_variant` falls back to the
    /// configuration singleton's default.
    pub fn create_template(&self, input: CreateTemplate) -> Result<Template, ServiceError> {
        if input.name.is_empty() {
            return Err(ServiceError::Validation("template name cannot be empty".into()));
        }

        let unique_variant = match input.unique_variant {
            Some(v) => v,
            None => self.default_unique_variant()?.unwrap_or(false),
        };

        let now = now_rfc3339();
        let template = Template {
            id: new_id(),
            name: input.name,
            unique_variant,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        self.insert_record(
            "product_template",
            &template.id,
            &template,
            &[
                ("name", Value::Text(template.name.clone())),
                ("unique_variant", Value::bool(template.unique_variant)),
                ("create_at", Value::Text(now.clone())),
                ("update_at", Value::Text(now)),
            ],
        )?;

        Ok(template)
    }

    pub fn get_template(&self, id: &str) -> Result<Template, ServiceError> {
        self.get_record("product_template", id)
    }

    pub fn list_templates(&self, params: &ListParams) -> Result<ListResult<Template>, ServiceError> {
        let limit = params.limit.min(500);
        self.list_records("product_template", &[], limit, params.offset)
    }

    /// Update a template with JSON merge-patch. The uniqueness invariant is
    /// re-validated before the write lands, so flipping `unique_variant` on
    /// a template that already owns several variants is rejected.
    pub fn update_template(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Template, ServiceError> {
        let current: Template = self.get_template(id)?;
        let updated: Template = Self::apply_patch(&current, patch)?;

        self.validate_template(&updated)?;

        self.update_record(
            "product_template",
            id,
            &updated,
            &[
                ("name", Value::Text(updated.name.clone())),
                ("unique_variant", Value::bool(updated.unique_variant)),
                ("update_at", Value::opt_text(updated.update_at.as_deref())),
            ],
        )?;

        Ok(updated)
    }

    /// Delete a template. Record deletion is a host-surface operation; the
    /// module itself never removes records.
    pub fn delete_template(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_record("product_template", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::TEMPLATE_UNIQ_MSG;
    use crate::service::test_support::{make_template, make_variant, test_service};

    #[test]
    fn template_crud() {
        let svc = test_service();

        let t = svc
            .create_template(CreateTemplate { name: "Chair".into(), unique_variant: Some(true) })
            .unwrap();
        assert!(t.unique_variant);

        let fetched = svc.get_template(&t.id).unwrap();
        assert_eq!(fetched, t);

        let updated = svc
            .update_template(&t.id, serde_json::json!({"name": "Office Chair"}))
            .unwrap();
        assert_eq!(updated.name, "Office Chair");
        // Immutable fields survive the patch.
        assert_eq!(updated.id, t.id);
        assert_eq!(updated.create_at, t.create_at);

        let list = svc.list_templates(&ListParams::default()).unwrap();
        assert_eq!(list.total, 1);

        svc.delete_template(&t.id).unwrap();
        assert!(matches!(svc.get_template(&t.id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn empty_name_rejected() {
        let svc = test_service();
        let err = svc
            .create_template(CreateTemplate { name: "".into(), unique_variant: None })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn flipping_unique_variant_on_multi_variant_template_fails() {
        let svc = test_service();
        let t = make_template(&svc, "Chair", false);
        make_variant(&svc, &t.id, Some("1"));
        make_variant(&svc, &t.id, Some("2"));

        let err = svc
            .update_template(&t.id, serde_json::json!({"uniqueVariant": true}))
            .unwrap_err();
        assert_eq!(err.to_string(), TEMPLATE_UNIQ_MSG);

        // The flag change did not land.
        assert!(!svc.get_template(&t.id).unwrap().unique_variant);
    }

    #[test]
    fn flipping_unique_variant_with_single_variant_is_fine() {
        let svc = test_service();
        let t = make_template(&svc, "Chair", false);
        make_variant(&svc, &t.id, Some("1"));

        let updated = svc
            .update_template(&t.id, serde_json::json!({"uniqueVariant": true}))
            .unwrap();
        assert!(updated.unique_variant);
    }
}
