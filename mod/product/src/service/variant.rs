use erp_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use erp_sql::Value;

use crate::model::{CreateVariant, Template, Variant};
use super::{ProductService, TEMPLATE_UNIQ_MSG};

/// Storage-level rejections of the unique constraint carry the violated
/// column in their message; surface them as the domain error.
fn map_constraint(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::Conflict(msg) if msg.contains("product_variant.template_id") => {
            ServiceError::Validation(TEMPLATE_UNIQ_MSG.to_string())
        }
        other => other,
    }
}

impl ProductService {
    /// Create a batch of variants. The whole batch is validated against the
    /// uniqueness invariant before any row is written.
    pub fn create_variants(
        &self,
        inputs: Vec<CreateVariant>,
    ) -> Result<Vec<Variant>, ServiceError> {
        let now = now_rfc3339();
        let mut records = Vec::with_capacity(inputs.len());
        for input in inputs {
            // The owning template must exist.
            let _: Template = self.get_template(&input.template_id)?;
            records.push(Variant {
                id: new_id(),
                template_id: input.template_id,
                code: input.code,
                create_at: Some(now.clone()),
                update_at: Some(now.clone()),
            });
        }

        if records.is_empty() {
            return Ok(records);
        }

        self.validate_unique_template(&records)?;

        // One multi-row insert: a batch the storage layer rejects
        // persists nothing.
        let mut params: Vec<Value> = Vec::new();
        let mut rows = Vec::with_capacity(records.len());
        for variant in &records {
            let json = serde_json::to_string(variant)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            let base = params.len();
            params.push(Value::Text(variant.id.clone()));
            params.push(Value::Text(json));
            params.push(Value::Text(variant.template_id.clone()));
            params.push(Value::opt_text(variant.code.as_deref()));
            params.push(Value::Text(now.clone()));
            params.push(Value::Text(now.clone()));
            rows.push(format!(
                "(?{}, ?{}, ?{}, ?{}, ?{}, ?{})",
                base + 1, base + 2, base + 3, base + 4, base + 5, base + 6,
            ));
        }

        let sql = format!(
            "INSERT INTO product_variant (id, data, template_id, code, create_at, update_at)
             VALUES {}",
            rows.join(", "),
        );
        self.sql
            .exec(&sql, &params)
            .map_err(|e| match e {
                erp_sql::SQLError::Constraint(msg) => {
                    map_constraint(ServiceError::Conflict(msg))
                }
                other => ServiceError::Storage(other.to_string()),
            })?;

        Ok(records)
    }

    /// Create a single variant.
    pub fn create_variant(&self, input: CreateVariant) -> Result<Variant, ServiceError> {
        let mut created = self.create_variants(vec![input])?;
        Ok(created.remove(0))
    }

    pub fn get_variant(&self, id: &str) -> Result<Variant, ServiceError> {
        self.get_record("product_variant", id)
    }

    /// All variants owned by a template, in insertion order. The first
    /// element is the "first variant" the derived code and the stock-view
    /// redirection operate on.
    pub fn variants_of(&self, template_id: &str) -> Result<Vec<Variant>, ServiceError> {
        let rows = self.sql
            .query(
                "SELECT data FROM product_variant WHERE template_id = ?1
                 ORDER BY create_at ASC, id ASC",
                &[Value::Text(template_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Self::rows_to_records(&rows)
    }

    pub fn list_variants(
        &self,
        params: &ListParams,
        template_id: Option<&str>,
    ) -> Result<ListResult<Variant>, ServiceError> {
        let limit = params.limit.min(500);
        let mut filters: Vec<(&str, Value)> = Vec::new();
        if let Some(tid) = template_id {
            filters.push(("template_id", Value::Text(tid.to_string())));
        }
        self.list_records("product_variant", &filters, limit, params.offset)
    }

    /// Update a variant with JSON merge-patch. Reassigning the variant to a
    /// different template re-runs the uniqueness validation.
    pub fn update_variant(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Variant, ServiceError> {
        let current: Variant = self.get_variant(id)?;
        let updated: Variant = Self::apply_patch(&current, patch)?;

        // The cross-batch lookup excludes the variant's own id, so this also
        // covers in-place updates.
        self.validate_unique_template(std::slice::from_ref(&updated))?;

        self.update_record(
            "product_variant",
            id,
            &updated,
            &[
                ("template_id", Value::Text(updated.template_id.clone())),
                ("code", Value::opt_text(updated.code.as_deref())),
                ("update_at", Value::opt_text(updated.update_at.as_deref())),
            ],
        )
        .map_err(map_constraint)?;

        Ok(updated)
    }

    /// Delete a variant. A host-surface operation, same as template deletion.
    pub fn delete_variant(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_record("product_variant", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::Enforcement;
    use crate::service::test_support::{make_template, make_variant, test_service, test_service_with};

    #[test]
    fn variant_crud() {
        let svc = test_service();
        let t = make_template(&svc, "Chair", false);

        let v = make_variant(&svc, &t.id, Some("CH-1"));
        assert_eq!(svc.get_variant(&v.id).unwrap(), v);

        let updated = svc
            .update_variant(&v.id, serde_json::json!({"code": "CH-2"}))
            .unwrap();
        assert_eq!(updated.code.as_deref(), Some("CH-2"));

        let list = svc.list_variants(&ListParams::default(), Some(&t.id)).unwrap();
        assert_eq!(list.total, 1);

        svc.delete_variant(&v.id).unwrap();
        assert!(matches!(svc.get_variant(&v.id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn variant_requires_existing_template() {
        let svc = test_service();
        let err = svc
            .create_variant(CreateVariant { template_id: "missing".into(), code: None })
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn reassigning_variant_to_full_unique_template_fails() {
        let svc = test_service();
        let plain = make_template(&svc, "Plain", false);
        let uniq = make_template(&svc, "Unique", true);
        make_variant(&svc, &uniq.id, Some("1"));
        let stray = make_variant(&svc, &plain.id, Some("2"));

        let err = svc
            .update_variant(&stray.id, serde_json::json!({"templateId": uniq.id}))
            .unwrap_err();
        assert_eq!(err.to_string(), TEMPLATE_UNIQ_MSG);
    }

    #[test]
    fn storage_constraint_surfaces_domain_message() {
        let svc = test_service_with(Enforcement::Constrained);
        let t = make_template(&svc, "Chair", true);
        make_variant(&svc, &t.id, Some("1"));

        // Application-level validation catches it first; the constraint is
        // the backstop for writes that bypass validation.
        let err = svc
            .create_variant(CreateVariant { template_id: t.id.clone(), code: Some("2".into()) })
            .unwrap_err();
        assert_eq!(err.to_string(), TEMPLATE_UNIQ_MSG);
    }

    #[test]
    fn failed_batch_persists_nothing_under_storage_constraint() {
        let svc = test_service_with(Enforcement::Constrained);
        // Application-level validation skips non-unique templates, so only
        // the global unique index rejects the batch here.
        let t = make_template(&svc, "Chair", false);

        let err = svc
            .create_variants(vec![
                CreateVariant { template_id: t.id.clone(), code: Some("1".into()) },
                CreateVariant { template_id: t.id.clone(), code: Some("2".into()) },
            ])
            .unwrap_err();
        assert_eq!(err.to_string(), TEMPLATE_UNIQ_MSG);
        assert!(svc.variants_of(&t.id).unwrap().is_empty());
    }

    #[test]
    fn variants_of_preserves_insertion_order() {
        let svc = test_service();
        let t = make_template(&svc, "Chair", false);
        let v1 = make_variant(&svc, &t.id, Some("1"));
        let v2 = make_variant(&svc, &t.id, Some("2"));

        let ids: Vec<String> = svc.variants_of(&t.id).unwrap().into_iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![v1.id, v2.id]);
    }
}
