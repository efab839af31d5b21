use std::collections::HashSet;

use erp_core::ServiceError;
use erp_sql::Value;

use crate::model::{Template, Variant};
use super::{ProductService, TEMPLATE_UNIQ_MSG};

fn template_uniq() -> ServiceError {
    ServiceError::Validation(TEMPLATE_UNIQ_MSG.to_string())
}

impl ProductService {
    /// Validate a batch of variants against the one-variant-per-unique-template
    /// invariant.
    ///
    /// Only variants whose owning template has `unique_variant = true` are
    /// considered. Fails when two of them share a template (in-batch
    /// duplicate), or when any persisted variant outside the batch already
    /// references one of their templates (cross-batch duplicate). Runs on
    /// the same connection as the write it guards; concurrent transactions
    /// are only excluded by the storage-level constraint.
    pub(crate) fn validate_unique_template(&self, batch: &[Variant]) -> Result<(), ServiceError> {
        let mut kept: Vec<&Variant> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for variant in batch {
            let template: Template = self.get_template(&variant.template_id)?;
            if !template.unique_variant {
                continue;
            }
            if !seen.insert(variant.template_id.as_str()) {
                return Err(template_uniq());
            }
            kept.push(variant);
        }

        if kept.is_empty() {
            return Ok(());
        }

        // Any other persisted variant referencing one of these templates?
        let mut params: Vec<Value> = Vec::new();
        let template_ph: Vec<String> = kept
            .iter()
            .map(|v| {
                params.push(Value::Text(v.template_id.clone()));
                format!("?{}", params.len())
            })
            .collect();
        let id_ph: Vec<String> = kept
            .iter()
            .map(|v| {
                params.push(Value::Text(v.id.clone()));
                format!("?{}", params.len())
            })
            .collect();

        let sql = format!(
            "SELECT 1 FROM product_variant WHERE template_id IN ({}) AND id NOT IN ({}) LIMIT 1",
            template_ph.join(", "),
            id_ph.join(", "),
        );
        let rows = self.sql
            .query(&sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if !rows.is_empty() {
            return Err(template_uniq());
        }
        Ok(())
    }

    /// Validate a template about to be saved: a unique template that already
    /// owns a variant must not share that variant's template with any other
    /// persisted variant.
    pub(crate) fn validate_template(&self, template: &Template) -> Result<(), ServiceError> {
        if !template.unique_variant {
            return Ok(());
        }
        let variants = self.variants_of(&template.id)?;
        if let Some(first) = variants.first() {
            self.validate_unique_template(std::slice::from_ref(first))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CreateVariant;
    use crate::service::test_support::{make_template, make_variant, test_service};

    #[test]
    fn non_unique_template_allows_many_variants() {
        let svc = test_service();
        let t = make_template(&svc, "Chair", false);
        make_variant(&svc, &t.id, Some("1"));
        make_variant(&svc, &t.id, Some("2"));
        make_variant(&svc, &t.id, Some("3"));
        assert_eq!(svc.variants_of(&t.id).unwrap().len(), 3);
    }

    #[test]
    fn in_batch_duplicate_detected() {
        let svc = test_service();
        let t = make_template(&svc, "Chair", true);

        let err = svc
            .create_variants(vec![
                CreateVariant { template_id: t.id.clone(), code: Some("1".into()) },
                CreateVariant { template_id: t.id.clone(), code: Some("2".into()) },
            ])
            .unwrap_err();
        assert_eq!(err.to_string(), TEMPLATE_UNIQ_MSG);

        // Nothing from the failed batch was persisted.
        assert!(svc.variants_of(&t.id).unwrap().is_empty());
    }

    #[test]
    fn cross_batch_duplicate_detected() {
        let svc = test_service();
        let t = make_template(&svc, "Chair", true);
        make_variant(&svc, &t.id, Some("1"));

        let err = svc
            .create_variant(CreateVariant { template_id: t.id.clone(), code: Some("2".into()) })
            .unwrap_err();
        assert_eq!(err.to_string(), TEMPLATE_UNIQ_MSG);
        assert_eq!(svc.variants_of(&t.id).unwrap().len(), 1);
    }

    #[test]
    fn mixed_batch_only_checks_unique_templates() {
        let svc = test_service();
        let plain = make_template(&svc, "Plain", false);
        let uniq = make_template(&svc, "Unique", true);

        let created = svc
            .create_variants(vec![
                CreateVariant { template_id: plain.id.clone(), code: Some("a".into()) },
                CreateVariant { template_id: plain.id.clone(), code: Some("b".into()) },
                CreateVariant { template_id: uniq.id.clone(), code: Some("c".into()) },
            ])
            .unwrap();
        assert_eq!(created.len(), 3);
    }
}
