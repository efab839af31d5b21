use erp_core::{ServiceError, now_rfc3339};
use erp_sql::Value;

use crate::model::{CreateVariant, Template};
use super::ProductService;

/// Comparison operator of a search clause on the derived code field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseOp {
    Eq,
    Contains,
}

/// A search clause on the template's derived `code` field, translated into
/// a condition on `variant.code`.
#[derive(Debug, Clone)]
pub struct CodeClause {
    pub op: ClauseOp,
    pub value: String,
}

impl CodeClause {
    pub fn eq(value: &str) -> Self {
        Self { op: ClauseOp::Eq, value: value.to_string() }
    }

    pub fn contains(value: &str) -> Self {
        Self { op: ClauseOp::Contains, value: value.to_string() }
    }

    fn variant_condition(&self, placeholder: &str) -> String {
        match self.op {
            ClauseOp::Eq => format!("v.code = {placeholder}"),
            ClauseOp::Contains => {
                format!("v.code LIKE '%' || {placeholder} || '%' ESCAPE '\\'")
            }
        }
    }

    fn name_condition(&self, placeholder: &str) -> String {
        match self.op {
            ClauseOp::Eq => format!("t.name = {placeholder}"),
            ClauseOp::Contains => {
                format!("t.name LIKE '%' || {placeholder} || '%' ESCAPE '\\'")
            }
        }
    }

    /// Value to bind for the clause. `contains` needles have LIKE
    /// wildcards escaped so they match literally.
    fn bind_value(&self) -> String {
        match self.op {
            ClauseOp::Eq => self.value.clone(),
            ClauseOp::Contains => self
                .value
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_"),
        }
    }
}

impl ProductService {
    /// Derived code of a template: the code of its first variant, or `None`
    /// when the template owns no variants.
    pub fn get_template_code(&self, template_id: &str) -> Result<Option<String>, ServiceError> {
        let _: Template = self.get_template(template_id)?;
        let variants = self.variants_of(template_id)?;
        Ok(variants.first().and_then(|v| v.code.clone()))
    }

    /// Write the derived code across a set of templates.
    ///
    /// Templates without `unique_variant` are skipped. A template that owns
    /// a variant has its first variant queued; one that owns none gets a new
    /// variant created to hold the code (only when the value is non-null).
    /// All queued variants are then updated in one batched statement.
    pub fn set_template_code(
        &self,
        template_ids: &[String],
        value: Option<&str>,
    ) -> Result<(), ServiceError> {
        let mut queued: Vec<String> = Vec::new();

        for template_id in template_ids {
            let template = self.get_template(template_id)?;
            if !template.unique_variant {
                continue;
            }
            let variants = self.variants_of(template_id)?;
            if let Some(first) = variants.first() {
                queued.push(first.id.clone());
            } else if value.is_some() {
                let created = self.create_variant(CreateVariant {
                    template_id: template_id.clone(),
                    code: None,
                })?;
                queued.push(created.id);
            }
        }

        if queued.is_empty() {
            return Ok(());
        }

        // One batched update: the indexed column and the JSON document.
        let now = now_rfc3339();
        let mut params: Vec<Value> = vec![Value::opt_text(value), Value::Text(now)];
        let id_ph: Vec<String> = queued
            .iter()
            .map(|id| {
                params.push(Value::Text(id.clone()));
                format!("?{}", params.len())
            })
            .collect();

        let sql = format!(
            "UPDATE product_variant
                SET code = ?1,
                    update_at = ?2,
                    data = json_set(json_set(data, '$.code', ?1), '$.updateAt', ?2)
              WHERE id IN ({})",
            id_ph.join(", "),
        );
        self.sql
            .exec(&sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Search templates by the derived code field. The clause is translated
    /// into a condition on the owned variants' codes, restricted to
    /// templates with `unique_variant = true`.
    pub fn search_templates_by_code(
        &self,
        clause: &CodeClause,
    ) -> Result<Vec<Template>, ServiceError> {
        let sql = format!(
            "SELECT t.data FROM product_template t
              WHERE t.unique_variant = 1
                AND EXISTS (SELECT 1 FROM product_variant v
                             WHERE v.template_id = t.id AND {})
              ORDER BY t.create_at ASC, t.id ASC",
            clause.variant_condition("?1"),
        );
        let rows = self.sql
            .query(&sql, &[Value::Text(clause.bind_value())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Self::rows_to_records(&rows)
    }

    /// Free-text record-name search: matches the template name OR, for
    /// unique templates, the owned variant's code.
    pub fn search_templates_rec_name(
        &self,
        clause: &CodeClause,
    ) -> Result<Vec<Template>, ServiceError> {
        let sql = format!(
            "SELECT t.data FROM product_template t
              WHERE {}
                 OR (t.unique_variant = 1
                     AND EXISTS (SELECT 1 FROM product_variant v
                                  WHERE v.template_id = t.id AND {}))
              ORDER BY t.create_at ASC, t.id ASC",
            clause.name_condition("?1"),
            clause.variant_condition("?1"),
        );
        let rows = self.sql
            .query(&sql, &[Value::Text(clause.bind_value())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Self::rows_to_records(&rows)
    }
}
