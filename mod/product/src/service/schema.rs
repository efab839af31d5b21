use erp_core::ServiceError;
use erp_sql::SQLStore;
use tracing::{info, warn};

/// How the one-variant-per-unique-template invariant is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Enforcement {
    /// Application-level validation on variant and template saves.
    #[default]
    Validated,

    /// Validation plus a storage-level unique constraint on
    /// `product_variant.template_id`, declared at activation when the
    /// existing data allows it. Closes the concurrent-creation gap the
    /// application-level check leaves open.
    Constrained,
}

/// SQL DDL statements to initialize the product database schema.
///
/// Each table stores the full JSON document in a `data` TEXT column,
/// with indexed columns extracted for efficient filtering.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS product_template (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        unique_variant INTEGER NOT NULL DEFAULT 0,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS product_variant (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        template_id TEXT NOT NULL,
        code TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS product_config (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL
    )",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_variant_template ON product_variant(template_id)",
    "CREATE INDEX IF NOT EXISTS idx_variant_code ON product_variant(code)",
];

pub fn init_schema(sql: &dyn SQLStore, enforcement: Enforcement) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {}", e)))?;
    }
    if enforcement == Enforcement::Constrained {
        apply_unique_template_constraint(sql)?;
    }
    Ok(())
}

/// Declare the unique constraint on `product_variant.template_id`, unless
/// pre-existing data already violates it.
///
/// Data predating the constraint may hold several variants per template;
/// such databases keep working without the constraint and must be
/// reconciled manually. Returns whether the constraint was applied.
pub(crate) fn apply_unique_template_constraint(
    sql: &dyn SQLStore,
) -> Result<bool, ServiceError> {
    let rows = sql
        .query(
            "SELECT template_id, COUNT(*) AS cnt FROM product_variant
             GROUP BY template_id HAVING cnt > 1",
            &[],
        )
        .map_err(|e| ServiceError::Storage(e.to_string()))?;

    if !rows.is_empty() {
        warn!(
            templates = rows.len(),
            "templates with multiple variants exist; skipping unique constraint on product_variant.template_id"
        );
        return Ok(false);
    }

    sql.exec(
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_variant_template ON product_variant(template_id)",
        &[],
    )
    .map_err(|e| ServiceError::Storage(e.to_string()))?;
    info!("unique constraint declared on product_variant.template_id");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use erp_sql::{SqliteStore, Value};

    #[test]
    fn init_schema_is_idempotent() {
        let sql = SqliteStore::open_in_memory().unwrap();
        init_schema(&sql, Enforcement::Validated).unwrap();
        init_schema(&sql, Enforcement::Validated).unwrap();
    }

    #[test]
    fn constraint_applied_on_clean_database() {
        let sql = SqliteStore::open_in_memory().unwrap();
        init_schema(&sql, Enforcement::Constrained).unwrap();

        sql.exec(
            "INSERT INTO product_variant (id, data, template_id) VALUES ('v1', '{}', 't1')",
            &[],
        )
        .unwrap();
        let err = sql
            .exec(
                "INSERT INTO product_variant (id, data, template_id) VALUES ('v2', '{}', 't1')",
                &[],
            )
            .unwrap_err();
        assert!(err.is_constraint_on("product_variant.template_id"));
    }

    #[test]
    fn constraint_skipped_when_duplicates_predate_it() {
        let sql = SqliteStore::open_in_memory().unwrap();
        init_schema(&sql, Enforcement::Validated).unwrap();

        // Legacy data: two variants under the same template.
        for id in ["v1", "v2"] {
            sql.exec(
                "INSERT INTO product_variant (id, data, template_id) VALUES (?1, '{}', 't1')",
                &[Value::Text(id.into())],
            )
            .unwrap();
        }

        let applied = apply_unique_template_constraint(&sql).unwrap();
        assert!(!applied);

        // Without the constraint further inserts under the template still pass
        // at the storage level.
        sql.exec(
            "INSERT INTO product_variant (id, data, template_id) VALUES ('v3', '{}', 't1')",
            &[],
        )
        .unwrap();
    }
}
