use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    /// A declared constraint (UNIQUE, NOT NULL, ...) rejected the write.
    ///
    /// Kept separate from [`SQLError::Execution`] so modules can surface
    /// constraint violations as domain errors instead of storage failures.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl SQLError {
    /// Whether this error is a constraint violation involving `needle`
    /// (a column or index name).
    pub fn is_constraint_on(&self, needle: &str) -> bool {
        matches!(self, SQLError::Constraint(msg) if msg.contains(needle))
    }
}
