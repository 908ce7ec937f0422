use crate::core::{Result, Value};
use crate::statement::StatementDescriptor;

/// Outcome of one statement inside a flushed batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub statement_id: String,
    pub sql: String,
    pub update_counts: Vec<i64>,
}

impl BatchResult {
    pub fn new(statement_id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            statement_id: statement_id.into(),
            sql: sql.into(),
            update_counts: Vec::new(),
        }
    }
}

/// Execution seam. Implementations live outside this crate: they resolve
/// bound statements through the descriptor, talk to a driver, and are
/// usually wrapped by the interceptor chain at session construction.
pub trait Executor: Send + Sync {
    fn query(&self, descriptor: &StatementDescriptor, parameter: &Value) -> Result<Vec<Value>>;

    fn update(&self, descriptor: &StatementDescriptor, parameter: &Value) -> Result<u64>;

    fn flush_statements(&self) -> Result<Vec<BatchResult>>;
}
