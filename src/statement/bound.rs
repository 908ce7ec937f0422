use crate::core::Value;
use crate::statement::binding::ParameterBinding;

/// Executable form of a statement: final SQL with `?` placeholders, the
/// ordered bindings that fill them, and the parameter object they resolve
/// against. Built fresh on every call and never cached or shared.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub sql: String,
    pub bindings: Vec<ParameterBinding>,
    pub parameter: Value,
}

impl BoundStatement {
    pub fn new(sql: impl Into<String>, bindings: Vec<ParameterBinding>, parameter: Value) -> Self {
        Self {
            sql: sql.into(),
            bindings,
            parameter,
        }
    }

    /// Placeholder count, which always equals the binding count.
    pub fn arity(&self) -> usize {
        self.bindings.len()
    }
}
