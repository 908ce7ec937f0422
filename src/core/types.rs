use std::collections::HashMap;

/// String key/value table used for declaration-time variables and interceptor
/// properties.
pub type Properties = HashMap<String, String>;

/// Default execution strategy hint handed to executor implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ExecutorType {
    Simple,
    Reuse,
    Batch,
}

impl Default for ExecutorType {
    fn default() -> Self {
        Self::Simple
    }
}
