pub mod interface;
pub mod method;
pub mod proxy;
pub mod registry;

use crate::core::Value;
use crate::executor::BatchResult;

pub use interface::{DefaultBody, MapperInterface, MethodDecl, MethodKind, ReturnShape};
pub use method::{MapperMethod, SqlCommand};
pub use proxy::{MapperProxy, MapperProxyFactory, MethodInvoker};
pub use registry::MapperRegistry;

/// Shaped outcome of one mapper-method call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    Unit,
    One(Option<Value>),
    Many(Vec<Value>),
    Affected(u64),
    Batch(Vec<BatchResult>),
}

impl CallResult {
    /// Unwrap a single-row result.
    pub fn into_one(self) -> Option<Value> {
        match self {
            Self::One(value) => value,
            _ => None,
        }
    }

    /// Unwrap a many-rows result.
    pub fn into_many(self) -> Vec<Value> {
        match self {
            Self::Many(rows) => rows,
            _ => Vec::new(),
        }
    }
}
