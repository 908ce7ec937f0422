pub mod chain;
pub mod interceptor;
pub mod invocation;
pub mod wrapper;

use crate::core::{Result, Value};

pub use chain::InterceptorChain;
pub use interceptor::Interceptor;
pub use invocation::Invocation;
pub use wrapper::Decorated;

/// The architectural seams interception can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    StatementHandler,
    ParameterHandler,
    ResultHandler,
}

/// Uniform invocation surface of a decoratable component. Execution-layer
/// components expose their operations as named calls over `Value` arguments
/// so decorators can route them without knowing the concrete type.
pub trait Interceptable: Send + Sync {
    fn kind(&self) -> ComponentKind;
    fn call(&self, method: &str, args: &[Value]) -> Result<Value>;
}

/// One method an interceptor declares interest in: component seam, method
/// name, and argument count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub component: ComponentKind,
    pub method: String,
    pub args: usize,
}

impl MethodSignature {
    pub fn new(component: ComponentKind, method: impl Into<String>, args: usize) -> Self {
        Self {
            component,
            method: method.into(),
            args,
        }
    }
}
