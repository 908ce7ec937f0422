use crate::core::{Result, Value};
use crate::plugin::{ComponentKind, Interceptable};

/// A captured call on the pipeline's way through a decorator: the method
/// name, its arguments, and the component underneath.
pub struct Invocation<'a> {
    target: &'a dyn Interceptable,
    method: &'a str,
    args: &'a [Value],
}

impl<'a> Invocation<'a> {
    pub fn new(target: &'a dyn Interceptable, method: &'a str, args: &'a [Value]) -> Self {
        Self {
            target,
            method,
            args,
        }
    }

    pub fn method(&self) -> &str {
        self.method
    }

    pub fn args(&self) -> &[Value] {
        self.args
    }

    pub fn target_kind(&self) -> ComponentKind {
        self.target.kind()
    }

    /// Forward the call to the wrapped component. An interceptor may call
    /// this zero times (short-circuit), once, or several times (retry).
    pub fn proceed(&self) -> Result<Value> {
        self.target.call(self.method, self.args)
    }
}
