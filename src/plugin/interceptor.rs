use crate::core::{Properties, Result, Value};
use crate::plugin::invocation::Invocation;
use crate::plugin::MethodSignature;

/// Cross-cutting behavior attached around execution components.
///
/// An interceptor only sees calls matching one of its declared signatures;
/// everything else bypasses it entirely. Inside `intercept` it decides
/// whether and how often to `proceed()`.
pub trait Interceptor: Send + Sync {
    /// Name for logs.
    fn name(&self) -> &'static str;

    /// The (component, method, arity) triples this interceptor handles.
    fn signatures(&self) -> Vec<MethodSignature>;

    fn intercept(&self, invocation: &Invocation<'_>) -> Result<Value>;

    /// Configuration hook applied once at registration.
    fn set_properties(&mut self, _properties: &Properties) {}
}
