use std::sync::Arc;

use crate::core::Properties;
use crate::plugin::interceptor::Interceptor;
use crate::plugin::wrapper::Decorated;
use crate::plugin::Interceptable;

/// Ordered interceptor list, frozen once the configuration is built.
/// Decoration folds over registration order, so the first interceptor added
/// sits closest to the component and the last one sees calls first.
#[derive(Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_interceptor(&mut self, interceptor: Box<dyn Interceptor>) {
        log::debug!("registered interceptor '{}'", interceptor.name());
        self.interceptors.push(Arc::from(interceptor));
    }

    /// Register with a properties table applied through `set_properties`
    /// before the interceptor becomes shared.
    pub fn add_interceptor_with_properties(
        &mut self,
        mut interceptor: Box<dyn Interceptor>,
        properties: &Properties,
    ) {
        interceptor.set_properties(properties);
        self.add_interceptor(interceptor);
    }

    /// Wrap a component in every applicable interceptor.
    pub fn decorate(&self, target: Arc<dyn Interceptable>) -> Arc<dyn Interceptable> {
        let mut target = target;
        for interceptor in &self.interceptors {
            target = Decorated::wrap(target, Arc::clone(interceptor));
        }
        target
    }

    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Result, Value};
    use crate::plugin::invocation::Invocation;
    use crate::plugin::{ComponentKind, MethodSignature};
    use std::sync::Mutex;

    struct Echo;

    impl Interceptable for Echo {
        fn kind(&self) -> ComponentKind {
            ComponentKind::ParameterHandler
        }

        fn call(&self, _method: &str, args: &[Value]) -> Result<Value> {
            Ok(args.first().cloned().unwrap_or(Value::Null))
        }
    }

    struct Tagger {
        tag: &'static str,
    }

    impl Interceptor for Tagger {
        fn name(&self) -> &'static str {
            self.tag
        }

        fn signatures(&self) -> Vec<MethodSignature> {
            vec![MethodSignature::new(ComponentKind::ParameterHandler, "echo", 1)]
        }

        fn intercept(&self, invocation: &Invocation<'_>) -> Result<Value> {
            let inner = invocation.proceed()?;
            Ok(Value::Text(format!("{}({})", self.tag, inner)))
        }
    }

    #[test]
    fn test_decoration_order_is_registration_order() {
        let mut chain = InterceptorChain::new();
        chain.add_interceptor(Box::new(Tagger { tag: "inner" }));
        chain.add_interceptor(Box::new(Tagger { tag: "outer" }));

        let decorated = chain.decorate(Arc::new(Echo));
        let result = decorated.call("echo", &[Value::from("x")]).unwrap();
        // Last registered wraps last, so it observes the call first.
        assert_eq!(result, Value::Text("outer(inner(x))".to_string()));
    }

    #[test]
    fn test_empty_chain_returns_target() {
        let chain = InterceptorChain::new();
        let target: Arc<dyn Interceptable> = Arc::new(Echo);
        let decorated = chain.decorate(Arc::clone(&target));
        assert!(Arc::ptr_eq(&target, &decorated));
    }

    #[test]
    fn test_set_properties_applied_at_registration() {
        struct Configurable {
            seen: Mutex<Option<String>>,
        }
        impl Interceptor for Configurable {
            fn name(&self) -> &'static str {
                "configurable"
            }
            fn signatures(&self) -> Vec<MethodSignature> {
                vec![MethodSignature::new(ComponentKind::ParameterHandler, "echo", 1)]
            }
            fn intercept(&self, _invocation: &Invocation<'_>) -> Result<Value> {
                let seen = self.seen.lock().unwrap().clone();
                Ok(Value::Text(seen.unwrap_or_default()))
            }
            fn set_properties(&mut self, properties: &Properties) {
                *self.seen.lock().unwrap() = properties.get("label").cloned();
            }
        }

        let mut properties = Properties::new();
        properties.insert("label".to_string(), "configured".to_string());

        let mut chain = InterceptorChain::new();
        chain.add_interceptor_with_properties(
            Box::new(Configurable {
                seen: Mutex::new(None),
            }),
            &properties,
        );

        let decorated = chain.decorate(Arc::new(Echo));
        let result = decorated.call("echo", &[Value::Null]).unwrap();
        assert_eq!(result, Value::Text("configured".to_string()));
    }
}
