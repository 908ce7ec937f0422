use std::sync::Arc;

use crate::core::{Result, Value};
use crate::plugin::interceptor::Interceptor;
use crate::plugin::invocation::Invocation;
use crate::plugin::{ComponentKind, Interceptable};

/// Decorator routing declared method signatures through an interceptor and
/// forwarding everything else to the wrapped component unchanged.
pub struct Decorated {
    target: Arc<dyn Interceptable>,
    interceptor: Arc<dyn Interceptor>,
    methods: Vec<(String, usize)>,
}

impl Decorated {
    /// Wrap `target` if the interceptor declares any signature for its
    /// component kind; otherwise the target is handed back untouched and no
    /// decoration cost is paid on its call path.
    pub fn wrap(
        target: Arc<dyn Interceptable>,
        interceptor: Arc<dyn Interceptor>,
    ) -> Arc<dyn Interceptable> {
        let kind = target.kind();
        let methods: Vec<(String, usize)> = interceptor
            .signatures()
            .into_iter()
            .filter(|signature| signature.component == kind)
            .map(|signature| (signature.method, signature.args))
            .collect();
        if methods.is_empty() {
            return target;
        }
        Arc::new(Self {
            target,
            interceptor,
            methods,
        })
    }

    fn matches(&self, method: &str, arity: usize) -> bool {
        self.methods
            .iter()
            .any(|(name, args)| name == method && *args == arity)
    }
}

impl Interceptable for Decorated {
    fn kind(&self) -> ComponentKind {
        self.target.kind()
    }

    fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        if self.matches(method, args.len()) {
            let invocation = Invocation::new(&*self.target, method, args);
            self.interceptor.intercept(&invocation)
        } else {
            self.target.call(method, args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MapperError;
    use crate::plugin::MethodSignature;

    struct Repository;

    impl Interceptable for Repository {
        fn kind(&self) -> ComponentKind {
            ComponentKind::StatementHandler
        }

        fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
            match method {
                "get" => Ok(Value::Text(format!("value-for-{}", args[0]))),
                "describe" => Ok(Value::Text("repository".to_string())),
                other => Err(MapperError::MethodNotFound(
                    other.to_string(),
                    "Repository".to_string(),
                )),
            }
        }
    }

    struct AlwaysInterceptor;

    impl Interceptor for AlwaysInterceptor {
        fn name(&self) -> &'static str {
            "always"
        }

        fn signatures(&self) -> Vec<MethodSignature> {
            vec![MethodSignature::new(ComponentKind::StatementHandler, "get", 1)]
        }

        fn intercept(&self, _invocation: &Invocation<'_>) -> Result<Value> {
            Ok(Value::Text("Always".to_string()))
        }
    }

    #[test]
    fn test_declared_method_intercepted() {
        let wrapped = Decorated::wrap(Arc::new(Repository), Arc::new(AlwaysInterceptor));
        let result = wrapped.call("get", &[Value::from("key")]).unwrap();
        assert_eq!(result, Value::Text("Always".to_string()));
    }

    #[test]
    fn test_undeclared_method_passes_through() {
        let wrapped = Decorated::wrap(Arc::new(Repository), Arc::new(AlwaysInterceptor));
        let result = wrapped.call("describe", &[]).unwrap();
        assert_eq!(result, Value::Text("repository".to_string()));
    }

    #[test]
    fn test_arity_mismatch_passes_through() {
        let wrapped = Decorated::wrap(Arc::new(Repository), Arc::new(AlwaysInterceptor));
        let result = wrapped
            .call("get", &[Value::from("key"), Value::from("extra")]);
        // Two-argument "get" is not declared, so the raw target sees it.
        assert_eq!(result.unwrap(), Value::Text("value-for-key".to_string()));
    }

    #[test]
    fn test_unmatched_kind_returns_target_untouched() {
        struct ResultOnly;
        impl Interceptor for ResultOnly {
            fn name(&self) -> &'static str {
                "result-only"
            }
            fn signatures(&self) -> Vec<MethodSignature> {
                vec![MethodSignature::new(ComponentKind::ResultHandler, "get", 1)]
            }
            fn intercept(&self, _invocation: &Invocation<'_>) -> Result<Value> {
                Ok(Value::Null)
            }
        }

        let target: Arc<dyn Interceptable> = Arc::new(Repository);
        let wrapped = Decorated::wrap(Arc::clone(&target), Arc::new(ResultOnly));
        assert!(Arc::ptr_eq(&target, &wrapped));
    }

    #[test]
    fn test_proceed_reaches_target() {
        struct Suffixer;
        impl Interceptor for Suffixer {
            fn name(&self) -> &'static str {
                "suffixer"
            }
            fn signatures(&self) -> Vec<MethodSignature> {
                vec![MethodSignature::new(ComponentKind::StatementHandler, "get", 1)]
            }
            fn intercept(&self, invocation: &Invocation<'_>) -> Result<Value> {
                let inner = invocation.proceed()?;
                Ok(Value::Text(format!("{}!", inner)))
            }
        }

        let wrapped = Decorated::wrap(Arc::new(Repository), Arc::new(Suffixer));
        let result = wrapped.call("get", &[Value::from("k")]).unwrap();
        assert_eq!(result, Value::Text("value-for-k!".to_string()));
    }
}
