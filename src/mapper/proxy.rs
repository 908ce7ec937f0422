use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::core::{MapperError, Result, Value};
use crate::executor::Executor;
use crate::mapper::interface::{MapperInterface, MethodDecl, MethodKind};
use crate::mapper::method::MapperMethod;
use crate::mapper::CallResult;
use crate::session::Configuration;

/// Built dispatch path for one method, cached on first use.
pub enum MethodInvoker {
    Mapped(MapperMethod),
    DefaultBody(Arc<crate::mapper::interface::DefaultBody>),
}

impl MethodInvoker {
    fn create(
        configuration: &Configuration,
        interface: &MapperInterface,
        decl: &Arc<MethodDecl>,
    ) -> Result<Self> {
        match decl.kind() {
            MethodKind::Mapped => Ok(Self::Mapped(MapperMethod::new(
                configuration.statements(),
                interface.name(),
                Arc::clone(decl),
            )?)),
            MethodKind::DefaultBody(Some(body)) => Ok(Self::DefaultBody(Arc::clone(body))),
            MethodKind::DefaultBody(None) => Err(MapperError::PlatformUnsupported(format!(
                "No default-body implementation is available for '{}.{}'",
                interface.name(),
                decl.name()
            ))),
        }
    }

    fn invoke(&self, proxy: &MapperProxy, args: &[Value]) -> Result<CallResult> {
        match self {
            Self::Mapped(method) => method.execute(proxy.executor(), args),
            Self::DefaultBody(body) => body(proxy, args),
        }
    }
}

/// Creates proxy instances for one interface and owns their shared
/// per-method invoker cache.
pub struct MapperProxyFactory {
    interface: Arc<MapperInterface>,
    method_cache: Mutex<HashMap<String, Arc<MethodInvoker>>>,
}

impl MapperProxyFactory {
    pub fn new(interface: Arc<MapperInterface>) -> Self {
        Self {
            interface,
            method_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn interface(&self) -> &Arc<MapperInterface> {
        &self.interface
    }

    pub fn new_instance(
        self: &Arc<Self>,
        configuration: Arc<Configuration>,
        executor: Arc<dyn Executor>,
    ) -> MapperProxy {
        MapperProxy {
            configuration,
            executor,
            interface: Arc::clone(&self.interface),
            factory: Arc::clone(self),
            instance_id: Uuid::new_v4(),
        }
    }

    pub fn cached_method_count(&self) -> Result<usize> {
        Ok(self.method_cache.lock()?.len())
    }
}

/// Callable stand-in for a mapper interface. Every invocation goes through
/// `invoke`, which resolves the named method to an invoker and runs it.
///
/// Instances of the same interface share one invoker cache through their
/// factory, so a method is built once no matter how many proxies exist.
pub struct MapperProxy {
    configuration: Arc<Configuration>,
    executor: Arc<dyn Executor>,
    interface: Arc<MapperInterface>,
    factory: Arc<MapperProxyFactory>,
    instance_id: Uuid,
}

impl MapperProxy {
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<CallResult> {
        if let Some(result) = self.invoke_intrinsic(method, args) {
            return result;
        }
        let invoker = self.cached_invoker(method)?;
        invoker.invoke(self, args)
    }

    /// Identity methods answered by the proxy itself, never dispatched.
    fn invoke_intrinsic(&self, method: &str, args: &[Value]) -> Option<Result<CallResult>> {
        match method {
            "to_string" => Some(Ok(CallResult::One(Some(Value::Text(self.to_string()))))),
            "hash_code" => Some(Ok(CallResult::One(Some(Value::Integer(
                self.identity_hash(),
            ))))),
            "equals" => {
                let id = self.instance_id.to_string();
                let matched = args
                    .first()
                    .and_then(Value::as_str)
                    .is_some_and(|other| other == id);
                Some(Ok(CallResult::One(Some(Value::Boolean(matched)))))
            }
            _ => None,
        }
    }

    /// Look up or build the invoker for a method.
    ///
    /// The cache lock is held across construction, so concurrent first
    /// callers serialize and at most one invoker is ever built per method.
    /// A construction failure inserts nothing; the next call retries.
    fn cached_invoker(&self, method: &str) -> Result<Arc<MethodInvoker>> {
        let mut cache = self.factory.method_cache.lock()?;
        if let Some(invoker) = cache.get(method) {
            return Ok(Arc::clone(invoker));
        }
        let decl = self.interface.find_method(method).ok_or_else(|| {
            MapperError::MethodNotFound(method.to_string(), self.interface.name().to_string())
        })?;
        let invoker = Arc::new(MethodInvoker::create(
            &self.configuration,
            &self.interface,
            decl,
        )?);
        cache.insert(method.to_string(), Arc::clone(&invoker));
        log::debug!("built invoker for '{}.{}'", self.interface.name(), method);
        Ok(invoker)
    }

    pub fn interface(&self) -> &MapperInterface {
        &self.interface
    }

    pub fn configuration(&self) -> &Arc<Configuration> {
        &self.configuration
    }

    pub fn executor(&self) -> &dyn Executor {
        self.executor.as_ref()
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    fn identity_hash(&self) -> i64 {
        let mut hasher = DefaultHasher::new();
        self.instance_id.hash(&mut hasher);
        hasher.finish() as i64
    }
}

impl fmt::Display for MapperProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.interface.name(), self.instance_id.simple())
    }
}

impl fmt::Debug for MapperProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperProxy")
            .field("interface", &self.interface.name())
            .field("instance_id", &self.instance_id)
            .finish_non_exhaustive()
    }
}

impl PartialEq for MapperProxy {
    fn eq(&self, other: &Self) -> bool {
        self.instance_id == other.instance_id
    }
}

impl Eq for MapperProxy {}

impl Hash for MapperProxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instance_id.hash(state);
    }
}
