use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::{Result, Value};
use crate::mapper::proxy::MapperProxy;
use crate::mapper::CallResult;

/// Callable body for a mapper method that runs in-process instead of
/// dispatching a registered statement.
pub type DefaultBody = dyn Fn(&MapperProxy, &[Value]) -> Result<CallResult> + Send + Sync;

/// How a declared method is carried out when invoked through a proxy.
#[derive(Clone)]
pub enum MethodKind {
    /// Dispatches the statement registered under `{interface}.{method}`.
    Mapped,
    /// Runs a declared default body. `None` means the declaration carries a
    /// default body but no callable was supplied for this host.
    DefaultBody(Option<Arc<DefaultBody>>),
}

impl fmt::Debug for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapped => write!(f, "Mapped"),
            Self::DefaultBody(Some(_)) => write!(f, "DefaultBody(bound)"),
            Self::DefaultBody(None) => write!(f, "DefaultBody(unbound)"),
        }
    }
}

/// Shape the caller expects back from a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// At most one row. More than one is an error.
    One,
    /// Zero or more rows.
    Many,
    /// Affected-row count from a write.
    Affected,
    /// Nothing. The call runs for its side effects.
    Unit,
}

/// One method declared on a mapper interface.
///
/// Declarations are explicit: the method name, the expected return shape,
/// and the declared parameter names all come from the host that registers
/// the interface. Nothing is discovered at call time.
pub struct MethodDecl {
    name: String,
    kind: MethodKind,
    returns: ReturnShape,
    param_names: Vec<String>,
    flush: bool,
}

impl MethodDecl {
    /// Declare a statement-backed method. Defaults to `ReturnShape::Many`.
    pub fn mapped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MethodKind::Mapped,
            returns: ReturnShape::Many,
            param_names: Vec::new(),
            flush: false,
        }
    }

    /// Declare a method carried out by an in-process body.
    pub fn default_body<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&MapperProxy, &[Value]) -> Result<CallResult> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: MethodKind::DefaultBody(Some(Arc::new(body))),
            returns: ReturnShape::Many,
            param_names: Vec::new(),
            flush: false,
        }
    }

    /// Declare a default-body method whose callable is not available on this
    /// host. Invoking it fails, but the rest of the interface stays usable.
    pub fn unbound_default_body(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MethodKind::DefaultBody(None),
            returns: ReturnShape::Many,
            param_names: Vec::new(),
            flush: false,
        }
    }

    pub fn returns(mut self, shape: ReturnShape) -> Self {
        self.returns = shape;
        self
    }

    /// Declare parameter names, in positional order. Naming parameters
    /// switches argument shaping to a named map; see [`shape_arguments`].
    ///
    /// [`shape_arguments`]: MethodDecl::shape_arguments
    pub fn param_names(mut self, names: &[&str]) -> Self {
        self.param_names = names.iter().map(|n| (*n).to_string()).collect();
        self
    }

    /// Mark the method as a flush trigger. A flush method without a
    /// registered statement drains pending batches instead of failing.
    pub fn flush(mut self) -> Self {
        self.flush = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &MethodKind {
        &self.kind
    }

    pub fn return_shape(&self) -> ReturnShape {
        self.returns
    }

    pub fn declared_params(&self) -> &[String] {
        &self.param_names
    }

    pub fn is_flush(&self) -> bool {
        self.flush
    }

    /// Shape positional call arguments into the statement parameter.
    ///
    /// Unnamed declarations keep the original behavior: no arguments is a
    /// null parameter, a single argument passes through untouched, and
    /// several arguments land under positional `param1..paramN` keys.
    /// Naming the parameters always produces a map with both the declared
    /// names and the positional aliases, even for a single argument.
    pub fn shape_arguments(&self, args: &[Value]) -> Value {
        if args.is_empty() {
            return Value::Null;
        }
        if self.param_names.is_empty() && args.len() == 1 {
            return args[0].clone();
        }
        let mut fields = Vec::with_capacity(args.len() * 2);
        for (position, arg) in args.iter().enumerate() {
            if let Some(name) = self.param_names.get(position) {
                fields.push((name.clone(), arg.clone()));
            }
            fields.push((format!("param{}", position + 1), arg.clone()));
        }
        Value::object(fields)
    }
}

impl fmt::Debug for MethodDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDecl")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("returns", &self.returns)
            .field("param_names", &self.param_names)
            .field("flush", &self.flush)
            .finish()
    }
}

/// A named mapper interface: the set of methods callers may invoke by name.
#[derive(Debug)]
pub struct MapperInterface {
    name: String,
    methods: HashMap<String, Arc<MethodDecl>>,
}

impl MapperInterface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: HashMap::new(),
        }
    }

    /// Add a method declaration. A redeclared name replaces the earlier one.
    pub fn method(mut self, decl: MethodDecl) -> Self {
        self.methods.insert(decl.name.clone(), Arc::new(decl));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn find_method(&self, name: &str) -> Option<&Arc<MethodDecl>> {
        self.methods.get(name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}
