use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{ExecutorType, Properties, Result};
use crate::executor::Executor;
use crate::mapper::{MapperInterface, MapperProxy, MapperRegistry};
use crate::parsing::{DeclarationNode, ScriptNodeParser};
use crate::plugin::{Interceptable, Interceptor, InterceptorChain};
use crate::session::declaration::StatementDeclaration;
use crate::statement::StatementRegistry;
use crate::template::{EngineContext, TemplateEngine, TemplateEngineRegistry};

/// Tunables that apply to every statement unless its declaration overrides
/// them.
#[derive(Debug, Clone)]
pub struct Settings {
    pub default_fetch_size: Option<u32>,
    pub default_statement_timeout: Option<Duration>,
    pub use_generated_keys: bool,
    pub default_executor_type: ExecutorType,
    pub log_prefix: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_fetch_size: None,
            default_statement_timeout: None,
            use_generated_keys: false,
            default_executor_type: ExecutorType::Simple,
            log_prefix: None,
        }
    }
}

/// The assembled mapping context: every registry the runtime consults, built
/// once and shared read-only behind an `Arc`.
///
/// Nothing global lives anywhere in the crate. Two configurations in one
/// process never observe each other's statements, engines, or plugins.
pub struct Configuration {
    variables: Properties,
    engines: TemplateEngineRegistry,
    statements: StatementRegistry,
    sql_fragments: HashMap<String, DeclarationNode>,
    interceptors: InterceptorChain,
    mappers: MapperRegistry,
    script_parser: Option<Arc<dyn ScriptNodeParser>>,
    settings: Settings,
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration").finish_non_exhaustive()
    }
}

impl Configuration {
    /// Start assembling a configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use rustsqlmap::{
    ///     CallResult, CommandKind, Configuration, Executor, MapperInterface, MethodDecl,
    ///     ReturnShape, StatementDeclaration, StatementDescriptor, Value,
    /// };
    ///
    /// struct EchoExecutor;
    ///
    /// impl Executor for EchoExecutor {
    ///     fn query(
    ///         &self,
    ///         descriptor: &StatementDescriptor,
    ///         parameter: &Value,
    ///     ) -> rustsqlmap::Result<Vec<Value>> {
    ///         let bound = descriptor.resolve_bound_statement(parameter)?;
    ///         Ok(vec![Value::Text(bound.sql)])
    ///     }
    ///
    ///     fn update(&self, _: &StatementDescriptor, _: &Value) -> rustsqlmap::Result<u64> {
    ///         Ok(0)
    ///     }
    ///
    ///     fn flush_statements(&self) -> rustsqlmap::Result<Vec<rustsqlmap::BatchResult>> {
    ///         Ok(Vec::new())
    ///     }
    /// }
    ///
    /// # fn main() -> rustsqlmap::Result<()> {
    /// let config = Arc::new(
    ///     Configuration::builder()
    ///         .statement(StatementDeclaration::from_text(
    ///             "UserMapper.find_by_id",
    ///             CommandKind::Select,
    ///             "SELECT * FROM users WHERE id = #{id}",
    ///         ))
    ///         .mapper(
    ///             MapperInterface::new("UserMapper")
    ///                 .method(MethodDecl::mapped("find_by_id").returns(ReturnShape::One)),
    ///         )
    ///         .build()?,
    /// );
    ///
    /// let user_mapper = config.mapper("UserMapper", Arc::new(EchoExecutor))?;
    /// let result = user_mapper.invoke("find_by_id", &[Value::Integer(1)])?;
    /// assert_eq!(
    ///     result,
    ///     CallResult::One(Some(Value::Text("SELECT * FROM users WHERE id = ?".to_string())))
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    pub fn variables(&self) -> &Properties {
        &self.variables
    }

    pub fn statements(&self) -> &StatementRegistry {
        &self.statements
    }

    pub fn engines(&self) -> &TemplateEngineRegistry {
        &self.engines
    }

    pub fn sql_fragment(&self, id: &str) -> Option<&DeclarationNode> {
        self.sql_fragments.get(id)
    }

    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    pub fn mappers(&self) -> &MapperRegistry {
        &self.mappers
    }

    pub fn script_parser(&self) -> Option<&dyn ScriptNodeParser> {
        self.script_parser.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Proxy instance for a registered mapper interface, bound to this
    /// configuration and the given executor.
    pub fn mapper(
        self: &Arc<Self>,
        name: &str,
        executor: Arc<dyn Executor>,
    ) -> Result<MapperProxy> {
        self.mappers.get_mapper(name, self, executor)
    }

    /// Run a component through the interceptor chain.
    pub fn decorate(&self, target: Arc<dyn Interceptable>) -> Arc<dyn Interceptable> {
        self.interceptors.decorate(target)
    }
}

/// Collects declarations, then assembles them in one validating pass.
///
/// Statement bodies are resolved here, during `build`, exactly once each and
/// in declaration order. Registration order of variables, fragments, and
/// engines relative to statements does not matter; everything is settled
/// before the first statement resolves.
pub struct ConfigurationBuilder {
    variables: Properties,
    engines: TemplateEngineRegistry,
    pending_default_engine: Option<String>,
    sql_fragments: HashMap<String, DeclarationNode>,
    statements: Vec<StatementDeclaration>,
    interceptors: InterceptorChain,
    mappers: Vec<MapperInterface>,
    script_parser: Option<Arc<dyn ScriptNodeParser>>,
    settings: Settings,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            variables: Properties::new(),
            engines: TemplateEngineRegistry::with_default_engines(),
            pending_default_engine: None,
            sql_fragments: HashMap::new(),
            statements: Vec::new(),
            interceptors: InterceptorChain::new(),
            mappers: Vec::new(),
            script_parser: None,
            settings: Settings::default(),
        }
    }

    /// Set one declaration variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Merge a whole variable table. Existing names are overwritten.
    pub fn variables(mut self, variables: Properties) -> Self {
        self.variables.extend(variables);
        self
    }

    pub fn script_parser(mut self, parser: Arc<dyn ScriptNodeParser>) -> Self {
        self.script_parser = Some(parser);
        self
    }

    pub fn template_engine(
        mut self,
        name: impl Into<String>,
        engine: Arc<dyn TemplateEngine>,
    ) -> Self {
        self.engines.register(name, engine);
        self
    }

    /// Name the engine statements resolve through when their declaration
    /// names none. Validated at build.
    pub fn default_template_engine(mut self, name: impl Into<String>) -> Self {
        self.pending_default_engine = Some(name.into());
        self
    }

    /// Register a reusable fragment for `<include>` references.
    pub fn sql_fragment(mut self, id: impl Into<String>, node: DeclarationNode) -> Self {
        self.sql_fragments.insert(id.into(), node);
        self
    }

    pub fn statement(mut self, declaration: StatementDeclaration) -> Self {
        self.statements.push(declaration);
        self
    }

    pub fn interceptor(mut self, interceptor: Box<dyn Interceptor>) -> Self {
        self.interceptors.add_interceptor(interceptor);
        self
    }

    pub fn interceptor_with_properties(
        mut self,
        interceptor: Box<dyn Interceptor>,
        properties: &Properties,
    ) -> Self {
        self.interceptors
            .add_interceptor_with_properties(interceptor, properties);
        self
    }

    pub fn mapper(mut self, interface: MapperInterface) -> Self {
        self.mappers.push(interface);
        self
    }

    pub fn default_fetch_size(mut self, fetch_size: u32) -> Self {
        self.settings.default_fetch_size = Some(fetch_size);
        self
    }

    pub fn default_statement_timeout(mut self, timeout: Duration) -> Self {
        self.settings.default_statement_timeout = Some(timeout);
        self
    }

    pub fn use_generated_keys(mut self, use_generated_keys: bool) -> Self {
        self.settings.use_generated_keys = use_generated_keys;
        self
    }

    pub fn default_executor_type(mut self, executor_type: ExecutorType) -> Self {
        self.settings.default_executor_type = executor_type;
        self
    }

    /// Prefix for statement log correlation ids.
    pub fn log_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.log_prefix = Some(prefix.into());
        self
    }

    pub fn build(self) -> Result<Configuration> {
        let Self {
            variables,
            mut engines,
            pending_default_engine,
            sql_fragments,
            statements,
            interceptors,
            mappers,
            script_parser,
            settings,
        } = self;

        if let Some(name) = pending_default_engine {
            engines.set_default(&name)?;
        }

        let mut statement_registry = StatementRegistry::new();
        {
            let env = EngineContext {
                variables: &variables,
                fragments: &sql_fragments,
                script_parser: script_parser.as_deref(),
            };
            for declaration in statements {
                let descriptor = declaration.resolve(&engines, &env, &settings)?;
                statement_registry.add(descriptor)?;
            }
        }

        let mut mapper_registry = MapperRegistry::new();
        for interface in mappers {
            mapper_registry.add_mapper(interface)?;
        }

        log::debug!(
            "configuration built with {} statements and {} mappers",
            statement_registry.len(),
            mapper_registry.len()
        );

        Ok(Configuration {
            variables,
            engines,
            statements: statement_registry,
            sql_fragments,
            interceptors,
            mappers: mapper_registry,
            script_parser,
            settings,
        })
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
