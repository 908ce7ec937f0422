use std::time::Duration;

use crate::core::{DataType, MapperError, Result};
use crate::parsing::DeclarationNode;
use crate::session::configuration::Settings;
use crate::statement::{
    CommandKind, KeyGeneratorPolicy, ParameterBinding, ResultSetType, StatementDescriptor,
    StatementType,
};
use crate::template::{EngineContext, TemplateEngineRegistry};

/// Raw body of a declared statement, before any engine has seen it.
#[derive(Debug, Clone)]
pub enum StatementSource {
    Text(String),
    Node(DeclarationNode),
}

/// Everything a host states about one statement at registration time.
///
/// The declaration itself does no work. `ConfigurationBuilder::build`
/// resolves each one exactly once, through the named engine, into the
/// immutable descriptor that serves every later call.
#[derive(Debug, Clone)]
pub struct StatementDeclaration {
    id: String,
    command_kind: CommandKind,
    source: StatementSource,
    parameter_type: Option<DataType>,
    engine: Option<String>,
    statement_type: Option<StatementType>,
    result_set_type: Option<ResultSetType>,
    fetch_size: Option<u32>,
    timeout: Option<Duration>,
    parameter_map: Vec<ParameterBinding>,
    result_mapping_refs: Vec<String>,
    use_cache: Option<bool>,
    flush_cache: Option<bool>,
    cache_ref: Option<String>,
    key_generator: Option<KeyGeneratorPolicy>,
    key_properties: Option<String>,
    key_columns: Option<String>,
    result_ordered: bool,
    database_id: Option<String>,
    resource: Option<String>,
    result_sets: Option<String>,
}

impl StatementDeclaration {
    pub fn from_text(
        id: impl Into<String>,
        command_kind: CommandKind,
        body: impl Into<String>,
    ) -> Self {
        Self::new(id, command_kind, StatementSource::Text(body.into()))
    }

    pub fn from_node(
        id: impl Into<String>,
        command_kind: CommandKind,
        node: DeclarationNode,
    ) -> Self {
        Self::new(id, command_kind, StatementSource::Node(node))
    }

    fn new(id: impl Into<String>, command_kind: CommandKind, source: StatementSource) -> Self {
        Self {
            id: id.into(),
            command_kind,
            source,
            parameter_type: None,
            engine: None,
            statement_type: None,
            result_set_type: None,
            fetch_size: None,
            timeout: None,
            parameter_map: Vec::new(),
            result_mapping_refs: Vec::new(),
            use_cache: None,
            flush_cache: None,
            cache_ref: None,
            key_generator: None,
            key_properties: None,
            key_columns: None,
            result_ordered: false,
            database_id: None,
            resource: None,
            result_sets: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared scalar type of the whole parameter, for single-value calls.
    pub fn parameter_type(mut self, parameter_type: DataType) -> Self {
        self.parameter_type = Some(parameter_type);
        self
    }

    /// Resolve through a named engine instead of the configuration default.
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn statement_type(mut self, statement_type: StatementType) -> Self {
        self.statement_type = Some(statement_type);
        self
    }

    pub fn result_set_type(mut self, result_set_type: ResultSetType) -> Self {
        self.result_set_type = Some(result_set_type);
        self
    }

    pub fn fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = Some(fetch_size);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn parameter_map(mut self, bindings: Vec<ParameterBinding>) -> Self {
        self.parameter_map = bindings;
        self
    }

    pub fn result_mapping_refs(mut self, refs: Vec<String>) -> Self {
        self.result_mapping_refs = refs;
        self
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = Some(use_cache);
        self
    }

    pub fn flush_cache_required(mut self, flush_required: bool) -> Self {
        self.flush_cache = Some(flush_required);
        self
    }

    pub fn cache_ref(mut self, cache_ref: impl Into<String>) -> Self {
        self.cache_ref = Some(cache_ref.into());
        self
    }

    pub fn key_generator(mut self, key_generator: KeyGeneratorPolicy) -> Self {
        self.key_generator = Some(key_generator);
        self
    }

    pub fn key_properties(mut self, key_properties: impl Into<String>) -> Self {
        self.key_properties = Some(key_properties.into());
        self
    }

    pub fn key_columns(mut self, key_columns: impl Into<String>) -> Self {
        self.key_columns = Some(key_columns.into());
        self
    }

    pub fn result_ordered(mut self, result_ordered: bool) -> Self {
        self.result_ordered = result_ordered;
        self
    }

    pub fn database_id(mut self, database_id: impl Into<String>) -> Self {
        self.database_id = Some(database_id.into());
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn result_sets(mut self, result_sets: impl Into<String>) -> Self {
        self.result_sets = Some(result_sets.into());
        self
    }

    /// Resolve this declaration into its descriptor. Configuration-level
    /// defaults fill any option the declaration left unset.
    pub(crate) fn resolve(
        self,
        engines: &TemplateEngineRegistry,
        env: &EngineContext<'_>,
        settings: &Settings,
    ) -> Result<StatementDescriptor> {
        let engine = engines.get(self.engine.as_deref())?;
        let template = match &self.source {
            StatementSource::Text(text) => engine.create_from_text(env, text, self.parameter_type),
            StatementSource::Node(node) => engine.create_from_node(env, node, self.parameter_type),
        }
        .map_err(|e| {
            MapperError::BuildError(format!("Statement '{}' failed to resolve: {}", self.id, e))
        })?;

        // An unset policy on an insert follows the configuration switch.
        let key_generator = match self.key_generator {
            Some(policy) => policy,
            None if self.command_kind == CommandKind::Insert && settings.use_generated_keys => {
                KeyGeneratorPolicy::GeneratedKeys
            }
            None => KeyGeneratorPolicy::None,
        };

        let mut builder = StatementDescriptor::builder(self.id, template, self.command_kind)
            .key_generator(key_generator)
            .result_ordered(self.result_ordered);
        if let Some(statement_type) = self.statement_type {
            builder = builder.statement_type(statement_type);
        }
        if let Some(result_set_type) = self.result_set_type {
            builder = builder.result_set_type(result_set_type);
        }
        if let Some(fetch_size) = self.fetch_size.or(settings.default_fetch_size) {
            builder = builder.fetch_size(fetch_size);
        }
        if let Some(timeout) = self.timeout.or(settings.default_statement_timeout) {
            builder = builder.timeout(timeout);
        }
        if !self.parameter_map.is_empty() {
            builder = builder.parameter_map(self.parameter_map);
        }
        if !self.result_mapping_refs.is_empty() {
            builder = builder.result_mapping_refs(self.result_mapping_refs);
        }
        if let Some(use_cache) = self.use_cache {
            builder = builder.use_cache(use_cache);
        }
        if let Some(flush_required) = self.flush_cache {
            builder = builder.flush_cache_required(flush_required);
        }
        if let Some(cache_ref) = self.cache_ref {
            builder = builder.cache_ref(cache_ref);
        }
        if let Some(key_properties) = self.key_properties {
            builder = builder.key_properties(&key_properties);
        }
        if let Some(key_columns) = self.key_columns {
            builder = builder.key_columns(&key_columns);
        }
        if let Some(database_id) = self.database_id {
            builder = builder.database_id(database_id);
        }
        if let Some(resource) = self.resource {
            builder = builder.resource(resource);
        }
        if let Some(result_sets) = self.result_sets {
            builder = builder.result_sets(&result_sets);
        }
        if let Some(prefix) = &settings.log_prefix {
            builder = builder.log_prefix(prefix.clone());
        }
        builder.build()
    }
}
