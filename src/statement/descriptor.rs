use std::fmt;
use std::time::Duration;

use crate::core::{Result, Value};
use crate::statement::binding::ParameterBinding;
use crate::statement::bound::BoundStatement;
use crate::template::Template;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CommandKind {
    Select,
    Insert,
    Update,
    Delete,
    Flush,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Flush => "FLUSH",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StatementType {
    Statement,
    Prepared,
    Callable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ResultSetType {
    Default,
    ForwardOnly,
    ScrollInsensitive,
    ScrollSensitive,
}

/// Second-level cache participation of one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    pub use_cache: bool,
    pub flush_required: bool,
    pub cache_ref: Option<String>,
}

/// How generated keys are obtained for insert statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyGeneratorPolicy {
    None,
    /// Driver-reported generated keys.
    GeneratedKeys,
    /// A companion statement supplies the key, before or after the insert.
    SelectKey { statement_id: String, before: bool },
}

/// Immutable description of one registered statement. Built once at
/// registration and shared read-only from then on; per-call state lives in
/// the `BoundStatement` this produces.
#[derive(Debug, Clone)]
pub struct StatementDescriptor {
    pub id: String,
    pub template: Template,
    pub command_kind: CommandKind,
    pub statement_type: StatementType,
    pub result_set_type: ResultSetType,
    pub fetch_size: Option<u32>,
    pub timeout: Option<Duration>,
    pub parameter_map: Vec<ParameterBinding>,
    pub result_mapping_refs: Vec<String>,
    pub cache: CachePolicy,
    pub key_generator: KeyGeneratorPolicy,
    pub key_properties: Vec<String>,
    pub key_columns: Vec<String>,
    pub result_ordered: bool,
    pub database_id: Option<String>,
    pub resource: Option<String>,
    pub result_sets: Vec<String>,
    log_id: String,
}

impl StatementDescriptor {
    pub fn builder(
        id: impl Into<String>,
        template: Template,
        command_kind: CommandKind,
    ) -> StatementDescriptorBuilder {
        StatementDescriptorBuilder::new(id, template, command_kind)
    }

    /// Statement id prefixed for log correlation.
    pub fn log_id(&self) -> &str {
        &self.log_id
    }

    /// Build the executable statement for this call. The legacy path kicks in
    /// when extraction produced no bindings but a parameter map was declared:
    /// those statements predate inline placeholders and carry their bindings
    /// externally.
    pub fn resolve_bound_statement(&self, parameter: &Value) -> Result<BoundStatement> {
        log::trace!("binding statement '{}'", self.log_id);
        let bound = self
            .template
            .bind(parameter)
            .map_err(|e| e.with_statement(&self.id))?;
        if bound.bindings.is_empty() && !self.parameter_map.is_empty() {
            return Ok(BoundStatement::new(
                bound.sql,
                self.parameter_map.clone(),
                parameter.clone(),
            ));
        }
        Ok(bound)
    }
}

pub struct StatementDescriptorBuilder {
    id: String,
    template: Template,
    command_kind: CommandKind,
    statement_type: StatementType,
    result_set_type: ResultSetType,
    fetch_size: Option<u32>,
    timeout: Option<Duration>,
    parameter_map: Vec<ParameterBinding>,
    result_mapping_refs: Vec<String>,
    cache: CachePolicy,
    key_generator: KeyGeneratorPolicy,
    key_properties: Vec<String>,
    key_columns: Vec<String>,
    result_ordered: bool,
    database_id: Option<String>,
    resource: Option<String>,
    result_sets: Vec<String>,
    log_prefix: Option<String>,
}

impl StatementDescriptorBuilder {
    pub fn new(id: impl Into<String>, template: Template, command_kind: CommandKind) -> Self {
        Self {
            id: id.into(),
            template,
            command_kind,
            statement_type: StatementType::Prepared,
            result_set_type: ResultSetType::Default,
            fetch_size: None,
            timeout: None,
            parameter_map: Vec::new(),
            result_mapping_refs: Vec::new(),
            // Selects read through the cache; writers invalidate it.
            cache: CachePolicy {
                use_cache: command_kind == CommandKind::Select,
                flush_required: command_kind != CommandKind::Select,
                cache_ref: None,
            },
            key_generator: KeyGeneratorPolicy::None,
            key_properties: Vec::new(),
            key_columns: Vec::new(),
            result_ordered: false,
            database_id: None,
            resource: None,
            result_sets: Vec::new(),
            log_prefix: None,
        }
    }

    /// Set the statement type.
    pub fn statement_type(mut self, statement_type: StatementType) -> Self {
        self.statement_type = statement_type;
        self
    }

    /// Set the result set type.
    pub fn result_set_type(mut self, result_set_type: ResultSetType) -> Self {
        self.result_set_type = result_set_type;
        self
    }

    /// Set the driver fetch size hint.
    pub fn fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = Some(fetch_size);
        self
    }

    /// Set the statement timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Declare an external parameter map for bodies without inline bindings.
    pub fn parameter_map(mut self, bindings: Vec<ParameterBinding>) -> Self {
        self.parameter_map = bindings;
        self
    }

    /// Reference result mappings by name.
    pub fn result_mapping_refs(mut self, refs: Vec<String>) -> Self {
        self.result_mapping_refs = refs;
        self
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.cache.use_cache = use_cache;
        self
    }

    pub fn flush_cache_required(mut self, flush_required: bool) -> Self {
        self.cache.flush_required = flush_required;
        self
    }

    pub fn cache_ref(mut self, cache_ref: impl Into<String>) -> Self {
        self.cache.cache_ref = Some(cache_ref.into());
        self
    }

    pub fn key_generator(mut self, key_generator: KeyGeneratorPolicy) -> Self {
        self.key_generator = key_generator;
        self
    }

    /// Comma-delimited property names receiving generated keys.
    pub fn key_properties(mut self, key_properties: &str) -> Self {
        self.key_properties = split_csv(key_properties);
        self
    }

    /// Comma-delimited column names producing generated keys.
    pub fn key_columns(mut self, key_columns: &str) -> Self {
        self.key_columns = split_csv(key_columns);
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

    /// Name the declaration source this statement came from.
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Comma-delimited names of additional result sets.
    pub fn result_sets(mut self, result_sets: &str) -> Self {
        self.result_sets = split_csv(result_sets);
        self
    }

    pub fn log_prefix(mut self, log_prefix: impl Into<String>) -> Self {
        self.log_prefix = Some(log_prefix.into());
        self
    }

    pub fn build(self) -> Result<StatementDescriptor> {
        if self.id.trim().is_empty() {
            return Err(crate::core::MapperError::BuildError(
                "Statement id must not be empty".to_string(),
            ));
        }
        let log_id = match &self.log_prefix {
            Some(prefix) => format!("{}{}", prefix, self.id),
            None => self.id.clone(),
        };
        Ok(StatementDescriptor {
            id: self.id,
            template: self.template,
            command_kind: self.command_kind,
            statement_type: self.statement_type,
            result_set_type: self.result_set_type,
            fetch_size: self.fetch_size,
            timeout: self.timeout,
            parameter_map: self.parameter_map,
            result_mapping_refs: self.result_mapping_refs,
            cache: self.cache,
            key_generator: self.key_generator,
            key_properties: self.key_properties,
            key_columns: self.key_columns,
            result_ordered: self.result_ordered,
            database_id: self.database_id,
            resource: self.resource,
            result_sets: self.result_sets,
            log_id,
        })
    }
}

fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}
