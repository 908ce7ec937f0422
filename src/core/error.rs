use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Statement '{0}' not found in registry")]
    StatementNotFound(String),

    #[error("Mapper '{0}' not found in registry")]
    MapperNotFound(String),

    #[error("Method '{0}' not declared on mapper '{1}'")]
    MethodNotFound(String, String),

    #[error("Property '{0}' not found on parameter object")]
    PropertyNotFound(String),

    #[error("Binding error: property '{property}' could not be bound for statement '{statement}'")]
    Binding { property: String, statement: String },

    #[error("Expected one result (or none) but statement '{0}' returned {1}")]
    TooManyResults(String, usize),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Platform support missing: {0}")]
    PlatformUnsupported(String),

    #[error("Build error: {0}")]
    BuildError(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, MapperError>;

impl MapperError {
    /// Stamp a statement id into a binding error raised below the statement
    /// layer, where the id is not yet known. Other variants pass through.
    pub fn with_statement(self, id: &str) -> Self {
        match self {
            Self::Binding { property, statement } if statement.is_empty() => Self::Binding {
                property,
                statement: id.to_string(),
            },
            other => other,
        }
    }

    pub fn binding(property: impl Into<String>) -> Self {
        Self::Binding {
            property: property.into(),
            statement: String::new(),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for MapperError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
