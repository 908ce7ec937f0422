// ============================================================================
// rustsqlmap Library
// ============================================================================

pub mod core;
pub mod parsing;
pub mod template;
pub mod statement;
pub mod plugin;
pub mod mapper;
pub mod executor;
pub mod session;

// Re-export main types for convenience
pub use core::{DataType, MapperError, Properties, Result, Value};
pub use executor::{BatchResult, Executor};
pub use mapper::{CallResult, MapperInterface, MapperProxy, MethodDecl, ReturnShape};
pub use parsing::{DeclarationNode, ScriptNodeParser};
pub use plugin::{ComponentKind, Interceptable, Interceptor, InterceptorChain, Invocation, MethodSignature};
pub use session::{Configuration, ConfigurationBuilder, Settings, StatementDeclaration};
pub use statement::{
    BoundStatement, CommandKind, KeyGeneratorPolicy, ParameterBinding, ParameterMode,
    StatementDescriptor, StatementType,
};
pub use template::{Template, TemplateEngine, TemplateEngineRegistry};
