pub mod binding;
pub mod bound;
pub mod descriptor;
pub mod registry;

pub use binding::{JdbcType, ParameterBinding, ParameterMode};
pub use bound::BoundStatement;
pub use descriptor::{
    CachePolicy, CommandKind, KeyGeneratorPolicy, ResultSetType, StatementDescriptor,
    StatementDescriptorBuilder, StatementType,
};
pub use registry::StatementRegistry;
