pub mod configuration;
pub mod declaration;

pub use configuration::{Configuration, ConfigurationBuilder, Settings};
pub use declaration::{StatementDeclaration, StatementSource};
