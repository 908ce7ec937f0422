pub mod node;
pub mod token;
pub mod variables;

pub use node::{DeclarationNode, NodeContent, ScriptNodeParser};
pub use token::{TokenHandler, TokenScanner};
pub use variables::{KEY_DEFAULT_VALUE_SEPARATOR, KEY_ENABLE_DEFAULT_VALUE, substitute};
