pub mod error;
pub mod path;
pub mod types;
pub mod value;

pub use error::{MapperError, Result};
pub use path::{PathSegment, lookup, lookup_in, parse_path, resolve_property};
pub use types::{ExecutorType, Properties};
pub use value::{DataType, Value};
