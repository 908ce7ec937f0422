pub mod binder;
pub mod engine;
pub mod fragment;
pub mod source;

pub use engine::{
    DEFAULT_ENGINE, DefaultTemplateEngine, EngineContext, RAW_ENGINE, RawTemplateEngine,
    SCRIPT_MARKER, TemplateEngine, TemplateEngineRegistry,
};
pub use fragment::{ForeachFragment, RenderContext, SqlFragment, render};
pub use source::{DynamicTemplate, StaticTemplate, Template};
