use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{DataType, MapperError, Properties, Result, Value};
use crate::parsing::{DeclarationNode, NodeContent, ScriptNodeParser, TokenScanner, substitute};
use crate::template::fragment::{ForeachFragment, RenderContext, SqlFragment, render};
use crate::template::source::{DynamicTemplate, StaticTemplate, Template};

/// Marker prefix that routes a plain-text statement body through the node
/// path instead.
pub const SCRIPT_MARKER: &str = "<script>";

pub const DEFAULT_ENGINE: &str = "default";
pub const RAW_ENGINE: &str = "raw";

/// Declaration-time surroundings an engine resolves against: the variable
/// table, the reusable fragment set, and the optional script parser.
pub struct EngineContext<'a> {
    pub variables: &'a Properties,
    pub fragments: &'a HashMap<String, DeclarationNode>,
    pub script_parser: Option<&'a dyn ScriptNodeParser>,
}

/// Turns declared statement bodies into resolved templates. One engine per
/// declaration dialect; statements pick theirs by name.
pub trait TemplateEngine: Send + Sync {
    fn create_from_node(
        &self,
        env: &EngineContext<'_>,
        node: &DeclarationNode,
        parameter_type: Option<DataType>,
    ) -> Result<Template>;

    fn create_from_text(
        &self,
        env: &EngineContext<'_>,
        text: &str,
        parameter_type: Option<DataType>,
    ) -> Result<Template>;
}

/// Standard engine: script-marked texts go through the node path, everything
/// else gets declaration-time variable substitution and is classified static
/// unless interpolation spans survive it.
#[derive(Debug, Default)]
pub struct DefaultTemplateEngine;

impl TemplateEngine for DefaultTemplateEngine {
    fn create_from_node(
        &self,
        env: &EngineContext<'_>,
        node: &DeclarationNode,
        parameter_type: Option<DataType>,
    ) -> Result<Template> {
        let mut builder = NodeTreeBuilder {
            env,
            include_stack: Vec::new(),
        };
        let (children, dynamic) = builder.build_children(node)?;
        let root = SqlFragment::Mixed(children);
        if dynamic {
            return Ok(Template::Dynamic(DynamicTemplate::new(root, parameter_type)));
        }
        // All-static tree: render it once now and precompute the bindings.
        let mut ctx = RenderContext::new(&Value::Null);
        render(&root, &mut ctx)?;
        Ok(Template::Static(StaticTemplate::new(&ctx.finish(), parameter_type)?))
    }

    fn create_from_text(
        &self,
        env: &EngineContext<'_>,
        text: &str,
        parameter_type: Option<DataType>,
    ) -> Result<Template> {
        if text.starts_with(SCRIPT_MARKER) {
            let parser = env.script_parser.ok_or_else(|| {
                MapperError::ParseError(
                    "Script-wrapped statement body requires a registered script node parser"
                        .to_string(),
                )
            })?;
            let node = parser.parse(text)?;
            return self.create_from_node(env, &node, parameter_type);
        }

        let substituted = substitute(text, Some(env.variables));
        if has_interpolation_span(&substituted) {
            Ok(Template::Dynamic(DynamicTemplate::new(
                SqlFragment::Text(substituted),
                parameter_type,
            )))
        } else {
            Ok(Template::Static(StaticTemplate::new(&substituted, parameter_type)?))
        }
    }
}

/// Engine for declarations promised to be static. Resolution is delegated
/// and the result is rejected if anything dynamic survived.
#[derive(Debug, Default)]
pub struct RawTemplateEngine {
    delegate: DefaultTemplateEngine,
}

impl TemplateEngine for RawTemplateEngine {
    fn create_from_node(
        &self,
        env: &EngineContext<'_>,
        node: &DeclarationNode,
        parameter_type: Option<DataType>,
    ) -> Result<Template> {
        ensure_static(self.delegate.create_from_node(env, node, parameter_type)?)
    }

    fn create_from_text(
        &self,
        env: &EngineContext<'_>,
        text: &str,
        parameter_type: Option<DataType>,
    ) -> Result<Template> {
        ensure_static(self.delegate.create_from_text(env, text, parameter_type)?)
    }
}

fn ensure_static(template: Template) -> Result<Template> {
    if template.is_dynamic() {
        return Err(MapperError::BuildError(
            "Dynamic content is not allowed in raw statements".to_string(),
        ));
    }
    Ok(template)
}

/// Does the text still carry an unescaped `${}` span after declaration-time
/// substitution? If so it must be interpolated per call.
fn has_interpolation_span(text: &str) -> bool {
    let scanner = TokenScanner::new("${", "}");
    let mut found = false;
    scanner.scan(text, &mut |content: &str| {
        found = true;
        format!("${{{}}}", content)
    });
    found
}

struct NodeTreeBuilder<'a> {
    env: &'a EngineContext<'a>,
    include_stack: Vec<String>,
}

impl NodeTreeBuilder<'_> {
    fn build_children(&mut self, node: &DeclarationNode) -> Result<(Vec<SqlFragment>, bool)> {
        let mut children = Vec::new();
        let mut dynamic = false;
        for content in node.children() {
            match content {
                NodeContent::Text(text) => {
                    let substituted = substitute(text, Some(self.env.variables));
                    if substituted.trim().is_empty() {
                        continue;
                    }
                    if has_interpolation_span(&substituted) {
                        children.push(SqlFragment::Text(substituted));
                        dynamic = true;
                    } else {
                        children.push(SqlFragment::Static(substituted));
                    }
                }
                NodeContent::Element(element) => {
                    dynamic |= self.build_element(element, &mut children)?;
                }
            }
        }
        Ok((children, dynamic))
    }

    fn build_element(
        &mut self,
        element: &DeclarationNode,
        out: &mut Vec<SqlFragment>,
    ) -> Result<bool> {
        match element.name() {
            "if" => {
                let test = required_attr(element, "test")?;
                let (body, _) = self.build_children(element)?;
                out.push(SqlFragment::If {
                    test,
                    body: Box::new(SqlFragment::Mixed(body)),
                });
                Ok(true)
            }
            "foreach" => {
                let collection = required_attr(element, "collection")?;
                let item = required_attr(element, "item")?;
                let (body, _) = self.build_children(element)?;
                out.push(SqlFragment::Foreach(Box::new(ForeachFragment {
                    collection,
                    item,
                    index: element.attribute("index").map(str::to_string),
                    open: element.attribute("open").unwrap_or("").to_string(),
                    close: element.attribute("close").unwrap_or("").to_string(),
                    separator: element.attribute("separator").unwrap_or("").to_string(),
                    body: SqlFragment::Mixed(body),
                })));
                Ok(true)
            }
            "include" => {
                let refid = required_attr(element, "refid")?;
                // Includes splice at tree-construction time, so a referenced
                // fragment of plain text keeps the whole statement static.
                if self.include_stack.contains(&refid) {
                    return Err(MapperError::ParseError(format!(
                        "Circular include reference '{}'",
                        refid
                    )));
                }
                let fragment = self.env.fragments.get(&refid).cloned().ok_or_else(|| {
                    MapperError::ParseError(format!("Included fragment '{}' is not registered", refid))
                })?;
                self.include_stack.push(refid);
                let (spliced, dynamic) = self.build_children(&fragment)?;
                self.include_stack.pop();
                out.extend(spliced);
                Ok(dynamic)
            }
            other => Err(MapperError::ParseError(format!(
                "Unknown element <{}> in statement body",
                other
            ))),
        }
    }
}

fn required_attr(element: &DeclarationNode, name: &str) -> Result<String> {
    element
        .attribute(name)
        .map(str::to_string)
        .ok_or_else(|| {
            MapperError::ParseError(format!(
                "Element <{}> requires attribute '{}'",
                element.name(),
                name
            ))
        })
}

/// Named engines scoped to one configuration, with a settable default.
pub struct TemplateEngineRegistry {
    engines: HashMap<String, Arc<dyn TemplateEngine>>,
    default_engine: String,
}

impl TemplateEngineRegistry {
    /// Registry with the standard engines installed, defaulting to `default`.
    pub fn with_default_engines() -> Self {
        let mut registry = Self {
            engines: HashMap::new(),
            default_engine: DEFAULT_ENGINE.to_string(),
        };
        registry.register(DEFAULT_ENGINE, Arc::new(DefaultTemplateEngine));
        registry.register(RAW_ENGINE, Arc::new(RawTemplateEngine::default()));
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, engine: Arc<dyn TemplateEngine>) {
        self.engines.insert(name.into(), engine);
    }

    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.engines.contains_key(name) {
            return Err(MapperError::BuildError(format!(
                "Template engine '{}' is not registered",
                name
            )));
        }
        self.default_engine = name.to_string();
        Ok(())
    }

    /// Engine by name; `None` picks the default.
    pub fn get(&self, name: Option<&str>) -> Result<Arc<dyn TemplateEngine>> {
        let name = name.unwrap_or(&self.default_engine);
        self.engines.get(name).cloned().ok_or_else(|| {
            MapperError::BuildError(format!("Template engine '{}' is not registered", name))
        })
    }
}

impl Default for TemplateEngineRegistry {
    fn default() -> Self {
        Self::with_default_engines()
    }
}
