use std::collections::HashMap;

use crate::core::{MapperError, PathSegment, Result, Value, lookup, lookup_in, parse_path};
use crate::parsing::TokenScanner;

/// One node of a dynamic statement body. The tree is built once when the
/// statement is registered and never mutated; rendering walks it per call.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlFragment {
    /// Literal text with no remaining placeholders.
    Static(String),
    /// Text carrying `${}` spans, substituted against the parameter per render.
    Text(String),
    /// Conditional inclusion keyed on property-path truthiness.
    If {
        test: String,
        body: Box<SqlFragment>,
    },
    /// Per-element repetition over an array property.
    Foreach(Box<ForeachFragment>),
    /// Ordered sequence of child fragments.
    Mixed(Vec<SqlFragment>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeachFragment {
    pub collection: String,
    pub item: String,
    pub index: Option<String>,
    pub open: String,
    pub close: String,
    pub separator: String,
    pub body: SqlFragment,
}

/// Accumulates rendered SQL. Chunks are joined with single spaces, so
/// fragments never have to manage whitespace between themselves.
pub struct RenderContext<'a> {
    parameter: &'a Value,
    bindings: HashMap<String, Value>,
    aliases: HashMap<String, String>,
    sql: String,
}

impl<'a> RenderContext<'a> {
    pub fn new(parameter: &'a Value) -> Self {
        Self {
            parameter,
            bindings: HashMap::new(),
            aliases: HashMap::new(),
            sql: String::new(),
        }
    }

    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.sql.is_empty() {
            self.sql.push(' ');
        }
        self.sql.push_str(text);
    }

    pub fn finish(self) -> String {
        self.sql.trim().to_string()
    }

    /// Resolve a path, loop bindings first, then the parameter object.
    fn value_of(&self, path: &str) -> Option<&Value> {
        let segments = parse_path(path).ok()?;
        if let Some(PathSegment::Name(head)) = segments.first() {
            if let Some(bound) = self.bindings.get(head) {
                return lookup_in(bound, &segments[1..]);
            }
        }
        lookup(self.parameter, path)
    }

    /// Rewrite a path whose head names a loop variable into the absolute,
    /// index-qualified form.
    fn qualify(&self, path: &str) -> String {
        let (head, rest) = split_head(path);
        match self.aliases.get(head) {
            Some(alias) => format!("{}{}", alias, rest),
            None => path.to_string(),
        }
    }

    fn child(&self) -> RenderContext<'a> {
        RenderContext {
            parameter: self.parameter,
            bindings: self.bindings.clone(),
            aliases: self.aliases.clone(),
            sql: String::new(),
        }
    }
}

fn split_head(path: &str) -> (&str, &str) {
    let end = path.find(['.', '[']).unwrap_or(path.len());
    (&path[..end], &path[end..])
}

/// Render a fragment tree into the context.
pub fn render(fragment: &SqlFragment, ctx: &mut RenderContext<'_>) -> Result<()> {
    match fragment {
        SqlFragment::Static(text) => {
            ctx.append(text);
        }
        SqlFragment::Text(text) => {
            let rendered = substitute_inline(text, ctx);
            ctx.append(&rendered);
        }
        SqlFragment::If { test, body } => {
            let truthy = ctx.value_of(test.trim()).is_some_and(Value::as_bool);
            if truthy {
                render(body, ctx)?;
            }
        }
        SqlFragment::Foreach(foreach) => {
            render_foreach(foreach, ctx)?;
        }
        SqlFragment::Mixed(children) => {
            for child in children {
                render(child, ctx)?;
            }
        }
    }
    Ok(())
}

/// `${}` interpolation against loop bindings and the parameter object.
/// Unresolved spans are re-emitted unchanged.
fn substitute_inline(text: &str, ctx: &RenderContext<'_>) -> String {
    let scanner = TokenScanner::new("${", "}");
    scanner.scan(text, &mut |content: &str| match ctx.value_of(content.trim()) {
        Some(value) => value.to_string(),
        None => format!("${{{}}}", content),
    })
}

fn render_foreach(foreach: &ForeachFragment, ctx: &mut RenderContext<'_>) -> Result<()> {
    let items: Vec<Value> = match ctx.value_of(foreach.collection.trim()) {
        Some(Value::Array(items)) => items.clone(),
        _ => return Err(MapperError::binding(foreach.collection.trim())),
    };
    if items.is_empty() {
        return Ok(());
    }

    // Loop variables may themselves be loop-bound (nested repetition), so the
    // collection path is qualified before items are addressed through it.
    let collection_path = ctx.qualify(foreach.collection.trim());

    ctx.append(&foreach.open);
    let mut first = true;
    for (i, item) in items.iter().enumerate() {
        let item_path = format!("{}[{}]", collection_path, i);

        let mut body_ctx = ctx.child();
        body_ctx.bindings.insert(foreach.item.clone(), item.clone());
        body_ctx.aliases.insert(foreach.item.clone(), item_path.clone());
        if let Some(index_var) = &foreach.index {
            body_ctx.bindings.insert(index_var.clone(), Value::Integer(i as i64));
        }
        render(&foreach.body, &mut body_ctx)?;

        let chunk = rewrite_item_paths(&body_ctx.finish(), &foreach.item, &item_path);
        if chunk.is_empty() {
            continue;
        }
        if !first {
            ctx.append(&foreach.separator);
        }
        ctx.append(&chunk);
        first = false;
    }
    ctx.append(&foreach.close);
    Ok(())
}

/// Rewrite `#{item...}` placeholders in an emitted body chunk so the later
/// extraction pass sees index-qualified absolute paths.
fn rewrite_item_paths(chunk: &str, item: &str, item_path: &str) -> String {
    let scanner = TokenScanner::new("#{", "}");
    scanner.scan(chunk, &mut |content: &str| {
        let (property, attrs) = match content.split_once(',') {
            Some((p, a)) => (p, Some(a)),
            None => (content, None),
        };
        let property = property.trim();
        let (head, rest) = split_head(property);
        let rewritten = if head == item {
            format!("{}{}", item_path, rest)
        } else {
            property.to_string()
        };
        match attrs {
            Some(attrs) => format!("#{{{},{}}}", rewritten, attrs),
            None => format!("#{{{}}}", rewritten),
        }
    })
}
