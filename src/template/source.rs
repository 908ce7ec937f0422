use crate::core::{DataType, Result, Value};
use crate::statement::binding::ParameterBinding;
use crate::statement::bound::BoundStatement;
use crate::template::binder;
use crate::template::fragment::{RenderContext, SqlFragment, render};

/// Resolved statement body, produced exactly once when a statement is
/// registered. Binding a template never mutates it.
#[derive(Debug, Clone)]
pub enum Template {
    Static(StaticTemplate),
    Dynamic(DynamicTemplate),
}

impl Template {
    /// Produce the executable statement for one call.
    pub fn bind(&self, parameter: &Value) -> Result<BoundStatement> {
        match self {
            Self::Static(template) => Ok(BoundStatement::new(
                template.sql.clone(),
                template.bindings.clone(),
                parameter.clone(),
            )),
            Self::Dynamic(template) => template.bind(parameter),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }
}

/// Fully pre-computed body: placeholder extraction ran at construction and
/// binding only attaches the parameter object.
#[derive(Debug, Clone)]
pub struct StaticTemplate {
    sql: String,
    bindings: Vec<ParameterBinding>,
}

impl StaticTemplate {
    pub fn new(sql: &str, parameter_type: Option<DataType>) -> Result<Self> {
        let (sql, bindings) = binder::extract(sql, parameter_type)?;
        Ok(Self { sql, bindings })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }
}

/// Body holding control fragments or per-call interpolation. Every bind
/// renders the tree against the parameter object, then runs the same
/// extraction pass a static body gets at construction.
#[derive(Debug, Clone)]
pub struct DynamicTemplate {
    root: SqlFragment,
    parameter_type: Option<DataType>,
}

impl DynamicTemplate {
    pub fn new(root: SqlFragment, parameter_type: Option<DataType>) -> Self {
        Self {
            root,
            parameter_type,
        }
    }

    pub fn root(&self) -> &SqlFragment {
        &self.root
    }

    fn bind(&self, parameter: &Value) -> Result<BoundStatement> {
        let mut ctx = RenderContext::new(parameter);
        render(&self.root, &mut ctx)?;
        let rendered = ctx.finish();
        let (sql, bindings) = binder::extract(&rendered, self.parameter_type)?;
        Ok(BoundStatement::new(sql, bindings, parameter.clone()))
    }
}
