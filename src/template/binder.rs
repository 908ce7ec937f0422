use crate::core::{DataType, MapperError, Result, parse_path};
use crate::parsing::{TokenHandler, TokenScanner};
use crate::statement::binding::{JdbcType, ParameterBinding, ParameterMode};

const VALID_KEYS: &str = "mode, type, jdbcType, template";

/// Replace every `#{...}` span in `sql` with a positional `?` and collect one
/// binding per span, in scan order. `parameter_type` is the declared type of
/// the whole parameter object; bare scalar declarations inherit it.
pub fn extract(
    sql: &str,
    parameter_type: Option<DataType>,
) -> Result<(String, Vec<ParameterBinding>)> {
    let scanner = TokenScanner::new("#{", "}");
    let mut handler = BindingTokenHandler {
        parameter_type,
        bindings: Vec::new(),
        error: None,
    };
    let text = scanner.scan(sql, &mut handler);
    if let Some(err) = handler.error {
        return Err(err);
    }
    Ok((text, handler.bindings))
}

struct BindingTokenHandler {
    parameter_type: Option<DataType>,
    bindings: Vec<ParameterBinding>,
    error: Option<MapperError>,
}

impl TokenHandler for BindingTokenHandler {
    fn handle_token(&mut self, content: &str) -> String {
        if self.error.is_some() {
            return String::new();
        }
        match build_binding(content, self.parameter_type) {
            Ok(binding) => {
                self.bindings.push(binding);
                "?".to_string()
            }
            Err(err) => {
                self.error = Some(err);
                String::new()
            }
        }
    }
}

fn build_binding(content: &str, parameter_type: Option<DataType>) -> Result<ParameterBinding> {
    let content = content.trim();
    if content.is_empty() {
        return Err(MapperError::ParseError(
            "Empty parameter mapping #{}".to_string(),
        ));
    }
    if content.starts_with('(') {
        return Err(MapperError::ParseError(format!(
            "Expression based parameters are not supported: #{{{}}}",
            content
        )));
    }

    let mut parts = content.split(',');
    let property = parts.next().unwrap_or("").trim();
    parse_path(property)
        .map_err(|_| MapperError::ParseError(format!("Invalid property in parameter mapping #{{{}}}", content)))?;

    let mut binding = ParameterBinding::new(property);
    for attr in parts {
        let (key, value) = attr.split_once('=').ok_or_else(|| {
            MapperError::ParseError(format!(
                "Malformed attribute '{}' in parameter mapping #{{{}}}",
                attr.trim(),
                content
            ))
        })?;
        match key.trim() {
            "mode" => binding.mode = ParameterMode::parse(value)?,
            "type" => binding.data_type = Some(DataType::parse(value)?),
            "jdbcType" => binding.jdbc_type = Some(JdbcType::parse(value)?),
            "template" => binding.nested_template = Some(value.trim().to_string()),
            other => {
                return Err(MapperError::ParseError(format!(
                    "An invalid property '{}' was found in parameter mapping #{{{}}}. Valid properties are: {}",
                    other, content, VALID_KEYS
                )));
            }
        }
    }

    // Explicit type= wins; otherwise a scalar parameter type flows through.
    if binding.data_type.is_none() {
        if let Some(t) = parameter_type {
            if t.is_scalar() {
                binding.data_type = Some(t);
            }
        }
    }
    Ok(binding)
}
