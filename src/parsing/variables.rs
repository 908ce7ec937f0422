use crate::core::Properties;
use crate::parsing::token::{TokenHandler, TokenScanner};

/// Table key that switches on `${name:default}` support. Read from the
/// variable table itself so declaration sets opt in without any code change.
pub const KEY_ENABLE_DEFAULT_VALUE: &str = "rustsqlmap.parsing.variables.enable-default-value";

/// Table key overriding the separator between a variable name and its default.
pub const KEY_DEFAULT_VALUE_SEPARATOR: &str =
    "rustsqlmap.parsing.variables.default-value-separator";

const DEFAULT_VALUE_SEPARATOR: &str = ":";

/// Replace `${name}` spans in `text` from the variable table. Unknown names
/// are re-emitted as `${name}`, never dropped, so unresolved spans stay
/// visible to later passes. With no table at all, every span is re-emitted.
pub fn substitute(text: &str, variables: Option<&Properties>) -> String {
    let scanner = TokenScanner::new("${", "}");
    let mut handler = VariableTokenHandler::new(variables);
    scanner.scan(text, &mut handler)
}

struct VariableTokenHandler<'a> {
    variables: Option<&'a Properties>,
    enable_default_value: bool,
    default_value_separator: String,
}

impl<'a> VariableTokenHandler<'a> {
    fn new(variables: Option<&'a Properties>) -> Self {
        let enable_default_value = variables
            .and_then(|v| v.get(KEY_ENABLE_DEFAULT_VALUE))
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let default_value_separator = variables
            .and_then(|v| v.get(KEY_DEFAULT_VALUE_SEPARATOR))
            .cloned()
            .unwrap_or_else(|| DEFAULT_VALUE_SEPARATOR.to_string());
        Self {
            variables,
            enable_default_value,
            default_value_separator,
        }
    }
}

impl TokenHandler for VariableTokenHandler<'_> {
    fn handle_token(&mut self, content: &str) -> String {
        if let Some(variables) = self.variables {
            if self.enable_default_value {
                // Split at the first separator only; the default may itself
                // contain separators.
                if let Some(idx) = content.find(&self.default_value_separator) {
                    let key = &content[..idx];
                    let default_value = &content[idx + self.default_value_separator.len()..];
                    return variables
                        .get(key)
                        .cloned()
                        .unwrap_or_else(|| default_value.to_string());
                }
            }
            if let Some(value) = variables.get(content) {
                return value.clone();
            }
        }
        format!("${{{}}}", content)
    }
}
