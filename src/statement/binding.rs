use std::fmt;

use crate::core::{DataType, MapperError, Result};

/// Direction of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ParameterMode {
    In,
    Out,
    InOut,
}

impl ParameterMode {
    pub fn parse(name: &str) -> Result<ParameterMode> {
        match name.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            "INOUT" => Ok(Self::InOut),
            other => Err(MapperError::ParseError(format!(
                "Unknown parameter mode '{}'",
                other
            ))),
        }
    }
}

/// Driver-level type hint, carried through untouched for the execution layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum JdbcType {
    Bit,
    Tinyint,
    Smallint,
    Integer,
    Bigint,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    Longvarchar,
    Date,
    Time,
    Timestamp,
    Blob,
    Clob,
    Boolean,
    Null,
    Other,
}

impl JdbcType {
    pub fn parse(name: &str) -> Result<JdbcType> {
        match name.trim().to_ascii_uppercase().as_str() {
            "BIT" => Ok(Self::Bit),
            "TINYINT" => Ok(Self::Tinyint),
            "SMALLINT" => Ok(Self::Smallint),
            "INTEGER" => Ok(Self::Integer),
            "BIGINT" => Ok(Self::Bigint),
            "FLOAT" => Ok(Self::Float),
            "REAL" => Ok(Self::Real),
            "DOUBLE" => Ok(Self::Double),
            "NUMERIC" => Ok(Self::Numeric),
            "DECIMAL" => Ok(Self::Decimal),
            "CHAR" => Ok(Self::Char),
            "VARCHAR" => Ok(Self::Varchar),
            "LONGVARCHAR" => Ok(Self::Longvarchar),
            "DATE" => Ok(Self::Date),
            "TIME" => Ok(Self::Time),
            "TIMESTAMP" => Ok(Self::Timestamp),
            "BLOB" => Ok(Self::Blob),
            "CLOB" => Ok(Self::Clob),
            "BOOLEAN" => Ok(Self::Boolean),
            "NULL" => Ok(Self::Null),
            "OTHER" => Ok(Self::Other),
            other => Err(MapperError::ParseError(format!(
                "Unknown jdbc type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for JdbcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One positional parameter slot of a bound statement, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBinding {
    pub property: String,
    pub mode: ParameterMode,
    pub data_type: Option<DataType>,
    pub jdbc_type: Option<JdbcType>,
    pub nested_template: Option<String>,
}

impl ParameterBinding {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            mode: ParameterMode::In,
            data_type: None,
            jdbc_type: None,
            nested_template: None,
        }
    }

    /// Set the parameter direction.
    pub fn mode(mut self, mode: ParameterMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the declared value type.
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    /// Set the driver-level type hint.
    pub fn jdbc_type(mut self, jdbc_type: JdbcType) -> Self {
        self.jdbc_type = Some(jdbc_type);
        self
    }

    /// Reference a nested template by statement id.
    pub fn nested_template(mut self, id: impl Into<String>) -> Self {
        self.nested_template = Some(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse_case_insensitive() {
        assert_eq!(ParameterMode::parse("in").unwrap(), ParameterMode::In);
        assert_eq!(ParameterMode::parse("OUT").unwrap(), ParameterMode::Out);
        assert_eq!(ParameterMode::parse("InOut").unwrap(), ParameterMode::InOut);
        assert!(ParameterMode::parse("sideways").is_err());
    }

    #[test]
    fn test_jdbc_type_parse() {
        assert_eq!(JdbcType::parse("varchar").unwrap(), JdbcType::Varchar);
        assert_eq!(JdbcType::parse("TIMESTAMP").unwrap(), JdbcType::Timestamp);
        assert!(JdbcType::parse("tuple").is_err());
    }

    #[test]
    fn test_binding_defaults() {
        let binding = ParameterBinding::new("user.id");
        assert_eq!(binding.property, "user.id");
        assert_eq!(binding.mode, ParameterMode::In);
        assert!(binding.data_type.is_none());
        assert!(binding.jdbc_type.is_none());
        assert!(binding.nested_template.is_none());
    }
}
