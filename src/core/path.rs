use crate::core::{MapperError, Result, Value};

/// One step of a property path: either a field name or an array index, so
/// `items[2].name` tokenizes to `[Name("items"), Index(2), Name("name")]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Name(String),
    Index(usize),
}

static NULL: Value = Value::Null;

/// Names under which a bare array parameter can be addressed, matching the
/// wrapping applied when a collection is passed as the whole parameter object.
const COLLECTION_NAMES: [&str; 3] = ["list", "collection", "array"];

pub fn parse_path(path: &str) -> Result<Vec<PathSegment>> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(MapperError::ParseError("Empty property path".to_string()));
    }

    let mut segments = Vec::new();
    for part in trimmed.split('.') {
        let (name, mut rest) = match part.find('[') {
            Some(i) => (&part[..i], &part[i..]),
            None => (part, ""),
        };
        if name.is_empty() && rest.is_empty() {
            return Err(MapperError::ParseError(format!(
                "Invalid property path '{}'",
                path
            )));
        }
        if !name.is_empty() {
            segments.push(PathSegment::Name(name.to_string()));
        }
        while let Some(stripped) = rest.strip_prefix('[') {
            let end = stripped.find(']').ok_or_else(|| {
                MapperError::ParseError(format!("Unclosed index in property path '{}'", path))
            })?;
            let index = stripped[..end].parse::<usize>().map_err(|_| {
                MapperError::ParseError(format!(
                    "Non-numeric index '{}' in property path '{}'",
                    &stripped[..end],
                    path
                ))
            })?;
            segments.push(PathSegment::Index(index));
            rest = &stripped[end + 1..];
        }
        if !rest.is_empty() {
            return Err(MapperError::ParseError(format!(
                "Invalid property path '{}'",
                path
            )));
        }
    }
    Ok(segments)
}

/// Walk already-parsed segments from `value`, with no fallbacks.
pub fn lookup_in<'v>(value: &'v Value, segments: &[PathSegment]) -> Option<&'v Value> {
    let mut current = value;
    for segment in segments {
        current = match segment {
            PathSegment::Name(name) => current.field(name)?,
            PathSegment::Index(index) => current.element(*index)?,
        };
    }
    Some(current)
}

/// Soft path resolution: `None` when the path does not lead anywhere.
///
/// Three fallbacks apply at the first segment, mirroring how parameter
/// objects are addressed when they are not keyed maps: a scalar parameter
/// answers to any single-segment name, and a bare array parameter answers to
/// the reserved collection names.
pub fn lookup<'v>(parameter: &'v Value, path: &str) -> Option<&'v Value> {
    let segments = parse_path(path).ok()?;
    let mut current = parameter;
    for (i, segment) in segments.iter().enumerate() {
        current = match segment {
            PathSegment::Name(name) => match current.field(name) {
                Some(v) => v,
                None if i == 0 => match current {
                    Value::Object(_) => return None,
                    Value::Array(_) if COLLECTION_NAMES.contains(&name.as_str()) => current,
                    Value::Array(_) => return None,
                    _ if segments.len() == 1 => current,
                    _ => return None,
                },
                None => return None,
            },
            PathSegment::Index(index) => current.element(*index)?,
        };
    }
    Some(current)
}

/// Strict path resolution for parameter marshalling. A null parameter object
/// yields null for every path; anything else unresolved is an error.
pub fn resolve_property<'v>(parameter: &'v Value, path: &str) -> Result<&'v Value> {
    if parameter.is_null() {
        return Ok(&NULL);
    }
    lookup(parameter, path).ok_or_else(|| MapperError::PropertyNotFound(path.to_string()))
}
