use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{MapperError, Result};
use crate::statement::descriptor::StatementDescriptor;

/// Id-keyed descriptor store. Ids are unique and lookups fail closed, so a
/// mistyped id surfaces as an error instead of running some other statement.
#[derive(Default)]
pub struct StatementRegistry {
    statements: HashMap<String, Arc<StatementDescriptor>>,
}

impl StatementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, descriptor: StatementDescriptor) -> Result<Arc<StatementDescriptor>> {
        if self.statements.contains_key(&descriptor.id) {
            return Err(MapperError::BuildError(format!(
                "Statement '{}' is already registered",
                descriptor.id
            )));
        }
        log::debug!("registered statement '{}'", descriptor.log_id());
        let descriptor = Arc::new(descriptor);
        self.statements
            .insert(descriptor.id.clone(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    pub fn get(&self, id: &str) -> Result<Arc<StatementDescriptor>> {
        self.statements
            .get(id)
            .cloned()
            .ok_or_else(|| MapperError::StatementNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.statements.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.statements.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::descriptor::CommandKind;
    use crate::template::{StaticTemplate, Template};

    fn descriptor(id: &str) -> StatementDescriptor {
        StatementDescriptor::builder(
            id,
            Template::Static(StaticTemplate::new("SELECT 1", None).unwrap()),
            CommandKind::Select,
        )
        .build()
        .unwrap()
    }

    #[test]
    fn test_get_registered() {
        let mut registry = StatementRegistry::new();
        registry.add(descriptor("users.find")).unwrap();
        assert_eq!(registry.get("users.find").unwrap().id, "users.find");
    }

    #[test]
    fn test_unknown_id_fails_closed() {
        let registry = StatementRegistry::new();
        let err = registry.get("users.find").unwrap_err();
        assert!(matches!(err, MapperError::StatementNotFound(id) if id == "users.find"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = StatementRegistry::new();
        registry.add(descriptor("users.find")).unwrap();
        let err = registry.add(descriptor("users.find")).unwrap_err();
        assert!(matches!(err, MapperError::BuildError(_)));
        assert_eq!(registry.len(), 1);
    }
}
