use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{MapperError, Result};
use crate::executor::Executor;
use crate::mapper::interface::MapperInterface;
use crate::mapper::proxy::{MapperProxy, MapperProxyFactory};
use crate::session::Configuration;

/// Name-keyed store of mapper interfaces and their proxy factories.
#[derive(Default)]
pub struct MapperRegistry {
    known_mappers: HashMap<String, Arc<MapperProxyFactory>>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mapper(&mut self, interface: MapperInterface) -> Result<()> {
        if self.known_mappers.contains_key(interface.name()) {
            return Err(MapperError::BuildError(format!(
                "Mapper '{}' is already registered",
                interface.name()
            )));
        }
        log::debug!("registered mapper '{}'", interface.name());
        let name = interface.name().to_string();
        self.known_mappers
            .insert(name, Arc::new(MapperProxyFactory::new(Arc::new(interface))));
        Ok(())
    }

    pub fn get_mapper(
        &self,
        name: &str,
        configuration: &Arc<Configuration>,
        executor: Arc<dyn Executor>,
    ) -> Result<MapperProxy> {
        let factory = self
            .known_mappers
            .get(name)
            .ok_or_else(|| MapperError::MapperNotFound(name.to_string()))?;
        Ok(factory.new_instance(Arc::clone(configuration), executor))
    }

    pub fn has_mapper(&self, name: &str) -> bool {
        self.known_mappers.contains_key(name)
    }

    pub fn mapper_names(&self) -> impl Iterator<Item = &str> {
        self.known_mappers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.known_mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known_mappers.is_empty()
    }
}
