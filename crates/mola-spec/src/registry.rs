//! Registry of known specification implementations
//!
//! Maps a stable string key to a constructor, populated at process start.
//! Configuration files name their specification by this key.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::records::Settings;
use crate::spec::{GeneralSpecification, SimpleSpecification, Specification};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown specification: {0}")]
    UnknownSpecification(String),
}

type SpecFactory = fn(Settings) -> Box<dyn Specification>;

pub struct SpecificationRegistry {
    factories: BTreeMap<String, SpecFactory>,
}

impl SpecificationRegistry {
    pub fn new() -> Self {
        let mut registry = Self { factories: BTreeMap::new() };
        registry.register("GeneralSpecification", |settings| {
            Box::new(GeneralSpecification::new(settings))
        });
        registry.register("SimpleSpecification", |settings| {
            Box::new(SimpleSpecification::new(settings))
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: SpecFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    /// Construct the named specification with the given settings.
    pub fn create(
        &self,
        name: &str,
        settings: Settings,
    ) -> Result<Box<dyn Specification>, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::UnknownSpecification(name.to_string()))?;
        Ok(factory(settings))
    }

    /// Registered keys, for configuration editors.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl Default for SpecificationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_specifications() {
        let registry = SpecificationRegistry::default();
        assert_eq!(registry.names(), vec!["GeneralSpecification", "SimpleSpecification"]);

        let spec = registry.create("GeneralSpecification", Settings::default()).unwrap();
        assert_eq!(spec.name(), "GeneralSpecification");
    }

    #[test]
    fn test_unknown_specification() {
        let registry = SpecificationRegistry::default();
        let err = registry.create("NoSuchSpecification", Settings::default()).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownSpecification(_)));
    }
}
