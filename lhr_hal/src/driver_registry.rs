//! Driver registry for hardware backends.
//!
//! Maps backend names to [`HardwareFactory`] functions. A registry is built
//! at startup and handed to whatever creates the engine; there is no global
//! registry.

use lhr_common::hardware::{HardwareControl, HardwareError, HardwareFactory};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::drivers;

/// Registry of available hardware backends.
pub struct DriverRegistry {
    factories: HashMap<&'static str, HardwareFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry pre-populated with every backend built into this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        drivers::register_builtin(&mut registry);
        registry
    }

    /// Register a backend factory. A later registration under the same name
    /// replaces the earlier one.
    pub fn register(&mut self, name: &'static str, factory: HardwareFactory) {
        if self.factories.insert(name, factory).is_some() {
            warn!(backend = name, "hardware backend re-registered, replacing");
        } else {
            debug!(backend = name, "hardware backend registered");
        }
    }

    pub fn get_factory(&self, name: &str) -> Option<HardwareFactory> {
        self.factories.get(name).copied()
    }

    /// Create a backend instance by name.
    ///
    /// # Errors
    /// Returns `HardwareError::BackendNotFound` if nothing is registered under `name`.
    pub fn create_driver(&self, name: &str) -> Result<Box<dyn HardwareControl>, HardwareError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| HardwareError::BackendNotFound(name.to_string()))?;
        Ok(factory())
    }

    /// Registered backend names, sorted.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation;

    #[test]
    fn builtin_registry_creates_simulator() {
        let registry = DriverRegistry::with_builtin();
        assert_eq!(registry.list_drivers(), vec!["simulation"]);

        let hardware = registry.create_driver("simulation").unwrap();
        assert_eq!(hardware.name(), "simulation");
    }

    #[test]
    fn unknown_backend_is_reported() {
        let registry = DriverRegistry::new();
        let result = registry.create_driver("smoothie");
        assert!(matches!(
            result,
            Err(HardwareError::BackendNotFound(name)) if name == "smoothie"
        ));
    }

    #[test]
    fn re_registration_replaces() {
        let mut registry = DriverRegistry::default();
        registry.register("sim-a", simulation::create_driver);
        registry.register("sim-b", simulation::create_driver);
        registry.register("sim-a", simulation::create_driver);

        assert_eq!(registry.list_drivers(), vec!["sim-a", "sim-b"]);
        assert!(registry.get_factory("sim-b").is_some());
    }
}
