//! Constructed service container.
//!
//! The container is the instantiated side of an application: named service
//! instances that toolkits pull their data sources from. Instances are
//! stored type-erased; by convention a service is registered as the handle
//! consumers ask for, e.g. `Arc<dyn DatabaseStructure>` or `Arc<dyn Router>`,
//! so that lookups can downcast to exactly that handle type.
//!
//! ```
//! use inspekt_core::container::Container;
//! use std::sync::Arc;
//!
//! let container = Container::new().with_service("greeting", Arc::new(String::from("hi")));
//! assert!(container.has_service("greeting"));
//! let greeting: Arc<String> = container.get_by_type().unwrap();
//! assert_eq!(greeting.as_str(), "hi");
//! ```

use crate::{Error, Result};
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

struct ServiceEntry {
    name: String,
    autowired: bool,
    instance: Arc<dyn Any + Send + Sync>,
}

/// A fully constructed set of named services.
#[derive(Default)]
pub struct Container {
    services: Vec<ServiceEntry>,
}

impl Container {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an autowired service, replacing any service with the same name.
    pub fn with_service<T: Any + Send + Sync>(
        mut self,
        name: impl Into<String>,
        instance: T,
    ) -> Self {
        self.add_service(name, instance, true);
        self
    }

    /// Add a service that can only be fetched by name.
    pub fn with_named_service<T: Any + Send + Sync>(
        mut self,
        name: impl Into<String>,
        instance: T,
    ) -> Self {
        self.add_service(name, instance, false);
        self
    }

    /// Add a service, replacing any service with the same name.
    pub fn add_service<T: Any + Send + Sync>(
        &mut self,
        name: impl Into<String>,
        instance: T,
        autowired: bool,
    ) {
        let name = name.into();
        let entry = ServiceEntry {
            name: name.clone(),
            autowired,
            instance: Arc::new(instance),
        };
        match self.services.iter_mut().find(|s| s.name == name) {
            Some(existing) => *existing = entry,
            None => self.services.push(entry),
        }
    }

    /// Whether a service with this exact name exists.
    pub fn has_service(&self, name: &str) -> bool {
        self.services.iter().any(|s| s.name == name)
    }

    /// Service names in registration order.
    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }

    /// Fetch a service by name.
    pub fn get_service<T: Any + Clone>(&self, name: &str) -> Result<T> {
        let entry = self
            .services
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::ServiceNotFound(name.to_string()))?;
        entry
            .instance
            .downcast_ref::<T>()
            .cloned()
            .ok_or(Error::ServiceType {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Fetch the single autowired service of type `T`.
    pub fn get_by_type<T: Any + Clone>(&self) -> Result<T> {
        let candidates: Vec<(&str, &T)> = self
            .services
            .iter()
            .filter(|s| s.autowired)
            .filter_map(|s| s.instance.downcast_ref::<T>().map(|value| (s.name.as_str(), value)))
            .collect();

        match candidates.as_slice() {
            [] => Err(Error::TypeNotFound(type_name::<T>())),
            [(_, found)] => Ok((*found).clone()),
            _ => Err(Error::AmbiguousType {
                type_name: type_name::<T>(),
                candidates: candidates.iter().map(|(name, _)| name.to_string()).collect(),
            }),
        }
    }

    /// Number of services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether the container holds no services.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("services", &self.service_names())
            .finish()
    }
}
