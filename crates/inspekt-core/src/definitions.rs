//! Service definition graph.
//!
//! The definition graph describes how an application's services are wired
//! before anything is instantiated: names, declared types, autowiring, tags,
//! and how each service is created.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Autowiring setting of a service.
///
/// Serializes as `true`/`false`, or as the list of types the service is
/// autowired for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Autowired {
    /// Autowired for its own type (or not at all).
    Enabled(bool),
    /// Autowired only for the listed types.
    Types(Vec<String>),
}

impl Default for Autowired {
    fn default() -> Self {
        Autowired::Enabled(true)
    }
}

/// A callable used to create or set up a service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A class or function name.
    Name(String),
    /// A static method, `Class::method`.
    Method {
        /// Class name
        class: String,
        /// Method name
        method: String,
    },
    /// A method called on another service, `@service::method`.
    Reference {
        /// Referenced service
        service: String,
        /// Method name
        method: String,
    },
}

impl Entity {
    /// Parse the textual notation used in snapshots.
    pub fn parse(text: &str) -> Self {
        let (target, method) = match text.split_once("::") {
            Some((target, method)) => (target, Some(method)),
            None => (text, None),
        };

        match (target.strip_prefix('@'), method) {
            (Some(service), method) => Entity::Reference {
                service: service.to_string(),
                method: method.unwrap_or_default().to_string(),
            },
            (None, Some(method)) => Entity::Method {
                class: target.to_string(),
                method: method.to_string(),
            },
            (None, None) => Entity::Name(text.to_string()),
        }
    }

    /// Human-readable form, or `None` when the entity points at another
    /// service instance rather than a named callable.
    pub fn describe(&self) -> Option<String> {
        match self {
            Entity::Name(name) => Some(name.clone()),
            Entity::Method { class, method } => Some(format!("{class}::{method}")),
            Entity::Reference { .. } => None,
        }
    }
}

/// How a service comes into existence.
#[derive(Clone, Debug, PartialEq)]
pub enum DefinitionKind {
    /// Regular service created by a factory entity, then set up.
    Service {
        /// Creating entity
        factory: Option<Entity>,
        /// Setup calls in order
        setup: Vec<Entity>,
    },
    /// Generated factory producing instances of `result_type`.
    Factory {
        /// Type of the produced instances
        result_type: Option<String>,
        /// Factory interface being implemented
        interface: Option<String>,
    },
    /// Generated accessor returning another service.
    Accessor {
        /// Accessor interface being implemented
        interface: Option<String>,
    },
    /// Service supplied from outside at runtime.
    Imported,
    /// Generated locator over several services.
    Locator {
        /// Locator interface being implemented
        interface: Option<String>,
    },
}

impl DefinitionKind {
    /// Short label used in tool output.
    pub fn label(&self) -> &'static str {
        match self {
            DefinitionKind::Service { .. } => "service",
            DefinitionKind::Factory { .. } => "factory",
            DefinitionKind::Accessor { .. } => "accessor",
            DefinitionKind::Imported => "imported",
            DefinitionKind::Locator { .. } => "locator",
        }
    }
}

/// Definition of one service.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceDefinition {
    /// Service name, unique within a graph.
    pub name: String,
    /// Declared type, if known.
    pub type_name: Option<String>,
    /// Autowiring setting.
    pub autowired: Autowired,
    /// Tags and their values.
    pub tags: BTreeMap<String, Value>,
    /// Creation details.
    pub kind: DefinitionKind,
}

impl ServiceDefinition {
    /// A plain service of the given type, autowired, created by its type.
    pub fn service(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            name: name.into(),
            kind: DefinitionKind::Service {
                factory: Some(Entity::Name(type_name.clone())),
                setup: Vec::new(),
            },
            type_name: Some(type_name),
            autowired: Autowired::default(),
            tags: BTreeMap::new(),
        }
    }

    /// Replace the creation details.
    pub fn with_kind(mut self, kind: DefinitionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>, value: Value) -> Self {
        self.tags.insert(tag.into(), value);
        self
    }
}

/// Ordered collection of service definitions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DefinitionGraph {
    definitions: Vec<ServiceDefinition>,
}

impl DefinitionGraph {
    /// Build a graph; a later definition with an already used name replaces
    /// the earlier one in place.
    pub fn new(definitions: impl IntoIterator<Item = ServiceDefinition>) -> Self {
        let mut graph = Self::default();
        for definition in definitions {
            graph.add(definition);
        }
        graph
    }

    /// Add or replace a definition.
    pub fn add(&mut self, definition: ServiceDefinition) {
        match self.definitions.iter_mut().find(|d| d.name == definition.name) {
            Some(existing) => *existing = definition,
            None => self.definitions.push(definition),
        }
    }

    /// All definitions in declaration order.
    pub fn definitions(&self) -> &[ServiceDefinition] {
        &self.definitions
    }

    /// Look up a definition by exact name.
    pub fn get(&self, name: &str) -> Option<&ServiceDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// Whether a definition with this exact name exists.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
