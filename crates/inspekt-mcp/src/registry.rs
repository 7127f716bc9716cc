//! Tool registry and toolkits.
//!
//! The [`ToolRegistry`] owns every [`ToolDefinition`] of one server, in
//! registration order. It is filled during assembly and frozen once the
//! server starts; the server only ever reads it.
//!
//! A [`Toolkit`] is a group of tools sharing one data source. Built-in
//! toolkits are created through a `try_create` constructor returning
//! [`Availability`], so a toolkit whose data source is missing is skipped
//! instead of failing startup.

use crate::error::{Error, Result};
use crate::tool::ToolDefinition;
use rmcp::model::Tool;
use std::collections::HashMap;

/// What to do when a tool name is registered twice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// The later definition replaces the earlier one in the earlier one's
    /// position.
    #[default]
    LastWins,
    /// The second registration fails with [`Error::DuplicateTool`].
    Reject,
}

/// A named group of related tools.
pub trait Toolkit: Send + Sync {
    /// Toolkit name, used in logs.
    fn name(&self) -> &str;

    /// The toolkit's tools, in the order they should be listed.
    fn tools(&self) -> Vec<ToolDefinition>;
}

/// Outcome of a built-in toolkit's `try_create`.
#[derive(Debug)]
pub enum Availability<T> {
    /// The toolkit's data source is present.
    Available(T),
    /// The toolkit cannot run; the reason is logged.
    Absent(String),
}

impl<T> Availability<T> {
    /// Whether the toolkit was created.
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }

    /// The created toolkit, if any.
    pub fn into_option(self) -> Option<T> {
        match self {
            Availability::Available(toolkit) => Some(toolkit),
            Availability::Absent(_) => None,
        }
    }

    /// Why the toolkit is absent.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Availability::Available(_) => None,
            Availability::Absent(reason) => Some(reason),
        }
    }
}

/// Ordered, name-indexed set of tool definitions.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
    policy: DuplicatePolicy,
}

impl ToolRegistry {
    /// Create an empty registry with the default [`DuplicatePolicy`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given duplicate policy.
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Duplicate policy in effect.
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Add a tool.
    pub fn register(&mut self, definition: ToolDefinition) -> Result<()> {
        let name = definition.name().to_string();
        match self.index.get(&name) {
            Some(&position) => match self.policy {
                DuplicatePolicy::LastWins => {
                    log::warn!("Tool '{name}' registered again, replacing the earlier definition");
                    self.tools[position] = definition;
                }
                DuplicatePolicy::Reject => return Err(Error::DuplicateTool { name }),
            },
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(definition);
            }
        }
        Ok(())
    }

    /// Add tools in order.
    pub fn register_all(
        &mut self,
        definitions: impl IntoIterator<Item = ToolDefinition>,
    ) -> Result<()> {
        for definition in definitions {
            self.register(definition)?;
        }
        Ok(())
    }

    /// Add all tools of a toolkit, returning how many it contributed.
    pub fn register_toolkit(&mut self, toolkit: &dyn Toolkit) -> Result<usize> {
        let tools = toolkit.tools();
        let count = tools.len();
        self.register_all(tools)?;
        log::debug!("Registered {count} tools from toolkit '{}'", toolkit.name());
        Ok(count)
    }

    /// Find a tool by name.
    pub fn lookup(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&position| &self.tools[position])
    }

    /// All tools in registration order.
    pub fn list(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Tool metadata for `tools/list`.
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|d| d.tool().clone()).collect()
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(ToolDefinition::name).collect()
    }

    /// Whether a tool with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{Arguments, ToolFuture, ToolHandler, make_tool};
    use proptest::prelude::*;
    use serde_json::{Map, Value, json};
    use std::sync::Arc;

    fn named(name: &str, marker: &'static str) -> ToolDefinition {
        let handler: ToolHandler = Arc::new(move |_: Arguments| -> ToolFuture {
            Box::pin(async move { Ok(json!(marker)) })
        });
        ToolDefinition::new(make_tool(name, marker, Arc::new(Map::new())), handler)
    }

    struct Pair;

    impl Toolkit for Pair {
        fn name(&self) -> &str {
            "pair"
        }

        fn tools(&self) -> Vec<ToolDefinition> {
            vec![named("first", "1"), named("second", "2")]
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(named("a", "A")).unwrap();
        assert!(registry.contains("a"));
        assert_eq!(registry.lookup("a").unwrap().name(), "a");
        assert!(registry.lookup("b").is_none());
    }

    #[tokio::test]
    async fn test_last_wins_keeps_position() {
        let mut registry = ToolRegistry::new();
        registry.register(named("a", "old")).unwrap();
        registry.register(named("b", "B")).unwrap();
        registry.register(named("a", "new")).unwrap();

        assert_eq!(registry.names(), vec!["a", "b"]);
        let value = registry.lookup("a").unwrap().invoke(Arguments::new()).await.unwrap();
        assert_eq!(value, Value::from("new"));
    }

    #[test]
    fn test_reject_policy() {
        let mut registry = ToolRegistry::with_policy(DuplicatePolicy::Reject);
        registry.register(named("a", "A")).unwrap();
        let err = registry.register(named("a", "A2")).unwrap_err();
        assert!(matches!(err, Error::DuplicateTool { ref name } if name == "a"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_toolkit() {
        let mut registry = ToolRegistry::new();
        assert_eq!(registry.register_toolkit(&Pair).unwrap(), 2);
        assert_eq!(registry.names(), vec!["first", "second"]);
        assert_eq!(registry.tools()[1].name, "second");
    }

    #[test]
    fn test_availability() {
        let present: Availability<u8> = Availability::Available(1);
        let absent: Availability<u8> = Availability::Absent("no database".to_string());
        assert!(present.is_available());
        assert_eq!(absent.reason(), Some("no database"));
        assert_eq!(absent.into_option(), None);
        assert_eq!(present.into_option(), Some(1));
    }

    proptest! {
        #[test]
        fn test_list_preserves_first_registration_order(
            names in proptest::collection::vec("[a-e]", 0..20)
        ) {
            let mut registry = ToolRegistry::new();
            for name in &names {
                registry.register(named(name, "x")).unwrap();
            }

            let mut expected: Vec<&str> = Vec::new();
            for name in &names {
                if !expected.contains(&name.as_str()) {
                    expected.push(name);
                }
            }
            prop_assert_eq!(registry.names(), expected);
            for name in &names {
                prop_assert_eq!(
                    registry.lookup(name).map(ToolDefinition::name),
                    Some(name.as_str())
                );
            }
        }
    }
}
