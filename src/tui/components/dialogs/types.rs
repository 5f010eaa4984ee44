//! Identifier types for the dialog system
//!
//! Dialog identifiers are opaque and generated once per overlay instance, so two
//! overlays of the same kind never collide in the stack.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for dialog instances
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialogId(String);

impl DialogId {
    /// Wrap an explicit identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(format!("dialog-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DialogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a mutual-exclusion domain: at most one member is open at a time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupName(String);

impl GroupName {
    /// Per-row action menus in tables and lists
    pub const ROW_ACTIONS: &'static str = "row-actions";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn row_actions() -> Self {
        Self::new(Self::ROW_ACTIONS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = DialogId::generate();
        let b = DialogId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("dialog-"));
    }

    #[test]
    fn test_group_name_display() {
        assert_eq!(GroupName::row_actions().to_string(), "row-actions");
    }
}
