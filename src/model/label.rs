//! Resource labels.
//!
//! A label says what a test intends to do with a shared resource. Three values are
//! reserved; anything else scopes the resource to the one test that asked for it.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const STATEFUL: &str = "stateful";
pub const STATELESS: &str = "stateless";
pub const REMOVED: &str = "removed";

/// Classification of a shared resource's durability and role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Label {
    /// Persists and is reused by every test in the run.
    Stateful,
    /// Pre-existing reference data. Looked up, never provisioned, never deleted.
    Stateless,
    /// Provisioned so that a test can exercise the deletion path.
    Removed,
    /// Exclusive to one test. Built only through [`Label::custom`] or `From`, so a
    /// reserved name always becomes its own variant.
    Custom(CustomLabel),
}

/// Name of a non-reserved label. Cannot be built outside this module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomLabel(String);

impl CustomLabel {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Label {
    pub fn custom(name: impl Into<String>) -> Self {
        Label::from(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Label::Stateful => STATEFUL,
            Label::Stateless => STATELESS,
            Label::Removed => REMOVED,
            Label::Custom(name) => name.as_str(),
        }
    }

    pub fn is_stateless(&self) -> bool {
        matches!(self, Label::Stateless)
    }

    /// The label used when a provisioned resource came back in the wrong scope.
    ///
    /// Strictly longer than `self`, so successive retries never revisit a key.
    pub fn derived(&self) -> Label {
        Label::from(format!("{}a", self.as_str()))
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        match value.as_str() {
            STATEFUL => Label::Stateful,
            STATELESS => Label::Stateless,
            REMOVED => Label::Removed,
            _ => Label::Custom(CustomLabel(value)),
        }
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::from(value.to_string())
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        match label {
            Label::Custom(name) => name.0,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
