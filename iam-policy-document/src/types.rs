//! Canonical IAM policy records shared by the normalizer, merge and JSON codec

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Policy language version stamped on every document this crate produces
pub const POLICY_VERSION: &str = "2012-10-17";

/// Effect of a policy statement
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

impl Effect {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Deny => "Deny",
        }
    }
}

/// Ordered string set: duplicates are dropped on insert, first-seen order is kept
/// for serialization, equality ignores order.
#[derive(Debug, Clone, Default, Eq)]
pub struct StringSet(Vec<String>);

impl StringSet {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a value, returning false if it was already present
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.0.contains(&value) {
            return false;
        }
        self.0.push(value);
        true
    }

    pub fn extend<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.insert(value);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl PartialEq for StringSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().collect::<HashSet<_>>() == other.iter().collect::<HashSet<_>>()
    }
}

impl<S: Into<String>> FromIterator<S> for StringSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for StringSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a StringSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Entity a statement applies to, e.g. `AWS`, `Service`, `Federated` or `*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_type: String,
    pub identifiers: StringSet,
}

impl Principal {
    #[must_use]
    pub fn new(principal_type: impl Into<String>, identifiers: StringSet) -> Self {
        Self {
            principal_type: principal_type.into(),
            identifiers,
        }
    }

    /// The wildcard principal, written `"*"` in policy JSON
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        (self.principal_type == "AWS" || self.principal_type == "*")
            && self.identifiers.len() == 1
            && self.identifiers.contains("*")
    }
}

/// Condition constraint: operator (`test`), context key (`variable`) and values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub test: String,
    pub variable: String,
    pub values: StringSet,
}

impl Condition {
    #[must_use]
    pub fn new(test: impl Into<String>, variable: impl Into<String>, values: StringSet) -> Self {
        Self {
            test: test.into(),
            variable: variable.into(),
            values,
        }
    }
}

/// One permission rule of a policy document.
///
/// An empty `sid` means the statement has no identifier; such statements never take part
/// in Sid-based merging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    pub sid: String,
    pub effect: Effect,
    pub actions: StringSet,
    pub not_actions: StringSet,
    pub resources: StringSet,
    pub not_resources: StringSet,
    pub principals: Vec<Principal>,
    pub not_principals: Vec<Principal>,
    pub conditions: Vec<Condition>,
}

impl Statement {
    #[must_use]
    pub fn new(effect: Effect) -> Self {
        Self {
            effect,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = sid.into();
        self
    }

    #[must_use]
    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = actions.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources = resources.into_iter().collect();
        self
    }

    #[must_use]
    pub fn has_sid(&self) -> bool {
        !self.sid.is_empty()
    }
}
