//! Policy document model: Sid-keyed merge and canonical JSON text

mod codec;

use crate::error::{DocumentSource, PolicyDocumentError, PolicyDocumentResult};
use crate::types::{Statement, POLICY_VERSION};
use log::{debug, trace};

/// A complete IAM policy document.
///
/// An empty `id` means no policy Id; it is omitted from the JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    pub version: String,
    pub id: String,
    pub statements: Vec<Statement>,
}

impl PolicyDocument {
    /// Create an empty document with the standard policy version
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            id: String::new(),
            statements: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_statements(mut self, statements: Vec<Statement>) -> Self {
        self.statements = statements;
        self
    }

    /// Parse a policy document from JSON text supplied through `source`
    pub fn from_json(text: &str, source: DocumentSource) -> PolicyDocumentResult<Self> {
        serde_json::from_str(text).map_err(|e| PolicyDocumentError::parse(source, e))
    }

    /// Canonical JSON text with 2-space indentation
    pub fn to_json_pretty(&self) -> PolicyDocumentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// First statement carrying `sid`. Empty sids never match.
    #[must_use]
    pub fn statement_by_sid(&self, sid: &str) -> Option<&Statement> {
        if sid.is_empty() {
            return None;
        }
        self.statements.iter().find(|s| s.sid == sid)
    }

    /// Non-empty sids in statement order
    pub fn sids(&self) -> impl Iterator<Item = &str> + '_ {
        self.statements
            .iter()
            .filter(|s| s.has_sid())
            .map(|s| s.sid.as_str())
    }

    /// Merge `incoming` into this document.
    ///
    /// A non-empty incoming Id replaces ours. Each incoming statement whose sid matches
    /// an existing statement replaces it in place; every other incoming statement,
    /// including all statements without a sid, is appended. The version is never taken
    /// from `incoming`.
    pub fn merge(&mut self, incoming: PolicyDocument) {
        if !incoming.id.is_empty() {
            debug!("Merge replaces policy id {:?} with {:?}", self.id, incoming.id);
            self.id = incoming.id;
        }

        for statement in incoming.statements {
            let existing = statement
                .has_sid()
                .then(|| self.statements.iter().position(|s| s.sid == statement.sid))
                .flatten();

            match existing {
                Some(index) => {
                    trace!("Merge replaces statement {:?} at {index}", statement.sid);
                    self.statements[index] = statement;
                }
                None => {
                    trace!("Merge appends statement {:?}", statement.sid);
                    self.statements.push(statement);
                }
            }
        }
    }
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self::new()
    }
}
