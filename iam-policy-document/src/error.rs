//! Error types for policy document assembly

use thiserror::Error;

/// Input slot a JSON document was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    SourceJson,
    OverrideJson,
}

impl std::fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceJson => write!(f, "source_json"),
            Self::OverrideJson => write!(f, "override_json"),
        }
    }
}

/// Errors that abort a document build. No partial document is produced for any of them.
#[derive(Error, Debug)]
pub enum PolicyDocumentError {
    /// A base or override document is not valid JSON or not policy-document shaped
    #[error("Failed to parse {source_name}: {source}")]
    Parse {
        source_name: DocumentSource,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "Found duplicate sid ({0}). Either remove the sid or ensure the sid is unique across all statements."
    )]
    DuplicateSid(String),

    /// Serializing the merged document failed; indicates a broken document invariant
    #[error("Failed to marshal policy document: {0}")]
    Marshal(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PolicyDocumentError {
    pub fn parse(source_name: DocumentSource, source: serde_json::Error) -> Self {
        Self::Parse {
            source_name,
            source,
        }
    }

    pub fn duplicate_sid(sid: impl Into<String>) -> Self {
        Self::DuplicateSid(sid.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type for policy document operations
pub type PolicyDocumentResult<T> = Result<T, PolicyDocumentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_sid_message_names_sid() {
        let err = PolicyDocumentError::duplicate_sid("S1");
        assert!(err.to_string().contains("duplicate sid (S1)"));
    }

    #[test]
    fn test_parse_error_names_input() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = PolicyDocumentError::parse(DocumentSource::OverrideJson, json_err);
        assert!(err.to_string().starts_with("Failed to parse override_json"));
    }

    #[test]
    fn test_config_error() {
        let err = PolicyDocumentError::config("unsupported extension 'yaml'");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: unsupported extension 'yaml'"
        );
    }
}
