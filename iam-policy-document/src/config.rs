//! Typed statement declarations, validated once at the ingestion boundary.
//!
//! Field names follow the `aws_iam_policy_document` data source so existing
//! configuration translates one-to-one. Unknown fields and effects other than
//! `Allow`/`Deny` are rejected while decoding, so the normalizer never re-checks them.

use crate::error::{PolicyDocumentError, PolicyDocumentResult};
use crate::types::Effect;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete input of one document build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(description = "Input for assembling one IAM policy document.")]
pub struct DocumentConfig {
    #[schemars(description = "Base policy document as raw JSON text, merged first.")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_json: Option<String>,

    #[schemars(description = "Policy Id to set on the generated document.")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,

    #[schemars(description = "Statement declarations, in output order.")]
    #[serde(default)]
    pub statement: Vec<StatementConfig>,

    #[schemars(description = "Override policy document as raw JSON text, merged last.")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_json: Option<String>,
}

/// One statement declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct StatementConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    #[schemars(description = "Allow or Deny. Defaults to Allow.")]
    #[serde(default)]
    pub effect: Effect,

    #[serde(default)]
    pub actions: Vec<String>,

    #[serde(default)]
    pub not_actions: Vec<String>,

    #[schemars(description = "Resource ARNs. '&{' is rewritten to '${'.")]
    #[serde(default)]
    pub resources: Vec<String>,

    #[schemars(description = "Excluded resource ARNs. '&{' is rewritten to '${'.")]
    #[serde(default)]
    pub not_resources: Vec<String>,

    #[serde(default)]
    pub principals: Vec<PrincipalConfig>,

    #[serde(default)]
    pub not_principals: Vec<PrincipalConfig>,

    #[serde(default)]
    pub condition: Vec<ConditionConfig>,
}

/// Principal declaration: `{type, identifiers}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PrincipalConfig {
    #[schemars(description = "Principal type, e.g. AWS, Service, Federated or *.")]
    #[serde(rename = "type")]
    pub principal_type: String,

    #[schemars(description = "Principal identifiers. '&{' is rewritten to '${'.")]
    pub identifiers: Vec<String>,
}

/// Condition declaration: `{test, variable, values}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConditionConfig {
    #[schemars(description = "Condition operator, e.g. StringEquals.")]
    pub test: String,

    #[schemars(description = "Context key, e.g. aws:SourceVpc.")]
    pub variable: String,

    #[schemars(description = "Values to compare against. '&{' is rewritten to '${'.")]
    pub values: Vec<String>,
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> PolicyDocumentResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(PolicyDocumentError::config(format!(
                "unsupported configuration file extension {:?} for {}, expected .json or .toml",
                other.unwrap_or_default(),
                path.display()
            ))),
        }
    }
}

impl DocumentConfig {
    /// Decode a configuration from text in the given format
    pub fn from_str_with_format(text: &str, format: ConfigFormat) -> PolicyDocumentResult<Self> {
        match format {
            ConfigFormat::Json => serde_json::from_str(text).map_err(|e| {
                PolicyDocumentError::config(format!("invalid JSON configuration: {e}"))
            }),
            ConfigFormat::Toml => toml::from_str(text).map_err(|e| {
                PolicyDocumentError::config(format!("invalid TOML configuration: {e}"))
            }),
        }
    }

    /// JSON Schema of the configuration file
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(DocumentConfig)
    }
}
