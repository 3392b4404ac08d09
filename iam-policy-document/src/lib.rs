//! This crate provides the core logic for assembling AWS IAM policy documents:
//! - Statement normalization from typed declarations, with `&{...}` variable substitution
//! - Sid-keyed three-way merge (source_json < declarations < override_json)
//! - Canonical IAM JSON encoding with single-value collapsing
//! - Stable identifiers hashed from the canonical text
//!

pub mod commands;
mod config;
mod document;
mod error;
mod hashing;
mod synthesis;
mod types;

// Re-exports for a small, focused public API
pub use commands::{assemble, AssembledPolicy, PolicyDocumentService};
pub use config::{ConditionConfig, ConfigFormat, DocumentConfig, PrincipalConfig, StatementConfig};
pub use document::PolicyDocument;
pub use error::{DocumentSource, PolicyDocumentError, PolicyDocumentResult};
pub use hashing::{Crc32Hasher, HashAlgorithm, PolicyHasher, Sha256Hasher};
pub use synthesis::{
    build_conditions, build_principals, build_statement, build_statements, replace_vars,
    replace_vars_in_list, SidTracker,
};
pub use types::{Condition, Effect, Principal, Statement, StringSet, POLICY_VERSION};
