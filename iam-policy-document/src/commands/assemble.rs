//! Document assembly for the policy document service

use crate::config::DocumentConfig;
use crate::document::PolicyDocument;
use crate::error::{DocumentSource, PolicyDocumentResult};
use crate::synthesis::build_statements;
use crate::types::POLICY_VERSION;
use log::{debug, info};

/// Canonical policy JSON and the identifier hashed from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPolicy {
    pub json: String,
    pub id: String,
}

impl super::service::PolicyDocumentService {
    /// Build the merged policy document.
    ///
    /// Precedence on a sid collision is override_json > statement declarations >
    /// source_json. Any error aborts the build.
    pub fn build_document(&self, config: &DocumentConfig) -> PolicyDocumentResult<PolicyDocument> {
        let mut merged = match non_empty(config.source_json.as_deref()) {
            Some(text) => {
                let base = PolicyDocument::from_json(text, DocumentSource::SourceJson)?;
                debug!(
                    "Parsed source_json with {} statements",
                    base.statements.len()
                );
                base
            }
            None => PolicyDocument::new(),
        };
        merged.version = POLICY_VERSION.to_string();

        let mut generated =
            PolicyDocument::new().with_statements(build_statements(&config.statement)?);
        if let Some(policy_id) = non_empty(config.policy_id.as_deref()) {
            generated.id = policy_id.to_string();
        }
        debug!(
            "Merging {} generated statements",
            generated.statements.len()
        );
        merged.merge(generated);

        if let Some(text) = non_empty(config.override_json.as_deref()) {
            let overrides = PolicyDocument::from_json(text, DocumentSource::OverrideJson)?;
            debug!(
                "Merging override_json with {} statements",
                overrides.statements.len()
            );
            merged.merge(overrides);
        }

        Ok(merged)
    }

    /// Build, serialize and hash the policy document
    pub fn assemble(&self, config: &DocumentConfig) -> PolicyDocumentResult<AssembledPolicy> {
        let document = self.build_document(config)?;
        let json = document.to_json_pretty()?;
        let id = self.hasher.hash(&json);
        info!(
            "Assembled policy document with {} statements (id {id})",
            document.statements.len()
        );
        Ok(AssembledPolicy { json, id })
    }
}

/// An empty string counts as not provided
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

/// Assemble a document with the default service
pub fn assemble(config: &DocumentConfig) -> PolicyDocumentResult<AssembledPolicy> {
    super::service::PolicyDocumentService::new().assemble(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::service::PolicyDocumentService;
    use crate::config::{PrincipalConfig, StatementConfig};
    use crate::error::PolicyDocumentError;
    use crate::hashing::{HashAlgorithm, PolicyHasher};
    use crate::types::Effect;
    use serde_json::{json, Value};

    fn declaration(sid: &str, effect: Effect) -> StatementConfig {
        StatementConfig {
            sid: Some(sid.to_string()),
            effect,
            actions: vec!["s3:GetObject".to_string()],
            ..StatementConfig::default()
        }
    }

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test_log::test]
    fn test_end_to_end_single_statement() {
        let config = DocumentConfig {
            source_json: Some("{}".to_string()),
            statement: vec![StatementConfig {
                effect: Effect::Allow,
                actions: vec!["s3:GetObject".to_string()],
                resources: vec!["arn:aws:s3:::b/*".to_string()],
                ..StatementConfig::default()
            }],
            ..DocumentConfig::default()
        };

        let first = assemble(&config).unwrap();
        assert_eq!(
            parse(&first.json),
            json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Action": "s3:GetObject",
                    "Resource": "arn:aws:s3:::b/*"
                }]
            })
        );

        let second = assemble(&config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reordered_statements_change_text() {
        let a = StatementConfig {
            actions: vec!["s3:GetObject".to_string()],
            ..StatementConfig::default()
        };
        let b = StatementConfig {
            actions: vec!["s3:PutObject".to_string()],
            ..StatementConfig::default()
        };
        let forward = DocumentConfig {
            statement: vec![a.clone(), b.clone()],
            ..DocumentConfig::default()
        };
        let backward = DocumentConfig {
            statement: vec![b, a],
            ..DocumentConfig::default()
        };

        let forward = assemble(&forward).unwrap();
        let backward = assemble(&backward).unwrap();
        assert_ne!(forward.json, backward.json);
        assert_ne!(forward.id, backward.id);
    }

    #[test]
    fn test_generated_beats_source() {
        let config = DocumentConfig {
            source_json: Some(
                r#"{"Statement": [{"Sid": "S1", "Effect": "Allow", "Action": "s3:GetObject"}]}"#
                    .to_string(),
            ),
            statement: vec![declaration("S1", Effect::Deny)],
            ..DocumentConfig::default()
        };
        let doc = PolicyDocumentService::new().build_document(&config).unwrap();
        assert_eq!(doc.statements.len(), 1);
        assert_eq!(doc.statements[0].effect, Effect::Deny);
    }

    #[test]
    fn test_override_beats_generated() {
        let config = DocumentConfig {
            source_json: Some(
                r#"{"Statement": [{"Sid": "S1", "Effect": "Allow", "Action": "s3:GetObject"}]}"#
                    .to_string(),
            ),
            statement: vec![declaration("S1", Effect::Deny)],
            override_json: Some(
                r#"{"Statement": [{"Sid": "S1", "Effect": "Allow", "Action": "s3:GetObject"}]}"#
                    .to_string(),
            ),
            ..DocumentConfig::default()
        };
        let doc = PolicyDocumentService::new().build_document(&config).unwrap();
        assert_eq!(doc.statements.len(), 1);
        assert_eq!(doc.statements[0].effect, Effect::Allow);
    }

    #[test]
    fn test_override_without_statements_keeps_generated() {
        let config = DocumentConfig {
            source_json: Some(r#"{"Statement": [{"Sid": "S1", "Effect": "Allow"}]}"#.to_string()),
            statement: vec![declaration("S1", Effect::Deny)],
            override_json: Some("{}".to_string()),
            ..DocumentConfig::default()
        };
        let doc = PolicyDocumentService::new().build_document(&config).unwrap();
        assert_eq!(doc.statement_by_sid("S1").map(|s| s.effect), Some(Effect::Deny));
    }

    #[test]
    fn test_merge_order_across_sources() {
        let config = DocumentConfig {
            source_json: Some(
                r#"{"Statement": [{"Sid": "A"}, {"Sid": "B"}, {"Effect": "Deny"}]}"#.to_string(),
            ),
            statement: vec![declaration("C", Effect::Allow), declaration("B", Effect::Deny)],
            override_json: Some(
                r#"{"Statement": [{"Sid": "D"}, {"Sid": "A", "Effect": "Deny"}]}"#.to_string(),
            ),
            ..DocumentConfig::default()
        };
        let doc = PolicyDocumentService::new().build_document(&config).unwrap();
        let sids: Vec<_> = doc.statements.iter().map(|s| s.sid.as_str()).collect();
        assert_eq!(sids, vec!["A", "B", "", "C", "D"]);
        assert_eq!(doc.statements[0].effect, Effect::Deny);
        assert_eq!(doc.statements[1].effect, Effect::Deny);
    }

    #[test]
    fn test_policy_id_precedence() {
        let mut config = DocumentConfig {
            source_json: Some(r#"{"Id": "FromSource"}"#.to_string()),
            ..DocumentConfig::default()
        };
        let service = PolicyDocumentService::new();
        assert_eq!(service.build_document(&config).unwrap().id, "FromSource");

        config.policy_id = Some("FromConfig".to_string());
        assert_eq!(service.build_document(&config).unwrap().id, "FromConfig");

        config.override_json = Some(r#"{"Id": "FromOverride"}"#.to_string());
        assert_eq!(service.build_document(&config).unwrap().id, "FromOverride");
    }

    #[test]
    fn test_version_is_pinned() {
        let config = DocumentConfig {
            source_json: Some(r#"{"Version": "2008-10-17"}"#.to_string()),
            override_json: Some(r#"{"Version": "2008-10-17"}"#.to_string()),
            ..DocumentConfig::default()
        };
        let policy = assemble(&config).unwrap();
        assert_eq!(parse(&policy.json)["Version"], json!("2012-10-17"));
    }

    #[test]
    fn test_empty_config_produces_empty_statement_list() {
        let policy = assemble(&DocumentConfig::default()).unwrap();
        assert_eq!(
            parse(&policy.json),
            json!({"Version": "2012-10-17", "Statement": []})
        );
    }

    #[test]
    fn test_duplicate_sid_aborts_build() {
        let config = DocumentConfig {
            statement: vec![declaration("S1", Effect::Allow), declaration("S1", Effect::Deny)],
            ..DocumentConfig::default()
        };
        let err = assemble(&config).unwrap_err();
        assert!(matches!(err, PolicyDocumentError::DuplicateSid(ref sid) if sid == "S1"));
    }

    #[test]
    fn test_source_duplicates_are_not_checked() {
        let config = DocumentConfig {
            source_json: Some(r#"{"Statement": [{"Sid": "S1"}, {"Sid": "S1"}]}"#.to_string()),
            statement: vec![declaration("S1", Effect::Deny)],
            ..DocumentConfig::default()
        };
        let doc = PolicyDocumentService::new().build_document(&config).unwrap();
        assert_eq!(doc.statements.len(), 2);
        assert_eq!(doc.statements[0].effect, Effect::Deny);
        assert_eq!(doc.statements[1].effect, Effect::Allow);
    }

    #[test]
    fn test_empty_source_and_override_are_ignored() {
        let config = DocumentConfig {
            source_json: Some(String::new()),
            policy_id: Some(String::new()),
            statement: vec![StatementConfig {
                actions: vec!["s3:GetObject".to_string()],
                ..StatementConfig::default()
            }],
            override_json: Some(String::new()),
        };
        let policy = assemble(&config).unwrap();
        assert_eq!(
            parse(&policy.json),
            json!({
                "Version": "2012-10-17",
                "Statement": [{"Effect": "Allow", "Action": "s3:GetObject"}]
            })
        );
    }

    #[test]
    fn test_malformed_source_json() {
        let config = DocumentConfig {
            source_json: Some("{".to_string()),
            ..DocumentConfig::default()
        };
        let err = assemble(&config).unwrap_err();
        assert!(err.to_string().contains("source_json"));
    }

    #[test]
    fn test_malformed_override_json() {
        let config = DocumentConfig {
            override_json: Some(r#"{"Statement": [{"Effect": "Perhaps"}]}"#.to_string()),
            ..DocumentConfig::default()
        };
        let err = assemble(&config).unwrap_err();
        assert!(err.to_string().contains("override_json"));
    }

    #[test]
    fn test_principal_substitution_end_to_end() {
        let config = DocumentConfig {
            statement: vec![StatementConfig {
                actions: vec!["sts:AssumeRole".to_string()],
                principals: vec![PrincipalConfig {
                    principal_type: "AWS".to_string(),
                    identifiers: vec!["arn:aws:iam::&{aws:PrincipalAccount}:root".to_string()],
                }],
                ..StatementConfig::default()
            }],
            ..DocumentConfig::default()
        };
        let policy = assemble(&config).unwrap();
        assert_eq!(
            parse(&policy.json)["Statement"][0]["Principal"],
            json!({"AWS": "arn:aws:iam::${aws:PrincipalAccount}:root"})
        );
    }

    #[test]
    fn test_custom_hasher() {
        struct LengthHasher;
        impl PolicyHasher for LengthHasher {
            fn hash(&self, text: &str) -> String {
                text.len().to_string()
            }
        }

        let service = PolicyDocumentService::with_hasher(LengthHasher);
        let policy = service.assemble(&DocumentConfig::default()).unwrap();
        assert_eq!(policy.id, policy.json.len().to_string());
    }

    #[test]
    fn test_sha256_identifier() {
        let service = PolicyDocumentService::with_algorithm(HashAlgorithm::Sha256);
        let policy = service.assemble(&DocumentConfig::default()).unwrap();
        assert_eq!(policy.id.len(), 64);
        assert!(policy.id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
