//! Statement normalization: typed declarations into canonical policy records

use crate::config::{ConditionConfig, PrincipalConfig, StatementConfig};
use crate::error::{PolicyDocumentError, PolicyDocumentResult};
use crate::synthesis::variables::replace_vars_in_list;
use crate::types::{Condition, Principal, Statement, StringSet};
use log::{debug, trace};
use std::collections::HashSet;

/// Sids registered while normalizing the statements of one document
#[derive(Debug, Default)]
pub struct SidTracker {
    seen: HashSet<String>,
}

impl SidTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sid. Empty sids are exempt from uniqueness.
    pub fn register(&mut self, sid: &str) -> PolicyDocumentResult<()> {
        if sid.is_empty() {
            return Ok(());
        }
        if !self.seen.insert(sid.to_string()) {
            return Err(PolicyDocumentError::duplicate_sid(sid));
        }
        Ok(())
    }
}

/// Normalize one declaration, registering its sid with `tracker`.
///
/// Resources, principal identifiers and condition values get `&{` substitution;
/// action names are copied verbatim.
pub fn build_statement(
    config: &StatementConfig,
    tracker: &mut SidTracker,
) -> PolicyDocumentResult<Statement> {
    let sid = config.sid.clone().unwrap_or_default();
    tracker.register(&sid)?;

    let statement = Statement {
        sid,
        effect: config.effect,
        actions: config.actions.iter().cloned().collect(),
        not_actions: config.not_actions.iter().cloned().collect(),
        resources: replace_vars_in_list(&config.resources).into_iter().collect(),
        not_resources: replace_vars_in_list(&config.not_resources)
            .into_iter()
            .collect(),
        principals: build_principals(&config.principals),
        not_principals: build_principals(&config.not_principals),
        conditions: build_conditions(&config.condition),
    };

    trace!(
        "Normalized statement sid={:?} effect={}",
        statement.sid,
        statement.effect.as_str()
    );
    Ok(statement)
}

/// Normalize a batch of declarations in order with one shared sid tracker.
/// The first duplicate sid fails the whole batch.
pub fn build_statements(configs: &[StatementConfig]) -> PolicyDocumentResult<Vec<Statement>> {
    let mut tracker = SidTracker::new();
    let statements = configs
        .iter()
        .map(|config| build_statement(config, &mut tracker))
        .collect::<PolicyDocumentResult<Vec<_>>>()?;
    debug!("Normalized {} statement declarations", statements.len());
    Ok(statements)
}

#[must_use]
pub fn build_principals(configs: &[PrincipalConfig]) -> Vec<Principal> {
    configs
        .iter()
        .map(|config| {
            Principal::new(
                config.principal_type.clone(),
                replace_vars_in_list(&config.identifiers)
                    .into_iter()
                    .collect::<StringSet>(),
            )
        })
        .collect()
}

#[must_use]
pub fn build_conditions(configs: &[ConditionConfig]) -> Vec<Condition> {
    configs
        .iter()
        .map(|config| {
            Condition::new(
                config.test.clone(),
                config.variable.clone(),
                replace_vars_in_list(&config.values)
                    .into_iter()
                    .collect::<StringSet>(),
            )
        })
        .collect()
}
