//! IAM policy JSON encoding.
//!
//! IAM accepts a bare value wherever a one-element list is allowed. Encoding always
//! collapses one-element lists (actions, resources, principal identifiers, condition
//! values) to the bare form so equal documents produce byte-identical text. Decoding
//! accepts both forms.

use super::PolicyDocument;
use crate::types::{Condition, Effect, Principal, Statement, StringSet};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A single value or a list of values. `Many` is tried first so an empty
/// array never decodes as a defaulted single value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl<T: From<String> + Into<String>> OneOrMany<T> {
    fn from_set(set: &StringSet) -> Self {
        match set.as_slice() {
            [single] => Self::One(T::from(single.clone())),
            values => Self::Many(values.iter().cloned().map(T::from).collect()),
        }
    }

    fn into_set(self) -> StringSet {
        self.into_vec().into_iter().collect()
    }
}

fn optional_set(set: &StringSet) -> Option<OneOrMany<String>> {
    (!set.is_empty()).then(|| OneOrMany::from_set(set))
}

fn set_or_empty(value: Option<OneOrMany<String>>) -> StringSet {
    value.map(OneOrMany::into_set).unwrap_or_default()
}

/// `Principal` / `NotPrincipal` value: `"*"` or `{type: identifiers}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum PrincipalBlock {
    Bare(String),
    Typed(BTreeMap<String, OneOrMany<String>>),
}

impl PrincipalBlock {
    fn from_principals(principals: &[Principal]) -> Option<Self> {
        match principals {
            [] => None,
            [single] if single.is_wildcard() => Some(Self::Bare("*".to_string())),
            _ => {
                // Principals sharing a type are folded into one identifier list
                let mut by_type: BTreeMap<String, StringSet> = BTreeMap::new();
                for principal in principals {
                    by_type
                        .entry(principal.principal_type.clone())
                        .or_default()
                        .extend(principal.identifiers.iter().cloned());
                }
                Some(Self::Typed(
                    by_type
                        .iter()
                        .map(|(kind, ids)| (kind.clone(), OneOrMany::from_set(ids)))
                        .collect(),
                ))
            }
        }
    }

    fn into_principals(self) -> Vec<Principal> {
        match self {
            Self::Bare(identifier) => vec![Principal::new(
                "AWS",
                std::iter::once(identifier).collect::<StringSet>(),
            )],
            Self::Typed(map) => map
                .into_iter()
                .map(|(kind, ids)| Principal::new(kind, ids.into_set()))
                .collect(),
        }
    }
}

/// One condition value. IAM also accepts JSON booleans and numbers here; they decode to
/// their text form and are always written back as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
struct ConditionValue(String);

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<ConditionValue> for String {
    fn from(value: ConditionValue) -> Self {
        value.0
    }
}

struct ConditionValueVisitor;

impl Visitor<'_> for ConditionValueVisitor {
    type Value = ConditionValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string, boolean or number condition value")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(ConditionValue(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(ConditionValue(value))
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(ConditionValue(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(ConditionValue(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(ConditionValue(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(ConditionValue(value.to_string()))
    }
}

impl<'de> Deserialize<'de> for ConditionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ConditionValueVisitor)
    }
}

/// `Condition` value: `{test: {variable: values}}`
type ConditionBlock = BTreeMap<String, BTreeMap<String, OneOrMany<ConditionValue>>>;

fn encode_conditions(conditions: &[Condition]) -> Option<ConditionBlock> {
    if conditions.is_empty() {
        return None;
    }
    // Entries sharing test and variable are folded into one value list
    let mut grouped: BTreeMap<&str, BTreeMap<&str, StringSet>> = BTreeMap::new();
    for condition in conditions {
        grouped
            .entry(condition.test.as_str())
            .or_default()
            .entry(condition.variable.as_str())
            .or_default()
            .extend(condition.values.iter().cloned());
    }
    Some(
        grouped
            .into_iter()
            .map(|(test, variables)| {
                (
                    test.to_string(),
                    variables
                        .into_iter()
                        .map(|(variable, values)| {
                            (variable.to_string(), OneOrMany::from_set(&values))
                        })
                        .collect(),
                )
            })
            .collect(),
    )
}

fn decode_conditions(block: Option<ConditionBlock>) -> Vec<Condition> {
    block
        .into_iter()
        .flatten()
        .flat_map(|(test, variables)| {
            variables.into_iter().map(move |(variable, values)| {
                Condition::new(test.clone(), variable, values.into_set())
            })
        })
        .collect()
}

/// Statement in IAM JSON field order
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StatementJson {
    #[serde(rename = "Sid", default, skip_serializing_if = "String::is_empty")]
    sid: String,
    #[serde(rename = "Effect", default)]
    effect: Effect,
    #[serde(rename = "Principal", default, skip_serializing_if = "Option::is_none")]
    principal: Option<PrincipalBlock>,
    #[serde(rename = "NotPrincipal", default, skip_serializing_if = "Option::is_none")]
    not_principal: Option<PrincipalBlock>,
    #[serde(rename = "Action", default, skip_serializing_if = "Option::is_none")]
    action: Option<OneOrMany<String>>,
    #[serde(rename = "NotAction", default, skip_serializing_if = "Option::is_none")]
    not_action: Option<OneOrMany<String>>,
    #[serde(rename = "Resource", default, skip_serializing_if = "Option::is_none")]
    resource: Option<OneOrMany<String>>,
    #[serde(rename = "NotResource", default, skip_serializing_if = "Option::is_none")]
    not_resource: Option<OneOrMany<String>>,
    #[serde(rename = "Condition", default, skip_serializing_if = "Option::is_none")]
    condition: Option<ConditionBlock>,
}

impl From<&Statement> for StatementJson {
    fn from(statement: &Statement) -> Self {
        Self {
            sid: statement.sid.clone(),
            effect: statement.effect,
            principal: PrincipalBlock::from_principals(&statement.principals),
            not_principal: PrincipalBlock::from_principals(&statement.not_principals),
            action: optional_set(&statement.actions),
            not_action: optional_set(&statement.not_actions),
            resource: optional_set(&statement.resources),
            not_resource: optional_set(&statement.not_resources),
            condition: encode_conditions(&statement.conditions),
        }
    }
}

impl From<StatementJson> for Statement {
    fn from(json: StatementJson) -> Self {
        Self {
            sid: json.sid,
            effect: json.effect,
            actions: set_or_empty(json.action),
            not_actions: set_or_empty(json.not_action),
            resources: set_or_empty(json.resource),
            not_resources: set_or_empty(json.not_resource),
            principals: json
                .principal
                .map(PrincipalBlock::into_principals)
                .unwrap_or_default(),
            not_principals: json
                .not_principal
                .map(PrincipalBlock::into_principals)
                .unwrap_or_default(),
            conditions: decode_conditions(json.condition),
        }
    }
}

/// Policy document in IAM JSON field order. `Statement` may be a single object on input.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentJson {
    #[serde(rename = "Version", default)]
    version: String,
    #[serde(rename = "Id", default, skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(rename = "Statement", default, deserialize_with = "statement_list")]
    statement: Vec<StatementJson>,
}

/// Decodes `Statement` as a list or a single object. Each form is decoded directly so a
/// bad statement reports its own error.
fn statement_list<'de, D>(deserializer: D) -> Result<Vec<StatementJson>, D::Error>
where
    D: Deserializer<'de>,
{
    let decoded: serde_json::Result<Vec<StatementJson>> = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items.into_iter().map(serde_json::from_value).collect(),
        single => serde_json::from_value(single).map(|statement| vec![statement]),
    };
    decoded.map_err(de::Error::custom)
}

impl Serialize for Statement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StatementJson::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Statement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StatementJson::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for PolicyDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DocumentJson {
            version: self.version.clone(),
            id: self.id.clone(),
            statement: self.statements.iter().map(StatementJson::from).collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PolicyDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = DocumentJson::deserialize(deserializer)?;
        Ok(Self {
            version: json.version,
            id: json.id,
            statements: json.statement.into_iter().map(Statement::from).collect(),
        })
    }
}
