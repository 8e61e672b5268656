//! Normalized view of a policy statement used for pairwise comparison

use crate::duplicates::matchers::{actions_cover, resource_covers};
use crate::types::{Effect, StringOrList};
use serde::Deserialize;
use serde_json::Value;

/// Why a statement cannot take part in comparisons
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StatementError {
    /// Neither `Action` nor `NotAction` is present (or the list is empty)
    MissingAction,
    /// The statement does not fit the policy grammar
    Invalid(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawStatement {
    effect: Effect,
    action: Option<StringOrList>,
    not_action: Option<StringOrList>,
    resource: Option<StringOrList>,
    not_resource: Option<StringOrList>,
    condition: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    effect: Effect,
    actions: StringOrList,
    negated_action: bool,
    resources: StringOrList,
    negated_resource: bool,
    condition: Option<Value>,
}

impl Statement {
    pub(crate) fn from_value(value: &Value) -> Result<Self, StatementError> {
        let raw = RawStatement::deserialize(value)
            .map_err(|e| StatementError::Invalid(e.to_string()))?;

        let (actions, negated_action) = match (raw.action, raw.not_action) {
            (_, Some(not_action)) => (not_action, true),
            (Some(action), None) => (action, false),
            (None, None) => return Err(StatementError::MissingAction),
        };
        if actions.is_empty() {
            return Err(StatementError::MissingAction);
        }

        let (resources, negated_resource) = match (raw.resource, raw.not_resource) {
            (_, Some(not_resource)) => (not_resource, true),
            (Some(resource), None) => (resource, false),
            (None, None) => (StringOrList::from("*"), false),
        };

        // An empty condition block restricts nothing
        let condition = raw.condition.filter(|condition| match condition {
            Value::Object(fields) => !fields.is_empty(),
            _ => true,
        });

        Ok(Self {
            effect: raw.effect,
            actions,
            negated_action,
            resources,
            negated_resource,
            condition,
        })
    }

    /// Uses `NotAction` or `NotResource`, which the covering logic cannot reason about
    pub(crate) fn is_negated(&self) -> bool {
        self.negated_action || self.negated_resource
    }

    /// Structural equality with `Action`/`Resource` scalars treated as one-element lists
    pub(crate) fn is_identical_to(&self, other: &Self) -> bool {
        self.effect == other.effect
            && self.negated_action == other.negated_action
            && self.negated_resource == other.negated_resource
            && self.actions.as_slice() == other.actions.as_slice()
            && self.resources.as_slice() == other.resources.as_slice()
            && self.condition == other.condition
    }

    /// Same effect, one action set covers the other and one resource set covers
    /// the other. Each test may hold in either direction on its own; conditions
    /// are not compared.
    pub(crate) fn overlaps_by_wildcard(&self, other: &Self) -> bool {
        let (mine, theirs) = (self.actions.as_slice(), other.actions.as_slice());
        self.effect == other.effect
            && (actions_cover(mine, theirs) || actions_cover(theirs, mine))
            && (resource_covers(&self.resources, &other.resources)
                || resource_covers(&other.resources, &self.resources))
    }
}
