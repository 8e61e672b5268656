//! Core types shared across the audit library

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A policy field that IAM accepts either as a single string or as a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    Single(String),
    List(Vec<String>),
}

impl StringOrList {
    /// View the values as a slice regardless of shape
    pub fn as_slice(&self) -> &[String] {
        match self {
            StringOrList::Single(value) => std::slice::from_ref(value),
            StringOrList::List(values) => values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<&str> for StringOrList {
    fn from(value: &str) -> Self {
        StringOrList::Single(value.to_string())
    }
}

impl From<Vec<&str>> for StringOrList {
    fn from(values: Vec<&str>) -> Self {
        StringOrList::List(values.into_iter().map(str::to_string).collect())
    }
}

/// Statement effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// How two statements of one policy duplicate each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    /// Identical over Effect, Action, Resource and Condition
    ExactMatch,
    /// One statement's actions and resources cover the other's
    WildcardMatch,
    /// A negated element (`NotAction`/`NotResource`) is involved; a human has to decide
    NeedsManualCheck,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::ExactMatch => "ExactMatch",
            MatchType::WildcardMatch => "WildcardMatch",
            MatchType::NeedsManualCheck => "NeedsManualCheck",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pair of statements from one policy document classified as duplicates.
///
/// Both statements are kept in their original JSON form so callers can
/// serialize them verbatim into a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DuplicatePair {
    pub match_type: MatchType,
    pub first_index: usize,
    pub second_index: usize,
    pub first: Value,
    pub second: Value,
}
