//! Duplicate statement detection within a single policy document
//!
//! Every unordered pair of statements is classified once, in index order. The
//! first applicable classification wins:
//! 1. `NeedsManualCheck` when either statement uses `NotAction`/`NotResource`
//! 2. `ExactMatch` when the statements are structurally identical
//! 3. `WildcardMatch` when effects agree, one action set covers the other and
//!    one resource set covers the other (each in either direction)

pub mod matchers;
mod statement;

use crate::error::{AuditError, AuditResult};
use crate::policy::extract_statements;
use crate::types::{DuplicatePair, MatchType};
use log::{debug, error, warn};
use serde_json::Value;
use statement::{Statement, StatementError};
use std::collections::HashSet;

/// What to do when a statement pair cannot be compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Abort the document on the first failing pair
    #[default]
    FailFast,
    /// Record the failure and keep scanning the remaining pairs
    CollectAndContinue,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub error_policy: ErrorPolicy,
}

impl ScanOptions {
    pub fn new(error_policy: ErrorPolicy) -> Self {
        Self { error_policy }
    }
}

/// A statement pair that failed to compare under [`ErrorPolicy::CollectAndContinue`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairError {
    pub first_index: usize,
    pub second_index: usize,
    pub message: String,
}

/// Result of scanning one policy document
#[derive(Debug, Clone, Default)]
pub struct DuplicateScan {
    pub pairs: Vec<DuplicatePair>,
    pub errors: Vec<PairError>,
}

/// Find duplicate statements in a policy document, failing on the first pair
/// that cannot be compared.
///
/// Empty input yields no pairs. Invalid JSON is an error.
pub fn find_duplicate_statements(policy_json: &str) -> AuditResult<Vec<DuplicatePair>> {
    find_duplicate_statements_with(policy_json, &ScanOptions::default()).map(|scan| scan.pairs)
}

/// Find duplicate statements in a policy document using the given options
pub fn find_duplicate_statements_with(
    policy_json: &str,
    options: &ScanOptions,
) -> AuditResult<DuplicateScan> {
    let raw_statements = extract_statements(policy_json)?;
    classify_statements(&raw_statements, options)
}

/// Classify every unordered pair of already extracted statements
pub fn classify_statements(
    raw_statements: &[Value],
    options: &ScanOptions,
) -> AuditResult<DuplicateScan> {
    let statements: Vec<Result<Statement, StatementError>> = raw_statements
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let statement = Statement::from_value(raw);
            if let Err(StatementError::MissingAction) = statement {
                warn!(
                    "Statement {} has neither Action nor NotAction and will not be matched: {}",
                    index, raw
                );
            }
            statement
        })
        .collect();

    let mut scan = DuplicateScan::default();
    let mut compared: HashSet<(usize, usize)> = HashSet::new();

    for (i, first) in statements.iter().enumerate() {
        for (j, second) in statements.iter().enumerate().skip(i + 1) {
            if !compared.insert((i, j)) {
                continue;
            }

            match classify_pair(first, second) {
                Ok(Some(match_type)) => {
                    debug!("Statements {} and {} classified as {}", i, j, match_type);
                    scan.pairs.push(DuplicatePair {
                        match_type,
                        first_index: i,
                        second_index: j,
                        first: raw_statements[i].clone(),
                        second: raw_statements[j].clone(),
                    });
                }
                Ok(None) => {}
                Err(message) => {
                    error!(
                        "Failed to compare statements {} and {}: {}\n  first: {}\n  second: {}",
                        i, j, message, raw_statements[i], raw_statements[j]
                    );
                    match options.error_policy {
                        ErrorPolicy::FailFast => {
                            return Err(AuditError::StatementComparison {
                                first: i,
                                second: j,
                                message,
                            });
                        }
                        ErrorPolicy::CollectAndContinue => scan.errors.push(PairError {
                            first_index: i,
                            second_index: j,
                            message,
                        }),
                    }
                }
            }
        }
    }

    Ok(scan)
}

fn classify_pair(
    first: &Result<Statement, StatementError>,
    second: &Result<Statement, StatementError>,
) -> Result<Option<MatchType>, String> {
    let (first, second) = match (first, second) {
        (Ok(first), Ok(second)) => (first, second),
        (Err(StatementError::Invalid(message)), _) | (_, Err(StatementError::Invalid(message))) => {
            return Err(message.clone())
        }
        _ => return Ok(None),
    };

    if first.is_negated() || second.is_negated() {
        return Ok(Some(MatchType::NeedsManualCheck));
    }
    if first.is_identical_to(second) {
        return Ok(Some(MatchType::ExactMatch));
    }
    if first.overlaps_by_wildcard(second) {
        return Ok(Some(MatchType::WildcardMatch));
    }
    Ok(None)
}
