//! Error types for IAM Policy Audit

use crate::aws::AwsError;
use thiserror::Error;

/// Top-level error for audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    /// The policy text is not valid JSON or `Statement` has an unexpected shape
    #[error("Malformed policy document: {0}")]
    MalformedPolicy(String),

    /// A statement pair could not be compared
    #[error("Failed to compare statements {first} and {second}: {message}")]
    StatementComparison {
        first: usize,
        second: usize,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Aws(#[from] AwsError),

    #[error("Report error: {0}")]
    Report(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuditError {
    pub fn malformed_policy(message: impl Into<String>) -> Self {
        Self::MalformedPolicy(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn report(message: impl Into<String>) -> Self {
        Self::Report(message.into())
    }
}

impl From<csv::Error> for AuditError {
    fn from(e: csv::Error) -> Self {
        Self::Report(e.to_string())
    }
}

pub type AuditResult<T> = Result<T, AuditError>;
