//! This crate provides the core logic for IAM Policy Audit:
//! - Duplicate statement classification within one policy document
//! - Comparison of inline and managed policies across permission sets
//! - Diffs of IAM group policies against a permission set
//! - Keyword search over permission set policies and their assignments
//! - IAM and Identity Store user listings
//! - Read-only IAM / IAM Identity Center access and CSV reports
//!

mod aws;
pub mod commands;
pub mod comparison;
pub mod duplicates;
mod error;
pub mod policy;
pub mod report;
mod types;

// Re-exports for a small, focused public API
pub use aws::principal::PrincipalKind;
pub use aws::sso_admin::ManagedPolicyRef;
pub use aws::{AwsError, AwsSettings};
pub use commands::{DuplicatePoliciesReport, PolicyAuditService, StatementCountReport};
pub use comparison::PolicySearch;
pub use duplicates::matchers::{action_includes, actions_cover, resource_covers};
pub use duplicates::{
    find_duplicate_statements, find_duplicate_statements_with, DuplicateScan, ErrorPolicy,
    PairError, ScanOptions,
};
pub use error::{AuditError, AuditResult};
pub use types::{DuplicatePair, Effect, MatchType, StringOrList};
