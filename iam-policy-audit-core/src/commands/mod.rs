//! Commands module - service layer for IAM Policy Audit operations

mod duplicate_policies;
mod duplicate_statements;
mod group_diff;
mod permission_set_search;
pub(crate) mod service;
mod statement_count;
mod users;

pub use duplicate_policies::DuplicatePoliciesReport;
pub use service::PolicyAuditService;
pub use statement_count::StatementCountReport;
