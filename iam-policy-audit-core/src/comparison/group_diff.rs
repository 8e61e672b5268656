//! Diff of IAM group policies against an Identity Center permission set

use crate::error::AuditResult;
use crate::policy::{canonical_statement, extract_statements};
use std::collections::BTreeSet;
use std::fmt;

/// Managed policy ARNs and inline statements granted by one side of the diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyGrants {
    pub managed_policy_arns: BTreeSet<String>,
    /// Inline statements in canonical JSON form
    pub inline_statements: BTreeSet<String>,
}

impl PolicyGrants {
    pub fn add_managed_policy(&mut self, arn: impl Into<String>) {
        self.managed_policy_arns.insert(arn.into());
    }

    /// Add every statement of an inline policy document
    pub fn add_inline_policy(&mut self, policy_json: &str) -> AuditResult<()> {
        for statement in extract_statements(policy_json)? {
            self.inline_statements.insert(canonical_statement(&statement));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiffKind {
    Managed,
    Inline,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffKind::Managed => f.write_str("Managed"),
            DiffKind::Inline => f.write_str("Inline"),
        }
    }
}

/// A grant present on the groups but missing from the permission set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDiffEntry {
    pub kind: DiffKind,
    pub policy: String,
}

/// Everything the groups grant that the permission set does not, managed policies first
pub fn diff_group_policies(groups: &PolicyGrants, permission_set: &PolicyGrants) -> Vec<PolicyDiffEntry> {
    let managed = groups
        .managed_policy_arns
        .difference(&permission_set.managed_policy_arns)
        .map(|arn| PolicyDiffEntry {
            kind: DiffKind::Managed,
            policy: arn.clone(),
        });
    let inline = groups
        .inline_statements
        .difference(&permission_set.inline_statements)
        .map(|statement| PolicyDiffEntry {
            kind: DiffKind::Inline,
            policy: statement.clone(),
        });
    managed.chain(inline).collect()
}
