//! CSV report rows and writers

use crate::aws::iam_client::IamUser;
use crate::aws::identity_store::IdentityStoreUser;
use crate::comparison::{PolicyDiffEntry, PolicyMatch, SharedManagedPolicy};
use crate::error::{AuditError, AuditResult};
use crate::types::{DuplicatePair, MatchType};
use log::info;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Duplicate statement pair found in a permission set's inline policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatementDuplicateRow {
    pub permission_set_name: String,
    pub match_type: MatchType,
    pub duplicate_statement1: String,
    pub duplicate_statement2: String,
}

impl StatementDuplicateRow {
    pub fn new(permission_set_name: &str, pair: &DuplicatePair) -> Self {
        Self {
            permission_set_name: permission_set_name.to_string(),
            match_type: pair.match_type,
            duplicate_statement1: pair.first.to_string(),
            duplicate_statement2: pair.second.to_string(),
        }
    }
}

/// Duplicate statement pair found in an IAM principal's inline policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamStatementDuplicateRow {
    pub account_id: String,
    pub principal_type: String,
    pub principal_name: String,
    pub policy_name: String,
    pub match_type: MatchType,
    pub duplicate_statement1: String,
    pub duplicate_statement2: String,
}

/// Duplicate pair of a standalone policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DuplicatePairRow {
    pub match_type: MatchType,
    pub first_index: usize,
    pub second_index: usize,
    pub statement_a: String,
    pub statement_b: String,
}

impl From<&DuplicatePair> for DuplicatePairRow {
    fn from(pair: &DuplicatePair) -> Self {
        Self {
            match_type: pair.match_type,
            first_index: pair.first_index,
            second_index: pair.second_index,
            statement_a: pair.first.to_string(),
            statement_b: pair.second.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyMatchRow {
    pub match_type: String,
    pub policy_hash: String,
    pub permission_sets: String,
    pub policy_content: String,
}

impl From<&PolicyMatch> for PolicyMatchRow {
    fn from(policy_match: &PolicyMatch) -> Self {
        Self {
            match_type: policy_match.match_type.as_str().to_string(),
            policy_hash: policy_match.policy_hash.clone(),
            permission_sets: policy_match.permission_sets.join(", "),
            policy_content: policy_match.policy_content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SharedManagedPolicyRow {
    pub managed_policy_arn: String,
    pub permission_sets: String,
}

impl From<&SharedManagedPolicy> for SharedManagedPolicyRow {
    fn from(shared: &SharedManagedPolicy) -> Self {
        Self {
            managed_policy_arn: shared.managed_policy_arn.clone(),
            permission_sets: shared.permission_sets.join(", "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatementCountRow {
    pub permission_set_name: String,
    pub statement_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDiffRow {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Policy")]
    pub policy: String,
}

impl From<&PolicyDiffEntry> for PolicyDiffRow {
    fn from(entry: &PolicyDiffEntry) -> Self {
        Self {
            kind: entry.kind.to_string(),
            policy: entry.policy.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamUserRow {
    pub account_id: String,
    pub user_name: String,
    /// UTC, `%Y-%m-%dT%H:%M:%S`
    pub create_date: String,
}

impl IamUserRow {
    pub(crate) fn new(account_id: &str, user: &IamUser) -> Self {
        Self {
            account_id: account_id.to_string(),
            user_name: user.user_name.clone(),
            create_date: user.create_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityStoreUserRow {
    pub user_name: String,
    pub display_name: String,
    pub manual: bool,
}

impl From<IdentityStoreUser> for IdentityStoreUserRow {
    fn from(user: IdentityStoreUser) -> Self {
        Self {
            user_name: user.user_name,
            display_name: user.display_name,
            manual: user.manual,
        }
    }
}

/// A permission set matched by a keyword search, one row per assignment.
/// The principal columns are empty when the permission set has no assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PermissionSetAssignmentRow {
    pub matched_keyword: String,
    pub permission_set_name: String,
    pub permission_set_arn: String,
    pub managed_policies: String,
    pub inline_policy: String,
    pub principal_type: String,
    pub principal_name: String,
    pub account_id: String,
}

/// Serialize rows as CSV with a header row taken from the row type's field names
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> AuditResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Dated report file name: `<prefix>_<YYYY-MM-DD>.csv`
pub fn report_file_name(prefix: &str) -> String {
    format!("{}_{}.csv", prefix, chrono::Utc::now().format("%Y-%m-%d"))
}

/// Write rows to `<dir>/<prefix>_<date>.csv`, creating the directory if needed
pub fn write_report<T: Serialize>(dir: &Path, prefix: &str, rows: &[T]) -> AuditResult<PathBuf> {
    if prefix.is_empty() {
        return Err(AuditError::report("report prefix must not be empty"));
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(prefix));
    let file = std::fs::File::create(&path)?;
    write_rows(file, rows)?;
    info!("Saved {} rows to {}", rows.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::DiffKind;
    use serde_json::json;

    fn sample_pair() -> DuplicatePair {
        DuplicatePair {
            match_type: MatchType::ExactMatch,
            first_index: 0,
            second_index: 1,
            first: json!({"Effect": "Allow", "Action": "s3:GetObject", "Resource": "*"}),
            second: json!({"Effect": "Allow", "Action": "s3:GetObject", "Resource": "*"}),
        }
    }

    #[test]
    fn test_write_rows_includes_header_and_json_columns() {
        let rows = vec![StatementDuplicateRow::new("pset-111", &sample_pair())];
        let mut out = Vec::new();
        write_rows(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("PermissionSetName,MatchType,DuplicateStatement1,DuplicateStatement2")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("pset-111,ExactMatch,"));
        assert!(row.contains(r#""{""Action"":""s3:GetObject"""#));
    }

    #[test]
    fn test_statement_rows_keep_statements_as_written() {
        let mut pair = sample_pair();
        pair.first = json!({"Sid": "ReadObjects", "Effect": "Allow", "Action": ["s3:GetObject"]});
        let row = StatementDuplicateRow::new("pset-111", &pair);
        let written: serde_json::Value = serde_json::from_str(&row.duplicate_statement1).unwrap();
        assert_eq!(written, pair.first);
        assert!(!row.duplicate_statement1.contains('\n'));
    }

    #[test]
    fn test_iam_user_row_formats_create_date() {
        let user = IamUser {
            user_name: "alice".to_string(),
            create_date: chrono::DateTime::from_timestamp(1_614_834_367, 0).unwrap(),
        };
        let row = IamUserRow::new("123456789012", &user);
        let mut out = Vec::new();
        write_rows(&mut out, &[row]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "AccountId,UserName,CreateDate\n123456789012,alice,2021-03-04T05:06:07\n"
        );
    }

    #[test]
    fn test_identity_store_user_row_headers() {
        let row = IdentityStoreUserRow::from(IdentityStoreUser {
            user_name: "bob@example.com".to_string(),
            display_name: "Bob".to_string(),
            manual: true,
        });
        let mut out = Vec::new();
        write_rows(&mut out, &[row]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "UserName,DisplayName,Manual\nbob@example.com,Bob,true\n"
        );
    }

    #[test]
    fn test_policy_diff_row_headers() {
        let rows = vec![PolicyDiffRow::from(&PolicyDiffEntry {
            kind: DiffKind::Managed,
            policy: "arn:aws:iam::aws:policy/ReadOnlyAccess".to_string(),
        })];
        let mut out = Vec::new();
        write_rows(&mut out, &rows).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Type,Policy\nManaged,arn:aws:iam::aws:policy/ReadOnlyAccess\n"
        );
    }

    #[test]
    fn test_write_report_creates_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("outputs");
        let rows = vec![StatementCountRow {
            permission_set_name: "ReadOnly".to_string(),
            statement_count: 3,
        }];

        let path = write_report(&output_dir, "inline_policy_statements_count", &rows).unwrap();

        assert_eq!(path.parent(), Some(output_dir.as_path()));
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("inline_policy_statements_count_"));
        assert!(file_name.ends_with(".csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "PermissionSetName,StatementCount\nReadOnly,3\n");
    }

    #[test]
    fn test_write_report_rejects_empty_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let rows: Vec<StatementCountRow> = Vec::new();
        assert!(matches!(
            write_report(dir.path(), "", &rows),
            Err(AuditError::Report(_))
        ));
    }
}
