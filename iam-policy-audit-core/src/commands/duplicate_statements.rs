//! Duplicate statement scans over permission set and IAM principal inline policies

use crate::aws::iam_client::{get_inline_policy, list_inline_policies, list_principals};
use crate::aws::principal::PrincipalKind;
use crate::aws::sso_admin::{inline_policy, list_permission_sets, permission_set_name, resolve_instance};
use crate::aws::sts::caller_account_id;
use crate::duplicates::{find_duplicate_statements_with, ErrorPolicy, ScanOptions};
use crate::error::{AuditError, AuditResult};
use crate::report::{IamStatementDuplicateRow, StatementDuplicateRow};
use crate::types::DuplicatePair;
use log::{info, warn};

impl super::service::PolicyAuditService {
    /// Classify duplicate statements in the inline policy of every permission set
    pub async fn duplicate_statements(
        &self,
        instance_arn: Option<&str>,
        options: &ScanOptions,
    ) -> AuditResult<Vec<StatementDuplicateRow>> {
        let instance_arn = resolve_instance(&self.sso_admin_client, instance_arn).await?;
        let permission_sets = list_permission_sets(&self.sso_admin_client, &instance_arn).await?;
        info!("Found {} permission sets", permission_sets.len());

        let mut rows = Vec::new();
        for permission_set_arn in &permission_sets {
            let Some(policy) =
                inline_policy(&self.sso_admin_client, &instance_arn, permission_set_arn).await?
            else {
                continue;
            };
            let name =
                permission_set_name(&self.sso_admin_client, &instance_arn, permission_set_arn)
                    .await?;

            let pairs = scan_policy(&name, &policy, options)?;
            rows.extend(pairs.iter().map(|pair| StatementDuplicateRow::new(&name, pair)));
        }

        Ok(rows)
    }

    /// Classify duplicate statements in every inline policy of the given IAM principal kinds
    pub async fn iam_duplicate_statements(
        &self,
        kinds: &[PrincipalKind],
        options: &ScanOptions,
    ) -> AuditResult<Vec<IamStatementDuplicateRow>> {
        let account_id = caller_account_id(&self.sts_client).await?;
        let mut rows = Vec::new();

        for &kind in kinds {
            let principals = list_principals(&self.iam_client, kind).await?;
            info!("Found {} IAM {} principals in {}", principals.len(), kind, account_id);

            for principal in &principals {
                for policy_name in list_inline_policies(&self.iam_client, kind, principal).await? {
                    let policy =
                        get_inline_policy(&self.iam_client, kind, principal, &policy_name).await?;
                    let label = format!("{kind} {principal} / {policy_name}");

                    for pair in scan_policy(&label, &policy, options)? {
                        rows.push(IamStatementDuplicateRow {
                            account_id: account_id.clone(),
                            principal_type: kind.to_string(),
                            principal_name: principal.clone(),
                            policy_name: policy_name.clone(),
                            match_type: pair.match_type,
                            duplicate_statement1: pair.first.to_string(),
                            duplicate_statement2: pair.second.to_string(),
                        });
                    }
                }
            }
        }

        Ok(rows)
    }
}

/// Run the classifier over one policy, honouring the error policy for malformed documents too
pub(crate) fn scan_policy(
    label: &str,
    policy: &str,
    options: &ScanOptions,
) -> AuditResult<Vec<DuplicatePair>> {
    match find_duplicate_statements_with(policy, options) {
        Ok(scan) => {
            for error in &scan.errors {
                warn!(
                    "{}: statements {} and {} were not compared: {}",
                    label, error.first_index, error.second_index, error.message
                );
            }
            Ok(scan.pairs)
        }
        Err(e @ AuditError::MalformedPolicy(_))
            if options.error_policy == ErrorPolicy::CollectAndContinue =>
        {
            warn!("{}: skipping policy: {}", label, e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}
