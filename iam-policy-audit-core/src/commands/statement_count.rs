//! Inline policy statement counts per permission set

use crate::aws::sso_admin::{inline_policy, list_permission_sets, permission_set_name, resolve_instance};
use crate::error::AuditResult;
use crate::policy::extract_statements;
use crate::report::StatementCountRow;
use log::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementCountReport {
    pub rows: Vec<StatementCountRow>,
    pub total: usize,
}

impl StatementCountReport {
    /// Record one permission set; a missing inline policy counts as zero statements
    pub fn add(&mut self, permission_set_name: &str, policy: Option<&str>) -> AuditResult<()> {
        let statement_count = match policy {
            Some(policy) => extract_statements(policy)?.len(),
            None => 0,
        };
        info!(
            "Permission Set: {} -> {} statements",
            permission_set_name, statement_count
        );
        self.total += statement_count;
        self.rows.push(StatementCountRow {
            permission_set_name: permission_set_name.to_string(),
            statement_count,
        });
        Ok(())
    }
}

impl super::service::PolicyAuditService {
    /// Count inline policy statements of every permission set
    pub async fn statement_counts(&self, instance_arn: Option<&str>) -> AuditResult<StatementCountReport> {
        let instance_arn = resolve_instance(&self.sso_admin_client, instance_arn).await?;
        let permission_sets = list_permission_sets(&self.sso_admin_client, &instance_arn).await?;
        info!("Found {} permission sets", permission_sets.len());

        let mut report = StatementCountReport::default();
        for permission_set_arn in &permission_sets {
            let name =
                permission_set_name(&self.sso_admin_client, &instance_arn, permission_set_arn)
                    .await?;
            let policy =
                inline_policy(&self.sso_admin_client, &instance_arn, permission_set_arn).await?;
            report.add(&name, policy.as_deref())?;
        }

        Ok(report)
    }
}
