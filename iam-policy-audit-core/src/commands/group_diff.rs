//! Diff of IAM group policies against a permission set

use crate::aws::iam_client::{get_inline_policy, list_attached_group_policies, list_inline_policies};
use crate::aws::principal::PrincipalKind;
use crate::aws::sso_admin::{
    inline_policy, list_permission_sets, managed_policies, permission_set_name, resolve_instance,
};
use crate::comparison::{diff_group_policies, PolicyDiffEntry, PolicyGrants};
use crate::error::{AuditError, AuditResult};
use log::{debug, info};

impl super::service::PolicyAuditService {
    /// Policies granted to the IAM groups that the named permission set lacks
    pub async fn group_diff(
        &self,
        instance_arn: Option<&str>,
        groups: &[String],
        permission_set: &str,
    ) -> AuditResult<Vec<PolicyDiffEntry>> {
        let group_grants = self.group_grants(groups).await?;

        let instance_arn = resolve_instance(&self.sso_admin_client, instance_arn).await?;
        let permission_set_arn = self
            .find_permission_set(&instance_arn, permission_set)
            .await?
            .ok_or_else(|| {
                AuditError::not_found(format!("Permission set '{permission_set}' not found"))
            })?;

        let mut permission_set_grants = PolicyGrants::default();
        for policy in
            managed_policies(&self.sso_admin_client, &instance_arn, &permission_set_arn).await?
        {
            debug!("{} has managed policy {}", permission_set, policy.name);
            permission_set_grants.add_managed_policy(policy.arn);
        }
        if let Some(policy) =
            inline_policy(&self.sso_admin_client, &instance_arn, &permission_set_arn).await?
        {
            permission_set_grants.add_inline_policy(&policy)?;
        }

        let diff = diff_group_policies(&group_grants, &permission_set_grants);
        info!(
            "{} policies granted to {:?} are missing from '{}'",
            diff.len(),
            groups,
            permission_set
        );
        Ok(diff)
    }

    async fn group_grants(&self, groups: &[String]) -> AuditResult<PolicyGrants> {
        let mut grants = PolicyGrants::default();
        for group in groups {
            for arn in list_attached_group_policies(&self.iam_client, group).await? {
                grants.add_managed_policy(arn);
            }
            for policy_name in
                list_inline_policies(&self.iam_client, PrincipalKind::Group, group).await?
            {
                let policy =
                    get_inline_policy(&self.iam_client, PrincipalKind::Group, group, &policy_name)
                        .await?;
                grants.add_inline_policy(&policy)?;
            }
        }
        Ok(grants)
    }

    async fn find_permission_set(
        &self,
        instance_arn: &str,
        name: &str,
    ) -> AuditResult<Option<String>> {
        for permission_set_arn in list_permission_sets(&self.sso_admin_client, instance_arn).await? {
            if permission_set_name(&self.sso_admin_client, instance_arn, &permission_set_arn).await?
                == name
            {
                return Ok(Some(permission_set_arn));
            }
        }
        Ok(None)
    }
}
