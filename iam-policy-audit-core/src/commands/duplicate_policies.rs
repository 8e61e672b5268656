//! Duplicate inline and managed policies across permission sets

use crate::aws::sso_admin::{
    inline_policy, list_permission_sets, managed_policies, permission_set_name, resolve_instance,
};
use crate::comparison::{
    detect_full_matches, detect_partial_matches, detect_shared_managed_policies, PolicyMatch,
    PolicySource, SharedManagedPolicy,
};
use crate::error::AuditResult;
use log::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicatePoliciesReport {
    /// Full matches first, then partial matches
    pub inline_matches: Vec<PolicyMatch>,
    pub shared_managed_policies: Vec<SharedManagedPolicy>,
}

impl DuplicatePoliciesReport {
    /// Compare already collected inline policies and managed policy attachments
    pub fn build(sources: &[PolicySource], attachments: &[(String, Vec<String>)]) -> Self {
        let (mut inline_matches, full_match_pairs) = detect_full_matches(sources);
        inline_matches.extend(detect_partial_matches(sources, &full_match_pairs));

        Self {
            inline_matches,
            shared_managed_policies: detect_shared_managed_policies(attachments),
        }
    }
}

impl super::service::PolicyAuditService {
    /// Find permission sets sharing inline policies, statements or managed policies
    pub async fn duplicate_policies(
        &self,
        instance_arn: Option<&str>,
    ) -> AuditResult<DuplicatePoliciesReport> {
        let instance_arn = resolve_instance(&self.sso_admin_client, instance_arn).await?;
        let permission_sets = list_permission_sets(&self.sso_admin_client, &instance_arn).await?;
        info!("Comparing policies of {} permission sets", permission_sets.len());

        let mut sources = Vec::new();
        let mut attachments = Vec::new();
        for permission_set_arn in &permission_sets {
            let name =
                permission_set_name(&self.sso_admin_client, &instance_arn, permission_set_arn)
                    .await?;

            if let Some(policy) =
                inline_policy(&self.sso_admin_client, &instance_arn, permission_set_arn).await?
            {
                sources.push(PolicySource::new(name.clone(), policy));
            }

            let managed =
                managed_policies(&self.sso_admin_client, &instance_arn, permission_set_arn)
                    .await?;
            for policy in &managed {
                debug!("{} has managed policy {} ({})", name, policy.name, policy.arn);
            }
            attachments.push((name, managed.into_iter().map(|policy| policy.arn).collect()));
        }

        Ok(DuplicatePoliciesReport::build(&sources, &attachments))
    }
}
