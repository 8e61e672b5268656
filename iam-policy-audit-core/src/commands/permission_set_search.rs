//! Permission sets whose policies match search keywords, with their assignments

use crate::aws::identity_store::principal_name;
use crate::aws::sso_admin::{
    describe_instance, inline_policy, list_account_assignments, list_permission_sets,
    list_provisioned_accounts, managed_policies, permission_set_name, IdentityCenterInstance,
    ManagedPolicyRef,
};
use crate::comparison::PolicySearch;
use crate::error::AuditResult;
use crate::report::PermissionSetAssignmentRow;
use log::{debug, info, warn};
use std::collections::HashMap;

/// An assignment with its principal resolved to a readable name
#[derive(Debug, Clone, PartialEq, Eq)]
struct NamedAssignment {
    account_id: String,
    principal_type: String,
    principal_name: String,
}

impl super::service::PolicyAuditService {
    /// Permission sets whose managed policies or inline policy match `search`,
    /// one row per matched keyword and account assignment
    pub async fn search_permission_sets(
        &self,
        instance_arn: Option<&str>,
        search: &PolicySearch,
    ) -> AuditResult<Vec<PermissionSetAssignmentRow>> {
        let instance = describe_instance(&self.sso_admin_client, instance_arn).await?;
        let permission_sets =
            list_permission_sets(&self.sso_admin_client, &instance.instance_arn).await?;
        info!("Searching {} permission sets", permission_sets.len());

        let mut principal_names = HashMap::new();
        let mut rows = Vec::new();
        for permission_set_arn in &permission_sets {
            let managed = managed_policies(
                &self.sso_admin_client,
                &instance.instance_arn,
                permission_set_arn,
            )
            .await?;
            let inline =
                inline_policy(&self.sso_admin_client, &instance.instance_arn, permission_set_arn)
                    .await?;

            let keywords = search.matches(&managed, inline.as_deref());
            if keywords.is_empty() {
                continue;
            }
            let name = permission_set_name(
                &self.sso_admin_client,
                &instance.instance_arn,
                permission_set_arn,
            )
            .await?;
            debug!("{} matched {:?}", name, keywords);

            let assignments = self
                .named_assignments(&instance, permission_set_arn, &mut principal_names)
                .await?;
            rows.extend(assignment_rows(
                &keywords,
                &name,
                permission_set_arn,
                &managed,
                inline.as_deref(),
                &assignments,
            ));
        }

        Ok(rows)
    }

    async fn named_assignments(
        &self,
        instance: &IdentityCenterInstance,
        permission_set_arn: &str,
        principal_names: &mut HashMap<String, String>,
    ) -> AuditResult<Vec<NamedAssignment>> {
        let mut named = Vec::new();
        for account_id in list_provisioned_accounts(
            &self.sso_admin_client,
            &instance.instance_arn,
            permission_set_arn,
        )
        .await?
        {
            for assignment in list_account_assignments(
                &self.sso_admin_client,
                &instance.instance_arn,
                permission_set_arn,
                &account_id,
            )
            .await?
            {
                let principal_type = assignment.principal_type.as_str().to_string();
                let principal_name = match principal_names.get(&assignment.principal_id) {
                    Some(name) => name.clone(),
                    None => {
                        let name = principal_name(
                            &self.identity_store_client,
                            &instance.identity_store_id,
                            &assignment.principal_type,
                            &assignment.principal_id,
                        )
                        .await
                        .unwrap_or_else(|e| {
                            warn!("{}", e);
                            format!("Unknown {principal_type} {}", assignment.principal_id)
                        });
                        principal_names.insert(assignment.principal_id.clone(), name.clone());
                        name
                    }
                };
                named.push(NamedAssignment {
                    account_id: assignment.account_id,
                    principal_type,
                    principal_name,
                });
            }
        }
        Ok(named)
    }
}

fn assignment_rows(
    keywords: &[String],
    permission_set_name: &str,
    permission_set_arn: &str,
    managed: &[ManagedPolicyRef],
    inline: Option<&str>,
    assignments: &[NamedAssignment],
) -> Vec<PermissionSetAssignmentRow> {
    let managed_policies = managed
        .iter()
        .map(|policy| policy.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let inline_policy = inline.unwrap_or("None").to_string();
    let row = |keyword: &String, assignment: Option<&NamedAssignment>| PermissionSetAssignmentRow {
        matched_keyword: keyword.clone(),
        permission_set_name: permission_set_name.to_string(),
        permission_set_arn: permission_set_arn.to_string(),
        managed_policies: managed_policies.clone(),
        inline_policy: inline_policy.clone(),
        principal_type: assignment.map(|a| a.principal_type.clone()).unwrap_or_default(),
        principal_name: assignment.map(|a| a.principal_name.clone()).unwrap_or_default(),
        account_id: assignment.map(|a| a.account_id.clone()).unwrap_or_default(),
    };

    if assignments.is_empty() {
        return keywords.iter().map(|keyword| row(keyword, None)).collect();
    }
    assignments
        .iter()
        .flat_map(|assignment| keywords.iter().map(move |keyword| row(keyword, Some(assignment))))
        .collect()
}
