//! IAM Identity Center (SSO admin) read operations

use crate::aws::{AwsError, AwsResult};
use aws_sdk_ssoadmin::types::PrincipalType;
use aws_sdk_ssoadmin::Client as SsoAdminClient;
use log::debug;

/// A managed policy attached to a permission set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPolicyRef {
    pub arn: String,
    pub name: String,
}

/// An IAM Identity Center instance and the identity store behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IdentityCenterInstance {
    pub(crate) instance_arn: String,
    pub(crate) identity_store_id: String,
}

/// One principal assigned to a permission set in one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AccountAssignment {
    pub(crate) account_id: String,
    pub(crate) principal_type: PrincipalType,
    pub(crate) principal_id: String,
}

/// Use the explicit instance ARN, or the first instance visible to the caller
pub(crate) async fn resolve_instance(
    client: &SsoAdminClient,
    explicit: Option<&str>,
) -> AwsResult<String> {
    if let Some(instance_arn) = explicit {
        return Ok(instance_arn.to_string());
    }

    let response = client
        .list_instances()
        .send()
        .await
        .map_err(|e| AwsError::SsoAdminError(format!("Failed to list instances: {e}")))?;

    let instance_arn = response
        .instances()
        .iter()
        .find_map(|instance| instance.instance_arn())
        .map(str::to_string)
        .ok_or_else(|| {
            AwsError::SsoAdminError("No IAM Identity Center instance found".to_string())
        })?;
    debug!("Using Identity Center instance {}", instance_arn);
    Ok(instance_arn)
}

/// Like [`resolve_instance`], but also looks up the identity store ID
pub(crate) async fn describe_instance(
    client: &SsoAdminClient,
    explicit: Option<&str>,
) -> AwsResult<IdentityCenterInstance> {
    let response = client
        .list_instances()
        .send()
        .await
        .map_err(|e| AwsError::SsoAdminError(format!("Failed to list instances: {e}")))?;

    let instance = response
        .instances()
        .iter()
        .find(|instance| explicit.is_none_or(|arn| instance.instance_arn() == Some(arn)))
        .ok_or_else(|| match explicit {
            Some(arn) => AwsError::SsoAdminError(format!("Instance '{arn}' not found")),
            None => AwsError::SsoAdminError("No IAM Identity Center instance found".to_string()),
        })?;

    match (instance.instance_arn(), instance.identity_store_id()) {
        (Some(instance_arn), Some(identity_store_id)) => Ok(IdentityCenterInstance {
            instance_arn: instance_arn.to_string(),
            identity_store_id: identity_store_id.to_string(),
        }),
        _ => Err(AwsError::SsoAdminError(
            "Instance has no ARN or identity store ID".to_string(),
        )),
    }
}

/// All permission set ARNs of an instance
pub(crate) async fn list_permission_sets(
    client: &SsoAdminClient,
    instance_arn: &str,
) -> AwsResult<Vec<String>> {
    let mut permission_sets = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let response = client
            .list_permission_sets()
            .instance_arn(instance_arn)
            .set_next_token(next_token.take())
            .send()
            .await
            .map_err(|e| {
                AwsError::SsoAdminError(format!("Failed to list permission sets: {e}"))
            })?;

        permission_sets.extend(response.permission_sets().iter().cloned());
        next_token = response.next_token().map(str::to_string);
        if next_token.is_none() {
            break;
        }
    }

    Ok(permission_sets)
}

pub(crate) async fn permission_set_name(
    client: &SsoAdminClient,
    instance_arn: &str,
    permission_set_arn: &str,
) -> AwsResult<String> {
    let response = client
        .describe_permission_set()
        .instance_arn(instance_arn)
        .permission_set_arn(permission_set_arn)
        .send()
        .await
        .map_err(|e| {
            AwsError::SsoAdminError(format!(
                "Failed to describe permission set '{permission_set_arn}': {e}"
            ))
        })?;

    Ok(response
        .permission_set()
        .and_then(|permission_set| permission_set.name())
        .unwrap_or("Unknown")
        .to_string())
}

/// Inline policy text of a permission set, `None` when it has none
pub(crate) async fn inline_policy(
    client: &SsoAdminClient,
    instance_arn: &str,
    permission_set_arn: &str,
) -> AwsResult<Option<String>> {
    let result = client
        .get_inline_policy_for_permission_set()
        .instance_arn(instance_arn)
        .permission_set_arn(permission_set_arn)
        .send()
        .await;

    match result {
        Ok(response) => Ok(response
            .inline_policy()
            .filter(|policy| !policy.trim().is_empty())
            .map(str::to_string)),
        Err(e)
            if e.as_service_error()
                .is_some_and(|service_error| service_error.is_resource_not_found_exception()) =>
        {
            Ok(None)
        }
        Err(e) => Err(AwsError::SsoAdminError(format!(
            "Failed to get inline policy for '{permission_set_arn}': {e}"
        ))),
    }
}

/// Managed policies attached to a permission set
pub(crate) async fn managed_policies(
    client: &SsoAdminClient,
    instance_arn: &str,
    permission_set_arn: &str,
) -> AwsResult<Vec<ManagedPolicyRef>> {
    let mut policies = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let response = client
            .list_managed_policies_in_permission_set()
            .instance_arn(instance_arn)
            .permission_set_arn(permission_set_arn)
            .set_next_token(next_token.take())
            .send()
            .await
            .map_err(|e| {
                AwsError::SsoAdminError(format!(
                    "Failed to list managed policies for '{permission_set_arn}': {e}"
                ))
            })?;

        policies.extend(
            response
                .attached_managed_policies()
                .iter()
                .filter_map(|policy| {
                    policy.arn().map(|arn| ManagedPolicyRef {
                        arn: arn.to_string(),
                        name: policy.name().unwrap_or_default().to_string(),
                    })
                }),
        );
        next_token = response.next_token().map(str::to_string);
        if next_token.is_none() {
            break;
        }
    }

    Ok(policies)
}

/// Accounts a permission set is provisioned to
pub(crate) async fn list_provisioned_accounts(
    client: &SsoAdminClient,
    instance_arn: &str,
    permission_set_arn: &str,
) -> AwsResult<Vec<String>> {
    let mut account_ids = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let response = client
            .list_accounts_for_provisioned_permission_set()
            .instance_arn(instance_arn)
            .permission_set_arn(permission_set_arn)
            .set_next_token(next_token.take())
            .send()
            .await
            .map_err(|e| {
                AwsError::SsoAdminError(format!(
                    "Failed to list accounts for '{permission_set_arn}': {e}"
                ))
            })?;

        account_ids.extend(response.account_ids().iter().cloned());
        next_token = response.next_token().map(str::to_string);
        if next_token.is_none() {
            break;
        }
    }

    Ok(account_ids)
}

/// Users and groups assigned to a permission set in one account
pub(crate) async fn list_account_assignments(
    client: &SsoAdminClient,
    instance_arn: &str,
    permission_set_arn: &str,
    account_id: &str,
) -> AwsResult<Vec<AccountAssignment>> {
    let mut assignments = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let response = client
            .list_account_assignments()
            .instance_arn(instance_arn)
            .permission_set_arn(permission_set_arn)
            .account_id(account_id)
            .set_next_token(next_token.take())
            .send()
            .await
            .map_err(|e| {
                AwsError::SsoAdminError(format!(
                    "Failed to list assignments of '{permission_set_arn}' in {account_id}: {e}"
                ))
            })?;

        assignments.extend(response.account_assignments().iter().filter_map(|assignment| {
            match (assignment.principal_type(), assignment.principal_id()) {
                (Some(principal_type), Some(principal_id)) => Some(AccountAssignment {
                    account_id: assignment.account_id().unwrap_or(account_id).to_string(),
                    principal_type: principal_type.clone(),
                    principal_id: principal_id.to_string(),
                }),
                _ => None,
            }
        }));
        next_token = response.next_token().map(str::to_string);
        if next_token.is_none() {
            break;
        }
    }

    Ok(assignments)
}
