//! AWS IAM read operations for principals and their inline policies

use crate::aws::principal::PrincipalKind;
use crate::aws::{AwsError, AwsResult};
use aws_sdk_iam::primitives::DateTime;
use aws_sdk_iam::Client as IamClient;
use chrono::Utc;

/// An IAM user and when it was created
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IamUser {
    pub(crate) user_name: String,
    pub(crate) create_date: chrono::DateTime<Utc>,
}

pub(crate) async fn list_users(client: &IamClient) -> AwsResult<Vec<IamUser>> {
    let mut users = Vec::new();
    let mut marker: Option<String> = None;

    loop {
        let response = client
            .list_users()
            .set_marker(marker.take())
            .send()
            .await
            .map_err(|e| AwsError::IamError(format!("Failed to list users: {e}")))?;

        for user in response.users() {
            users.push(IamUser {
                user_name: user.user_name().to_string(),
                create_date: to_utc(user.create_date())?,
            });
        }
        marker = response.marker().map(str::to_string);
        if marker.is_none() {
            break;
        }
    }

    Ok(users)
}

fn to_utc(date: &DateTime) -> AwsResult<chrono::DateTime<Utc>> {
    chrono::DateTime::from_timestamp(date.secs(), date.subsec_nanos())
        .ok_or_else(|| AwsError::IamError(format!("Creation date out of range: {date:?}")))
}

/// Names of all principals of one kind in the account
pub(crate) async fn list_principals(client: &IamClient, kind: PrincipalKind) -> AwsResult<Vec<String>> {
    match kind {
        PrincipalKind::User => Ok(list_users(client)
            .await?
            .into_iter()
            .map(|user| user.user_name)
            .collect()),
        PrincipalKind::Role => list_role_names(client).await,
        PrincipalKind::Group => list_group_names(client).await,
    }
}

async fn list_role_names(client: &IamClient) -> AwsResult<Vec<String>> {
    let mut names = Vec::new();
    let mut marker: Option<String> = None;

    loop {
        let response = client
            .list_roles()
            .set_marker(marker.take())
            .send()
            .await
            .map_err(|e| AwsError::IamError(format!("Failed to list roles: {e}")))?;
        names.extend(response.roles().iter().map(|r| r.role_name().to_string()));
        marker = response.marker().map(str::to_string);
        if marker.is_none() {
            break;
        }
    }

    Ok(names)
}

async fn list_group_names(client: &IamClient) -> AwsResult<Vec<String>> {
    let mut names = Vec::new();
    let mut marker: Option<String> = None;

    loop {
        let response = client
            .list_groups()
            .set_marker(marker.take())
            .send()
            .await
            .map_err(|e| AwsError::IamError(format!("Failed to list groups: {e}")))?;
        names.extend(response.groups().iter().map(|g| g.group_name().to_string()));
        marker = response.marker().map(str::to_string);
        if marker.is_none() {
            break;
        }
    }

    Ok(names)
}

/// List all inline policy names for a principal
pub(crate) async fn list_inline_policies(
    client: &IamClient,
    kind: PrincipalKind,
    principal_name: &str,
) -> AwsResult<Vec<String>> {
    let mut policy_names = Vec::new();
    let mut marker: Option<String> = None;

    loop {
        let next = match kind {
            PrincipalKind::User => {
                let response = client
                    .list_user_policies()
                    .user_name(principal_name)
                    .set_marker(marker.take())
                    .send()
                    .await
                    .map_err(|e| AwsError::IamError(format!("Failed to list user policies: {e}")))?;
                policy_names.extend(response.policy_names().iter().cloned());
                response.marker().map(str::to_string)
            }
            PrincipalKind::Role => {
                let response = client
                    .list_role_policies()
                    .role_name(principal_name)
                    .set_marker(marker.take())
                    .send()
                    .await
                    .map_err(|e| AwsError::IamError(format!("Failed to list role policies: {e}")))?;
                policy_names.extend(response.policy_names().iter().cloned());
                response.marker().map(str::to_string)
            }
            PrincipalKind::Group => {
                let response = client
                    .list_group_policies()
                    .group_name(principal_name)
                    .set_marker(marker.take())
                    .send()
                    .await
                    .map_err(|e| {
                        AwsError::IamError(format!("Failed to list group policies: {e}"))
                    })?;
                policy_names.extend(response.policy_names().iter().cloned());
                response.marker().map(str::to_string)
            }
        };

        marker = next;
        if marker.is_none() {
            break;
        }
    }

    Ok(policy_names)
}

/// Fetch a specific inline policy document as JSON text
pub(crate) async fn get_inline_policy(
    client: &IamClient,
    kind: PrincipalKind,
    principal_name: &str,
    policy_name: &str,
) -> AwsResult<String> {
    let policy_document = match kind {
        PrincipalKind::User => client
            .get_user_policy()
            .user_name(principal_name)
            .policy_name(policy_name)
            .send()
            .await
            .map_err(|e| AwsError::IamError(format!("Failed to get user policy: {e}")))?
            .policy_document()
            .to_string(),
        PrincipalKind::Role => client
            .get_role_policy()
            .role_name(principal_name)
            .policy_name(policy_name)
            .send()
            .await
            .map_err(|e| AwsError::IamError(format!("Failed to get role policy: {e}")))?
            .policy_document()
            .to_string(),
        PrincipalKind::Group => client
            .get_group_policy()
            .group_name(principal_name)
            .policy_name(policy_name)
            .send()
            .await
            .map_err(|e| AwsError::IamError(format!("Failed to get group policy: {e}")))?
            .policy_document()
            .to_string(),
    };

    decode_policy_document(&policy_document)
}

/// Managed policy ARNs attached to a group
pub(crate) async fn list_attached_group_policies(
    client: &IamClient,
    group_name: &str,
) -> AwsResult<Vec<String>> {
    let mut arns = Vec::new();
    let mut marker: Option<String> = None;

    loop {
        let response = client
            .list_attached_group_policies()
            .group_name(group_name)
            .set_marker(marker.take())
            .send()
            .await
            .map_err(|e| {
                AwsError::IamError(format!(
                    "Failed to list attached policies of group '{group_name}': {e}"
                ))
            })?;

        arns.extend(
            response
                .attached_policies()
                .iter()
                .filter_map(|policy| policy.policy_arn().map(str::to_string)),
        );
        marker = response.marker().map(str::to_string);
        if marker.is_none() {
            break;
        }
    }

    Ok(arns)
}

/// URL decode a policy document (IAM returns URL-encoded JSON)
pub(crate) fn decode_policy_document(encoded: &str) -> AwsResult<String> {
    percent_encoding::percent_decode_str(encoded)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| AwsError::PolicyError(format!("Failed to URL decode policy document: {e}")))
}
