//! Identity Store read operations: users and principal names

use crate::aws::{AwsError, AwsResult};
use aws_sdk_identitystore::Client as IdentityStoreClient;
use aws_sdk_ssoadmin::types::PrincipalType;

/// A user of the identity store behind an IAM Identity Center instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IdentityStoreUser {
    pub(crate) user_name: String,
    pub(crate) display_name: String,
    /// Created in the console rather than provisioned over SCIM (no external IDs)
    pub(crate) manual: bool,
}

pub(crate) async fn list_users(
    client: &IdentityStoreClient,
    identity_store_id: &str,
) -> AwsResult<Vec<IdentityStoreUser>> {
    let mut users = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let response = client
            .list_users()
            .identity_store_id(identity_store_id)
            .set_next_token(next_token.take())
            .send()
            .await
            .map_err(|e| AwsError::IdentityStoreError(format!("Failed to list users: {e}")))?;

        users.extend(response.users().iter().map(|user| IdentityStoreUser {
            user_name: user.user_name().unwrap_or_default().to_string(),
            display_name: user.display_name().unwrap_or_default().to_string(),
            manual: user.external_ids().is_empty(),
        }));
        next_token = response.next_token().map(str::to_string);
        if next_token.is_none() {
            break;
        }
    }

    Ok(users)
}

/// User name or group display name of an assigned principal
pub(crate) async fn principal_name(
    client: &IdentityStoreClient,
    identity_store_id: &str,
    principal_type: &PrincipalType,
    principal_id: &str,
) -> AwsResult<String> {
    match principal_type {
        PrincipalType::Group => {
            let response = client
                .describe_group()
                .identity_store_id(identity_store_id)
                .group_id(principal_id)
                .send()
                .await
                .map_err(|e| {
                    AwsError::IdentityStoreError(format!(
                        "Failed to describe group '{principal_id}': {e}"
                    ))
                })?;
            Ok(response.display_name().unwrap_or("Unknown Group").to_string())
        }
        PrincipalType::User => {
            let response = client
                .describe_user()
                .identity_store_id(identity_store_id)
                .user_id(principal_id)
                .send()
                .await
                .map_err(|e| {
                    AwsError::IdentityStoreError(format!(
                        "Failed to describe user '{principal_id}': {e}"
                    ))
                })?;
            Ok(response.user_name().unwrap_or("Unknown User").to_string())
        }
        other => Err(AwsError::IdentityStoreError(format!(
            "Unsupported principal type '{}'",
            other.as_str()
        ))),
    }
}
