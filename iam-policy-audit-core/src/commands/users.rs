//! IAM and Identity Store user listings

use crate::aws::iam_client::list_users;
use crate::aws::identity_store;
use crate::aws::sso_admin::describe_instance;
use crate::aws::sts::caller_account_id;
use crate::error::AuditResult;
use crate::report::{IamUserRow, IdentityStoreUserRow};
use log::info;

impl super::service::PolicyAuditService {
    /// IAM users of the caller's account with their creation dates
    pub async fn iam_users(&self) -> AuditResult<Vec<IamUserRow>> {
        let account_id = caller_account_id(&self.sts_client).await?;
        let users = list_users(&self.iam_client).await?;
        info!("Found {} IAM users in {}", users.len(), account_id);

        Ok(users
            .iter()
            .map(|user| IamUserRow::new(&account_id, user))
            .collect())
    }

    /// Users of the instance's identity store; with `manual_only`, only those
    /// not provisioned by an external identity provider
    pub async fn identity_store_users(
        &self,
        instance_arn: Option<&str>,
        manual_only: bool,
    ) -> AuditResult<Vec<IdentityStoreUserRow>> {
        let instance = describe_instance(&self.sso_admin_client, instance_arn).await?;
        let users =
            identity_store::list_users(&self.identity_store_client, &instance.identity_store_id)
                .await?;
        info!(
            "Found {} users in identity store {} of {}",
            users.len(),
            instance.identity_store_id,
            instance.instance_arn
        );

        Ok(users
            .into_iter()
            .filter(|user| !manual_only || user.manual)
            .map(IdentityStoreUserRow::from)
            .collect())
    }
}
