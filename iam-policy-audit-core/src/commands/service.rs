//! IAM Policy Audit Service Layer
//!
//! This module provides the service interface that ties the AWS clients to the
//! pure comparison logic. Each audit operation lives in its own module and is
//! implemented as a method on [`PolicyAuditService`].

use crate::aws::AwsSettings;
use aws_sdk_iam::Client as IamClient;
use aws_sdk_identitystore::Client as IdentityStoreClient;
use aws_sdk_ssoadmin::Client as SsoAdminClient;
use aws_sdk_sts::Client as StsClient;

/// Main service struct that holds AWS clients and provides the audit operations
pub struct PolicyAuditService {
    pub(crate) sso_admin_client: SsoAdminClient,
    pub(crate) identity_store_client: IdentityStoreClient,
    pub(crate) iam_client: IamClient,
    pub(crate) sts_client: StsClient,
}

impl PolicyAuditService {
    /// Create a new service instance with AWS clients
    ///
    /// The configuration is loaded using the default credential provider chain,
    /// narrowed to the profile and region in `settings` when given.
    pub async fn new(settings: &AwsSettings) -> Self {
        let config = settings.load().await;

        Self {
            sso_admin_client: SsoAdminClient::new(&config),
            identity_store_client: IdentityStoreClient::new(&config),
            iam_client: IamClient::new(&config),
            sts_client: StsClient::new(&config),
        }
    }

    // duplicate_statements() and iam_duplicate_statements() are in duplicate_statements.rs
    // duplicate_policies() is in duplicate_policies.rs
    // statement_counts() is in statement_count.rs
    // group_diff() is in group_diff.rs
    // search_permission_sets() is in permission_set_search.rs
    // iam_users() and identity_store_users() are in users.rs
}
