//! AWS SDK integration: read-only SSO admin, Identity Store, IAM and STS wrappers.

pub(crate) mod iam_client;
pub(crate) mod identity_store;
#[cfg(test)]
pub(crate) mod mock_aws;
pub mod principal;
pub(crate) mod sso_admin;
pub(crate) mod sts;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("SSO admin client error: {0}")]
    SsoAdminError(String),
    #[error("IAM client error: {0}")]
    IamError(String),
    #[error("Identity Store client error: {0}")]
    IdentityStoreError(String),
    #[error("STS client error: {0}")]
    StsError(String),
    #[error("Policy document error: {0}")]
    PolicyError(String),
}

pub type AwsResult<T> = Result<T, AwsError>;

/// Where to load the AWS SDK configuration from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsSettings {
    /// Named profile from the shared config files; the default chain when `None`
    pub profile: Option<String>,
    /// Region override; the profile or environment region when `None`
    pub region: Option<String>,
}

impl AwsSettings {
    pub fn new(profile: Option<String>, region: Option<String>) -> Self {
        Self { profile, region }
    }

    /// Load SDK configuration using the standard credential provider chain
    pub async fn load(&self) -> aws_config::SdkConfig {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &self.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        loader.load().await
    }
}
