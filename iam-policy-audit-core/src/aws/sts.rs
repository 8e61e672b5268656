//! STS helpers

use crate::aws::{AwsError, AwsResult};
use aws_sdk_sts::Client as StsClient;

/// Account ID of the credentials in use
pub(crate) async fn caller_account_id(client: &StsClient) -> AwsResult<String> {
    let response = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| AwsError::StsError(format!("Failed to get caller identity: {e}")))?;

    response
        .account()
        .map(str::to_string)
        .ok_or_else(|| AwsError::StsError("Caller identity has no account ID".to_string()))
}
