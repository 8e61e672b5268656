//! wiremock stand-ins for the IAM, STS, SSO admin and Identity Store endpoints

use crate::commands::service::PolicyAuditService;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::config::Credentials;
use serde_json::Value;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub(crate) const INSTANCE_ARN: &str = "arn:aws:sso:::instance/ssoins-1111111111111111";
pub(crate) const IDENTITY_STORE_ID: &str = "d-1111111111";
pub(crate) const ACCOUNT_ID: &str = "123456789012";

pub(crate) const IAM_XMLNS: &str = "https://iam.amazonaws.com/doc/2010-05-08/";
pub(crate) const STS_XMLNS: &str = "https://sts.amazonaws.com/doc/2011-06-15/";

const AWS_JSON: &str = "application/x-amz-json-1.1";

/// A service whose clients all talk to `server`
pub(crate) async fn mock_service(server: &MockServer) -> PolicyAuditService {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .endpoint_url(server.uri())
        .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "mock"))
        .retry_config(RetryConfig::disabled())
        .load()
        .await;

    PolicyAuditService {
        sso_admin_client: aws_sdk_ssoadmin::Client::new(&config),
        identity_store_client: aws_sdk_identitystore::Client::new(&config),
        iam_client: aws_sdk_iam::Client::new(&config),
        sts_client: aws_sdk_sts::Client::new(&config),
    }
}

/// Answer every JSON protocol call to `target` (e.g. `SWBExternalService.ListInstances`)
pub(crate) async fn mock_json(server: &MockServer, target: &str, response: Value) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", target))
        .respond_with(ResponseTemplate::new(200).set_body_raw(response.to_string(), AWS_JSON))
        .mount(server)
        .await;
}

/// Answer calls to `target` whose request body contains `request`, ahead of [`mock_json`]
pub(crate) async fn mock_json_matching(
    server: &MockServer,
    target: &str,
    request: Value,
    response: Value,
) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", target))
        .and(body_partial_json(request))
        .respond_with(ResponseTemplate::new(200).set_body_raw(response.to_string(), AWS_JSON))
        .with_priority(1)
        .mount(server)
        .await;
}

/// Fail calls to `target` whose request body contains `request` with a modeled error
pub(crate) async fn mock_json_error(
    server: &MockServer,
    target: &str,
    request: Value,
    error_type: &str,
) {
    let body = serde_json::json!({ "__type": error_type, "message": "mocked failure" });
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", target))
        .and(body_partial_json(request))
        .respond_with(ResponseTemplate::new(400).set_body_raw(body.to_string(), AWS_JSON))
        .with_priority(1)
        .mount(server)
        .await;
}

fn query_response(xmlns: &str, action: &str, result: &str) -> ResponseTemplate {
    let body = format!(
        r#"<{action}Response xmlns="{xmlns}"><{action}Result>{result}</{action}Result><ResponseMetadata><RequestId>req-1</RequestId></ResponseMetadata></{action}Response>"#
    );
    ResponseTemplate::new(200).set_body_raw(body, "text/xml")
}

/// Answer every query protocol call to `action` with the given `<ActionResult>` content
pub(crate) async fn mock_query(server: &MockServer, xmlns: &str, action: &str, result: &str) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains(format!("Action={action}&")))
        .respond_with(query_response(xmlns, action, result))
        .mount(server)
        .await;
}

/// Answer calls to `action` whose form body contains `fragment`, ahead of [`mock_query`]
pub(crate) async fn mock_query_matching(
    server: &MockServer,
    xmlns: &str,
    action: &str,
    fragment: &str,
    result: &str,
) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains(format!("Action={action}&")))
        .and(body_string_contains(fragment))
        .respond_with(query_response(xmlns, action, result))
        .with_priority(1)
        .mount(server)
        .await;
}

pub(crate) fn iam_user_xml(name: &str, created: &str) -> String {
    format!(
        "<member><Path>/</Path><UserName>{name}</UserName><UserId>AIDA{name}</UserId><Arn>arn:aws:iam::{ACCOUNT_ID}:user/{name}</Arn><CreateDate>{created}</CreateDate></member>"
    )
}

pub(crate) async fn mock_caller_identity(server: &MockServer) {
    mock_query(
        server,
        STS_XMLNS,
        "GetCallerIdentity",
        &format!(
            "<Arn>arn:aws:iam::{ACCOUNT_ID}:user/auditor</Arn><UserId>AIDAAUDITOR</UserId><Account>{ACCOUNT_ID}</Account>"
        ),
    )
    .await;
}

pub(crate) async fn mock_instance(server: &MockServer) {
    mock_json(
        server,
        "SWBExternalService.ListInstances",
        serde_json::json!({
            "Instances": [{ "InstanceArn": INSTANCE_ARN, "IdentityStoreId": IDENTITY_STORE_ID }]
        }),
    )
    .await;
}

pub(crate) fn permission_set_arn(id: &str) -> String {
    format!("arn:aws:sso:::permissionSet/ssoins-1111111111111111/{id}")
}

/// Permission set listing plus a `DescribePermissionSet` answer per `(id, name)`
pub(crate) async fn mock_permission_sets(server: &MockServer, permission_sets: &[(&str, &str)]) {
    let arns: Vec<String> = permission_sets
        .iter()
        .map(|(id, _)| permission_set_arn(id))
        .collect();
    mock_json(
        server,
        "SWBExternalService.ListPermissionSets",
        serde_json::json!({ "PermissionSets": arns }),
    )
    .await;

    for (id, name) in permission_sets {
        let arn = permission_set_arn(id);
        mock_json_matching(
            server,
            "SWBExternalService.DescribePermissionSet",
            serde_json::json!({ "PermissionSetArn": arn }),
            serde_json::json!({ "PermissionSet": { "Name": name, "PermissionSetArn": arn } }),
        )
        .await;
    }
}

pub(crate) async fn mock_inline_policy(server: &MockServer, id: &str, policy: &str) {
    mock_json_matching(
        server,
        "SWBExternalService.GetInlinePolicyForPermissionSet",
        serde_json::json!({ "PermissionSetArn": permission_set_arn(id) }),
        serde_json::json!({ "InlinePolicy": policy }),
    )
    .await;
}
