//! Policy document helpers: statement extraction, canonical form, fingerprints

use crate::error::{AuditError, AuditResult};
use aws_lc_rs::digest;
use serde_json::Value;

/// Extract the statements of a policy document.
///
/// Accepts a document object (`{"Statement": ...}`), where `Statement` may be a
/// single object or an array, and a bare array of statements. Empty input and
/// documents without `Statement` yield no statements.
pub fn extract_statements(policy_json: &str) -> AuditResult<Vec<Value>> {
    if policy_json.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: Value = serde_json::from_str(policy_json)
        .map_err(|e| AuditError::malformed_policy(format!("invalid JSON: {e}")))?;

    match document {
        Value::Null => Ok(Vec::new()),
        Value::Array(statements) => Ok(statements),
        Value::Object(mut fields) => match fields.remove("Statement") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(statements)) => Ok(statements),
            Some(statement @ Value::Object(_)) => Ok(vec![statement]),
            Some(other) => Err(AuditError::malformed_policy(format!(
                "`Statement` must be an object or an array, found {}",
                json_type_name(&other)
            ))),
        },
        other => Err(AuditError::malformed_policy(format!(
            "policy document must be an object or an array, found {}",
            json_type_name(&other)
        ))),
    }
}

/// Compact JSON with object keys sorted, used to compare statements across policies
pub fn canonical_statement(statement: &Value) -> String {
    // serde_json's default map is ordered by key
    statement.to_string()
}

/// Hex-encoded SHA-256 of the raw policy text
pub fn policy_fingerprint(policy_text: &str) -> String {
    let hash = digest::digest(&digest::SHA256, policy_text.as_bytes());
    hash.as_ref().iter().map(|byte| format!("{byte:02x}")).collect()
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
