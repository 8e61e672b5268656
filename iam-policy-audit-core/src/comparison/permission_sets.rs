//! Duplicate inline and managed policies across permission sets

use crate::policy::{extract_statements, policy_fingerprint};
use log::warn;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// The inline policy text of one permission set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySource {
    pub name: String,
    pub policy_text: String,
}

impl PolicySource {
    pub fn new(name: impl Into<String>, policy_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policy_text: policy_text.into(),
        }
    }

    fn statements(&self) -> Vec<Value> {
        extract_statements(&self.policy_text).unwrap_or_else(|e| {
            warn!("Skipping statements of '{}': {}", self.name, e);
            Vec::new()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PolicyMatchType {
    /// Byte-identical inline policies
    FullMatch,
    /// Policies sharing at least one statement
    PartialMatch,
}

impl PolicyMatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyMatchType::FullMatch => "fullMatch",
            PolicyMatchType::PartialMatch => "partialMatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyMatch {
    pub match_type: PolicyMatchType,
    pub policy_hash: String,
    pub permission_sets: Vec<String>,
    pub policy_content: String,
}

/// Unordered pair of permission set names, smaller name first
pub type NamePair = (String, String);

fn name_pair(a: &str, b: &str) -> NamePair {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Group permission sets whose inline policy text is identical.
///
/// Returns one match per group of two or more, in order of first appearance,
/// and every pair of names covered by those groups.
pub fn detect_full_matches(sources: &[PolicySource]) -> (Vec<PolicyMatch>, HashSet<NamePair>) {
    let mut groups: Vec<(String, Vec<&PolicySource>)> = Vec::new();
    let mut index_by_hash: HashMap<String, usize> = HashMap::new();

    for source in sources {
        let hash = policy_fingerprint(&source.policy_text);
        match index_by_hash.get(&hash) {
            Some(&index) => groups[index].1.push(source),
            None => {
                index_by_hash.insert(hash.clone(), groups.len());
                groups.push((hash, vec![source]));
            }
        }
    }

    let mut matches = Vec::new();
    let mut pairs = HashSet::new();
    for (hash, members) in groups.into_iter().filter(|(_, members)| members.len() > 1) {
        for (i, first) in members.iter().enumerate() {
            for second in &members[i + 1..] {
                pairs.insert(name_pair(&first.name, &second.name));
            }
        }
        matches.push(PolicyMatch {
            match_type: PolicyMatchType::FullMatch,
            policy_hash: hash,
            permission_sets: members.iter().map(|m| m.name.clone()).collect(),
            policy_content: members[0].policy_text.clone(),
        });
    }

    (matches, pairs)
}

/// Report statements shared between pairs of permission sets that are not full matches
pub fn detect_partial_matches(
    sources: &[PolicySource],
    full_match_pairs: &HashSet<NamePair>,
) -> Vec<PolicyMatch> {
    let statements: Vec<Vec<Value>> = sources.iter().map(PolicySource::statements).collect();
    let mut checked: HashSet<NamePair> = HashSet::new();
    let mut matches = Vec::new();

    for (i, first) in sources.iter().enumerate() {
        for (j, second) in sources.iter().enumerate().skip(i + 1) {
            let pair = name_pair(&first.name, &second.name);
            if full_match_pairs.contains(&pair) || !checked.insert(pair) {
                continue;
            }

            let common: Vec<Value> = statements[i]
                .iter()
                .filter(|statement| statements[j].contains(statement))
                .cloned()
                .collect();
            if common.is_empty() {
                continue;
            }

            matches.push(PolicyMatch {
                match_type: PolicyMatchType::PartialMatch,
                policy_hash: format!("{}_{}_partial", first.name, second.name),
                permission_sets: vec![first.name.clone(), second.name.clone()],
                policy_content: format!("{:#}", Value::Array(common)),
            });
        }
    }

    matches
}

/// A managed policy attached to more than one permission set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedManagedPolicy {
    pub managed_policy_arn: String,
    pub permission_sets: Vec<String>,
}

/// Managed policy ARNs attached to several permission sets, in order of first appearance
pub fn detect_shared_managed_policies(
    attachments: &[(String, Vec<String>)],
) -> Vec<SharedManagedPolicy> {
    let mut shared: Vec<SharedManagedPolicy> = Vec::new();
    let mut index_by_arn: HashMap<&str, usize> = HashMap::new();

    for (permission_set, arns) in attachments {
        for arn in arns {
            match index_by_arn.get(arn.as_str()) {
                Some(&index) => shared[index].permission_sets.push(permission_set.clone()),
                None => {
                    index_by_arn.insert(arn, shared.len());
                    shared.push(SharedManagedPolicy {
                        managed_policy_arn: arn.clone(),
                        permission_sets: vec![permission_set.clone()],
                    });
                }
            }
        }
    }

    shared.retain(|policy| policy.permission_sets.len() > 1);
    shared
}

#[cfg(test)]
mod tests {
    use super::*;

    const S3_AND_EC2: &str = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"s3:*","Resource":"*"},{"Effect":"Allow","Action":"ec2:*","Resource":"*"}]}"#;
    const S3_ONLY: &str =
        r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"s3:*","Resource":"*"}]}"#;

    fn sources() -> Vec<PolicySource> {
        vec![
            PolicySource::new("PermissionSetA", S3_AND_EC2),
            PolicySource::new("PermissionSetB", S3_AND_EC2),
            PolicySource::new("PermissionSetC", S3_ONLY),
        ]
    }

    #[test]
    fn test_detect_full_matches_groups_identical_policies() {
        let (matches, pairs) = detect_full_matches(&sources());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].match_type, PolicyMatchType::FullMatch);
        assert_eq!(
            matches[0].permission_sets,
            vec!["PermissionSetA".to_string(), "PermissionSetB".to_string()]
        );
        assert_eq!(matches[0].policy_content, S3_AND_EC2);
        assert_eq!(matches[0].policy_hash, policy_fingerprint(S3_AND_EC2));
        assert!(pairs.contains(&name_pair("PermissionSetB", "PermissionSetA")));
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_detect_partial_matches_skips_full_pairs() {
        let sources = sources();
        let (_, full_pairs) = detect_full_matches(&sources);
        let partial = detect_partial_matches(&sources, &full_pairs);

        assert_eq!(partial.len(), 2);
        assert!(partial
            .iter()
            .all(|m| m.match_type == PolicyMatchType::PartialMatch));
        assert_eq!(partial[0].policy_hash, "PermissionSetA_PermissionSetC_partial");
        assert_eq!(partial[1].policy_hash, "PermissionSetB_PermissionSetC_partial");
        assert!(partial[0].policy_content.contains("s3:*"));
        assert!(!partial[0].policy_content.contains("ec2:*"));
    }

    #[test]
    fn test_detect_partial_matches_ignores_malformed_policies() {
        let sources = vec![
            PolicySource::new("Broken", "{not json"),
            PolicySource::new("Fine", S3_ONLY),
        ];
        assert!(detect_partial_matches(&sources, &HashSet::new()).is_empty());
    }

    #[test]
    fn test_detect_shared_managed_policies() {
        let attachments = vec![
            (
                "PermissionSetA".to_string(),
                vec!["arn:aws:iam::aws:policy/AmazonS3FullAccess".to_string()],
            ),
            (
                "PermissionSetB".to_string(),
                vec!["arn:aws:iam::aws:policy/AmazonS3FullAccess".to_string()],
            ),
            (
                "PermissionSetC".to_string(),
                vec!["arn:aws:iam::aws:policy/AmazonEC2FullAccess".to_string()],
            ),
        ];
        let shared = detect_shared_managed_policies(&attachments);
        assert_eq!(
            shared,
            vec![SharedManagedPolicy {
                managed_policy_arn: "arn:aws:iam::aws:policy/AmazonS3FullAccess".to_string(),
                permission_sets: vec!["PermissionSetA".to_string(), "PermissionSetB".to_string()],
            }]
        );
    }
}
