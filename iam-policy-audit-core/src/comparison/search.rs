//! Keyword search over the policies attached to a permission set

use crate::aws::sso_admin::ManagedPolicyRef;

/// Case-insensitive keywords matched against managed policy names/ARNs and
/// against inline policy text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySearch {
    managed: Vec<String>,
    inline: Vec<String>,
}

impl PolicySearch {
    pub fn new(managed: &[String], inline: &[String]) -> Self {
        Self {
            managed: normalize_keywords(managed),
            inline: normalize_keywords(inline),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.managed.is_empty() && self.inline.is_empty()
    }

    /// Keywords that hit, managed keywords first, each reported once
    pub fn matches(
        &self,
        managed_policies: &[ManagedPolicyRef],
        inline_policy: Option<&str>,
    ) -> Vec<String> {
        let mut matched: Vec<String> = self
            .managed
            .iter()
            .filter(|keyword| {
                managed_policies.iter().any(|policy| {
                    policy.name.to_lowercase().contains(keyword.as_str())
                        || policy.arn.to_lowercase().contains(keyword.as_str())
                })
            })
            .cloned()
            .collect();

        if let Some(policy) = inline_policy {
            let policy = policy.to_lowercase();
            for keyword in &self.inline {
                if policy.contains(keyword.as_str()) && !matched.contains(keyword) {
                    matched.push(keyword.clone());
                }
            }
        }

        matched
    }
}

fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && !normalized.contains(&keyword) {
            normalized.push(keyword);
        }
    }
    normalized
}
