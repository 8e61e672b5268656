//! Coverage tests for IAM actions and resources.
//!
//! Coverage is directional: `action_includes(candidate, required)` answers
//! whether everything `required` grants is also granted by `candidate`.

use crate::types::StringOrList;
use log::warn;

/// Whether the `candidate` action pattern covers the `required` one.
///
/// `*` on either side covers. Otherwise both sides must name the same service,
/// and the candidate verb must equal the required verb or be a wildcard that
/// the required verb falls under (`s3:*`, `s3:Get*`). Action strings without a
/// `service:` prefix never cover.
pub fn action_includes(candidate: &str, required: &str) -> bool {
    if candidate == "*" || required == "*" || candidate == required {
        return true;
    }

    let (Some((candidate_service, candidate_verb)), Some((required_service, required_verb))) =
        (split_action(candidate), split_action(required))
    else {
        return false;
    };

    if candidate_service != required_service {
        return false;
    }

    match candidate_verb.strip_suffix('*') {
        Some(prefix) => required_verb.starts_with(prefix) && required_verb != "*",
        None => candidate_verb == required_verb,
    }
}

/// Every required action is covered by at least one candidate action
pub fn actions_cover(candidates: &[String], required: &[String]) -> bool {
    required
        .iter()
        .all(|r| candidates.iter().any(|c| action_includes(c, r)))
}

/// Whether the `candidate` resource specifier covers the `required` one.
///
/// Lists are only compared by membership; prefix wildcards (`arn:...:bucket/*`)
/// apply when both sides are single values.
pub fn resource_covers(candidate: &StringOrList, required: &StringOrList) -> bool {
    match (candidate, required) {
        (StringOrList::Single(c), _) if c == "*" => true,
        (c, r) if c == r => true,
        (StringOrList::Single(c), StringOrList::Single(r)) => c
            .strip_suffix('*')
            .is_some_and(|prefix| r.starts_with(prefix)),
        (StringOrList::List(c), StringOrList::Single(r)) => c.contains(r),
        (StringOrList::Single(c), StringOrList::List(r)) => r.iter().all(|value| value == c),
        (StringOrList::List(c), StringOrList::List(r)) => r.iter().all(|value| c.contains(value)),
    }
}

fn split_action(action: &str) -> Option<(&str, &str)> {
    let parts = action.split_once(':');
    if parts.is_none() {
        warn!(
            "Action '{}' has no service prefix (expected 'service:Verb'); treating it as non-covering",
            action
        );
    }
    parts
}
