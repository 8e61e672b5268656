//! Comparisons across several policy documents

pub mod group_diff;
pub mod permission_sets;
pub mod search;

pub use group_diff::{diff_group_policies, DiffKind, PolicyDiffEntry, PolicyGrants};
pub use permission_sets::{
    detect_full_matches, detect_partial_matches, detect_shared_managed_policies, NamePair,
    PolicyMatch, PolicyMatchType, PolicySource, SharedManagedPolicy,
};
pub use search::PolicySearch;
