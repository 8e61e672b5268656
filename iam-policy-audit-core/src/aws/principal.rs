//! IAM principal kinds that carry inline policies

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrincipalKind {
    User,
    Role,
    Group,
}

impl PrincipalKind {
    pub const ALL: [PrincipalKind; 3] = [PrincipalKind::User, PrincipalKind::Role, PrincipalKind::Group];
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalKind::User => f.write_str("User"),
            PrincipalKind::Role => f.write_str("Role"),
            PrincipalKind::Group => f.write_str("Group"),
        }
    }
}

impl FromStr for PrincipalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" | "users" => Ok(PrincipalKind::User),
            "role" | "roles" => Ok(PrincipalKind::Role),
            "group" | "groups" => Ok(PrincipalKind::Group),
            other => Err(format!(
                "unsupported principal type '{other}' (expected user, role or group)"
            )),
        }
    }
}
