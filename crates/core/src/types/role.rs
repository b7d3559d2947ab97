//! User roles and role sets.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Role of a console user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including system settings.
    Admin,
    /// Compliance manager: everything except settings.
    Manager,
    /// Internal auditor: read and audit access.
    Auditor,
    /// End user: read-only.
    User,
}

/// Error returned when a role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

impl Role {
    /// Every role, in privilege order.
    pub const ALL: [Self; 4] = [Self::Admin, Self::Manager, Self::Auditor, Self::User];

    /// Wire name (`admin`, `manager`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Auditor => "auditor",
            Self::User => "user",
        }
    }

    /// Human readable title shown in the header.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Manager => "Compliance Manager",
            Self::Auditor => "Internal Auditor",
            Self::User => "End User",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Admin => 1,
            Self::Manager => 1 << 1,
            Self::Auditor => 1 << 2,
            Self::User => 1 << 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "auditor" => Ok(Self::Auditor),
            "user" => Ok(Self::User),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

/// A set of roles, stored as a bitmask.
///
/// Serializes as a list of role names in privilege order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Role>", into = "Vec<Role>")]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self::of(&Role::ALL);

    /// Build a set from a slice of roles.
    #[must_use]
    pub const fn of(roles: &[Role]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < roles.len() {
            bits |= roles[i].bit();
            i += 1;
        }
        Self(bits)
    }

    #[must_use]
    pub const fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn with(self, role: Role) -> Self {
        Self(self.0 | role.bit())
    }

    /// Roles in the set, in privilege order.
    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

impl From<Vec<Role>> for RoleSet {
    fn from(roles: Vec<Role>) -> Self {
        roles.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl From<RoleSet> for Vec<Role> {
    fn from(set: RoleSet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(" Auditor ".parse::<Role>().unwrap(), Role::Auditor);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_is_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
    }

    #[test]
    fn test_role_set_membership() {
        let set = RoleSet::of(&[Role::Admin, Role::Auditor]);
        assert!(set.contains(Role::Admin));
        assert!(set.contains(Role::Auditor));
        assert!(!set.contains(Role::User));
        assert!(!set.is_empty());
        assert!(RoleSet::EMPTY.is_empty());
        assert!(Role::ALL.iter().all(|r| RoleSet::ALL.contains(*r)));
    }

    #[test]
    fn test_role_set_serializes_as_list() {
        let set = RoleSet::of(&[Role::User, Role::Admin]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["admin","user"]"#);

        let parsed: RoleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }
}
