//! Session identity.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Email, EmailError, Role, UserId};

/// Structural problems with an identity handed to the session store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("identity id cannot be empty")]
    EmptyId,
    #[error("identity name cannot be empty")]
    EmptyName,
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),
}

/// The authenticated user held for a visitor.
///
/// This is the JSON blob persisted under the session user key:
/// `{ id, name, email, role, permissions }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Identity {
    pub const DEMO_ID: &'static str = "demo_user";
    pub const DEMO_NAME: &'static str = "Demo User";
    pub const DEMO_EMAIL: &'static str = "demo@arioncomply.com";

    /// The fixed identity installed when no usable session is persisted.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            id: UserId::new(Self::DEMO_ID),
            name: Self::DEMO_NAME.to_owned(),
            email: Email::from_trusted(Self::DEMO_EMAIL),
            role: Role::Admin,
            permissions: BTreeSet::from(["all".to_owned()]),
            avatar: None,
        }
    }

    /// Check the structural invariants that serde alone cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error when the id or name is blank.
    pub fn validate(&self) -> Result<(), IdentityError> {
        if self.id.is_blank() {
            return Err(IdentityError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(IdentityError::EmptyName);
        }
        Ok(())
    }

    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains("all") || self.permissions.contains(permission)
    }

    /// Up to two initials for the header avatar.
    #[must_use]
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Merge a partial update, leaving unspecified fields untouched.
    #[must_use]
    pub fn merged(mut self, patch: IdentityPatch) -> Self {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(permissions) = patch.permissions {
            self.permissions = permissions;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        self
    }
}

/// Partial identity update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub permissions: Option<BTreeSet<String>>,
    #[serde(default)]
    pub avatar: Option<String>,
}
