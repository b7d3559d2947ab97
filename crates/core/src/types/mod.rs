//! Core types for the console.
//!
//! Type-safe wrappers for identifiers, emails, roles and the session identity.

pub mod email;
pub mod id;
pub mod identity;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use identity::{Identity, IdentityError, IdentityPatch};
pub use role::{Role, RoleParseError, RoleSet};
