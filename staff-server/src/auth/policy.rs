//! Access policy
//!
//! One table decides every protected operation. Handlers call
//! [`require_capability`] before touching a store, never after.
//!
//! | Capability | ADMIN | EMPLOYEE |
//! |---|---|---|
//! | `list-all`, `search`, `read-by-department` | allow | allow |
//! | `read-one`, `update-one` | allow | owner only |
//! | `read-own-profile` | allow | allow |
//! | `create`, `delete`, `register-user` | allow | deny |
//!
//! Anything not listed is denied.

use std::fmt;

use shared::Role;

use super::error::AuthError;
use super::principal::CurrentUser;

/// 受保护操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ListAll,
    Search,
    ReadByDepartment,
    ReadOne,
    UpdateOne,
    Create,
    Delete,
    ReadOwnProfile,
    RegisterUser,
}

impl Capability {
    pub const ALL: [Capability; 9] = [
        Capability::ListAll,
        Capability::Search,
        Capability::ReadByDepartment,
        Capability::ReadOne,
        Capability::UpdateOne,
        Capability::Create,
        Capability::Delete,
        Capability::ReadOwnProfile,
        Capability::RegisterUser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ListAll => "list-all",
            Capability::Search => "search",
            Capability::ReadByDepartment => "read-by-department",
            Capability::ReadOne => "read-one",
            Capability::UpdateOne => "update-one",
            Capability::Create => "create",
            Capability::Delete => "delete",
            Capability::ReadOwnProfile => "read-own-profile",
            Capability::RegisterUser => "register-user",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

/// Evaluate the policy table.
///
/// `owner` is the employee id the target record belongs to; it only matters
/// for the owner-scoped capabilities. Pure and side-effect free.
pub fn authorize(user: &CurrentUser, capability: Capability, owner: Option<i64>) -> Decision {
    if user.has_role(Role::Admin) {
        return Decision::Allow;
    }

    if !user.has_role(Role::Employee) {
        return Decision::Deny;
    }

    let allowed = match capability {
        Capability::ListAll | Capability::Search | Capability::ReadByDepartment => true,
        Capability::ReadOne | Capability::UpdateOne => match (user.employee_id, owner) {
            (Some(own), Some(target)) => own == target,
            _ => false,
        },
        Capability::ReadOwnProfile => true,
        Capability::Create | Capability::Delete | Capability::RegisterUser => false,
    };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// [`authorize`] as a `Result`, logging denials
pub fn require_capability(
    user: &CurrentUser,
    capability: Capability,
    owner: Option<i64>,
) -> Result<(), AuthError> {
    match authorize(user, capability, owner) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            crate::security_log!(
                "WARN",
                "access_denied",
                user_id = user.id,
                username = user.username.as_str(),
                capability = capability.as_str(),
                owner = owner
            );
            Err(AuthError::Forbidden(capability))
        }
    }
}
