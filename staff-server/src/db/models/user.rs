//! User Account Model

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use shared::Role;
use shared::client::UserInfo;

use crate::auth::StoredCredential;

/// Login account
#[derive(Clone)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
    /// 关联的员工记录
    pub employee_id: Option<i64>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAccount")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("roles", &self.roles)
            .field("employee_id", &self.employee_id)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Create account payload; the password is already hashed
#[derive(Debug, Clone)]
pub struct UserAccountCreate {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
    pub employee_id: Option<i64>,
}

impl UserAccount {
    pub fn to_credential(&self) -> StoredCredential {
        StoredCredential {
            user_id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            password_hash: self.password_hash.clone(),
            roles: self.roles.clone(),
            employee_id: self.employee_id,
            enabled: self.enabled,
        }
    }

    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            employee_id: self.employee_id,
            roles: self.roles.iter().copied().collect(),
        }
    }
}
