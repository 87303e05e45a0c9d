//! Authenticated principal
//!
//! Built once per request from validated claims and passed explicitly to
//! whatever needs it. Claims already carry everything, so no store lookup
//! happens here; account changes become visible at the next login at the
//! latest, i.e. the token TTL bounds staleness.

use std::collections::BTreeSet;

use shared::Role;
use shared::client::UserInfo;

use super::credentials::Identity;
use super::error::AuthError;
use super::jwt::Claims;

/// 当前用户上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// 用户 ID
    pub id: i64,
    pub username: String,
    pub email: String,
    /// 关联的员工 ID
    pub employee_id: Option<i64>,
    /// Never empty for a resolved principal
    pub roles: BTreeSet<Role>,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::CorruptClaims("sub is not a user id".into()))?;

        if claims.username.is_empty() {
            return Err(AuthError::CorruptClaims("missing username".into()));
        }
        if claims.email.is_empty() {
            return Err(AuthError::CorruptClaims("missing email".into()));
        }
        if claims.roles.is_empty() {
            return Err(AuthError::CorruptClaims("missing roles".into()));
        }

        let roles = claims
            .roles
            .iter()
            .map(|name| name.parse::<Role>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|e| AuthError::CorruptClaims(e.to_string()))?;

        Ok(Self {
            id,
            username: claims.username,
            email: claims.email,
            employee_id: claims.employee_id,
            roles,
        })
    }
}

impl CurrentUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// 是否管理员
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
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

impl From<Identity> for CurrentUser {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.user_id,
            username: identity.username,
            email: identity.email,
            employee_id: identity.employee_id,
            roles: identity.roles,
        }
    }
}
