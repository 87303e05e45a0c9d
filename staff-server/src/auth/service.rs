//! Authentication boundary
//!
//! The three calls the HTTP layer makes: log in, turn a bearer token into a
//! principal, check a capability.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::client::LoginResponse;

use super::credentials::{CredentialStore, CredentialVerifier};
use super::error::AuthError;
use super::jwt::{JwtConfig, JwtService};
use super::password::PasswordHasher;
use super::policy::{self, Capability};
use super::principal::CurrentUser;
use crate::security_log;

#[derive(Debug)]
pub struct AuthService {
    jwt: JwtService,
    verifier: CredentialVerifier,
}

impl AuthService {
    pub fn new(
        config: JwtConfig,
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            jwt: JwtService::with_config(config),
            verifier: CredentialVerifier::new(store, hasher)?,
        })
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        self.login_at(username, password, Utc::now()).await
    }

    /// Verify credentials and issue a token as of `now`
    pub async fn login_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginResponse, AuthError> {
        let identity = self.verifier.verify(username, password).await?;
        let token = self.jwt.generate_token_at(&identity, now)?;

        security_log!(
            "INFO",
            "login_success",
            user_id = identity.user_id,
            username = identity.username.as_str()
        );

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            id: identity.user_id,
            username: identity.username,
            email: identity.email,
            employee_id: identity.employee_id,
            roles: identity.roles.into_iter().collect(),
        })
    }

    pub fn require_authenticated(&self, token: &str) -> Result<CurrentUser, AuthError> {
        self.require_authenticated_at(token, Utc::now())
    }

    /// Validate the token and resolve the principal it carries
    pub fn require_authenticated_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<CurrentUser, AuthError> {
        let result = self
            .jwt
            .validate_token_at(token, now)
            .and_then(CurrentUser::try_from);

        if let Err(e) = &result {
            security_log!("WARN", "token_rejected", reason = e.kind());
        }
        result
    }

    pub fn require_capability(
        &self,
        user: &CurrentUser,
        capability: Capability,
        owner: Option<i64>,
    ) -> Result<(), AuthError> {
        policy::require_capability(user, capability, owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::Argon2Hasher;
    use crate::db::MemoryDb;
    use crate::db::seed;
    use chrono::{Duration, TimeZone};
    use shared::Role;

    async fn service() -> AuthService {
        let db = MemoryDb::new();
        let hasher = Arc::new(Argon2Hasher);
        seed::seed_demo_data(&db, hasher.as_ref()).unwrap();
        AuthService::new(
            JwtConfig::new("test-secret-test-secret-test-secret"),
            db.users(),
            hasher,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_login_then_resolve() {
        let svc = service().await;
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let login = svc.login_at("john.doe", "password123", now).await.unwrap();
        assert_eq!(login.token_type, "Bearer");
        assert_eq!(login.employee_id, Some(1));
        assert_eq!(login.roles, vec![Role::Employee]);

        let user = svc.require_authenticated_at(&login.token, now).unwrap();
        assert_eq!(user.id, login.id);
        assert_eq!(user.username, "john.doe");
        assert_eq!(user.roles.iter().copied().collect::<Vec<_>>(), login.roles);
    }

    #[tokio::test]
    async fn test_admin_may_create() {
        let svc = service().await;
        let login = svc.login("admin", "admin123").await.unwrap();
        let user = svc.require_authenticated(&login.token).unwrap();
        assert!(svc.require_capability(&user, Capability::Create, None).is_ok());
    }

    #[tokio::test]
    async fn test_employee_owner_rule() {
        let svc = service().await;
        let login = svc.login("john.doe", "password123").await.unwrap();
        let user = svc.require_authenticated(&login.token).unwrap();

        assert_eq!(
            svc.require_capability(&user, Capability::ReadOne, Some(2)),
            Err(AuthError::Forbidden(Capability::ReadOne))
        );
        assert!(svc.require_capability(&user, Capability::ReadOne, Some(1)).is_ok());
    }

    #[tokio::test]
    async fn test_bad_login() {
        let svc = service().await;
        assert_eq!(
            svc.login("admin", "wrong").await.unwrap_err(),
            AuthError::AuthenticationFailed
        );
        assert_eq!(
            svc.login("ghost", "admin123").await.unwrap_err(),
            AuthError::AuthenticationFailed
        );
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let svc = service().await;
        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let login = svc.login_at("admin", "admin123", issued).await.unwrap();

        let later = issued + Duration::hours(24) + Duration::seconds(1);
        assert_eq!(
            svc.require_authenticated_at(&login.token, later),
            Err(AuthError::Expired)
        );
        assert_eq!(
            svc.require_authenticated_at("garbage", issued),
            Err(AuthError::Malformed)
        );
    }
}
