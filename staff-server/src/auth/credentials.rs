//! Credential verification
//!
//! Checks a username / password pair against the account store. Every failure
//! collapses into [`AuthError::AuthenticationFailed`]; the reason only ever
//! reaches the security log.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use shared::Role;

use super::error::AuthError;
use super::password::PasswordHasher;
use crate::db::RepoResult;
use crate::security_log;
use crate::utils::validation::{MAX_PASSWORD_LEN, MAX_USERNAME_LEN};

/// 登录成功后的身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub employee_id: Option<i64>,
    pub roles: BTreeSet<Role>,
}

/// Stored credential as returned by [`CredentialStore::lookup_by_username`]
#[derive(Clone)]
pub struct StoredCredential {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
    pub employee_id: Option<i64>,
    pub enabled: bool,
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredential")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("roles", &self.roles)
            .field("employee_id", &self.employee_id)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl From<StoredCredential> for Identity {
    fn from(c: StoredCredential) -> Self {
        Self {
            user_id: c.user_id,
            username: c.username,
            email: c.email,
            employee_id: c.employee_id,
            roles: c.roles,
        }
    }
}

/// Account lookup used by login
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn lookup_by_username(&self, username: &str) -> RepoResult<Option<StoredCredential>>;
}

/// Plaintext verified against the dummy digest when the user does not exist
const TIMING_DUMMY_PASSWORD: &str = "timing-equalization-placeholder";

pub struct CredentialVerifier {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    dummy_hash: String,
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier").finish_non_exhaustive()
    }
}

impl CredentialVerifier {
    /// Builds the verifier and pre-computes the dummy digest with the same
    /// hasher, so a lookup miss costs one full verification too.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher
            .hash(TIMING_DUMMY_PASSWORD)
            .map_err(|e| AuthError::Issue(format!("dummy hash: {}", e)))?;

        Ok(Self {
            store,
            hasher,
            dummy_hash,
        })
    }

    pub async fn verify(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::AuthenticationFailed);
        }
        // Oversized input never reaches the hasher
        if username.chars().count() > MAX_USERNAME_LEN
            || password.chars().count() > MAX_PASSWORD_LEN
        {
            security_log!("WARN", "login_rejected", reason = "oversized_input");
            return Err(AuthError::AuthenticationFailed);
        }

        let stored = self
            .store
            .lookup_by_username(username)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        let Some(credential) = stored else {
            // 防止时序攻击
            let _ = self.hasher.verify(password, &self.dummy_hash);
            security_log!("WARN", "login_rejected", username = username, reason = "unknown_user");
            return Err(AuthError::AuthenticationFailed);
        };

        // Verify before looking at anything else so every path pays for it
        if !self.hasher.verify(password, &credential.password_hash) {
            security_log!("WARN", "login_rejected", username = username, reason = "bad_password");
            return Err(AuthError::AuthenticationFailed);
        }

        if !credential.enabled {
            security_log!("WARN", "login_rejected", username = username, reason = "disabled");
            return Err(AuthError::AuthenticationFailed);
        }

        if credential.roles.is_empty() {
            security_log!("WARN", "login_rejected", username = username, reason = "no_roles");
            return Err(AuthError::AuthenticationFailed);
        }

        Ok(credential.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::Argon2Hasher;
    use crate::db::RepoError;
    use argon2::password_hash;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MapStore(HashMap<String, StoredCredential>);

    #[async_trait]
    impl CredentialStore for MapStore {
        async fn lookup_by_username(
            &self,
            username: &str,
        ) -> RepoResult<Option<StoredCredential>> {
            Ok(self.0.get(username).cloned())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl CredentialStore for BrokenStore {
        async fn lookup_by_username(&self, _: &str) -> RepoResult<Option<StoredCredential>> {
            Err(RepoError::Database("connection refused".into()))
        }
    }

    fn credential(id: i64, name: &str, hash: String, enabled: bool) -> StoredCredential {
        StoredCredential {
            user_id: id,
            username: name.into(),
            email: format!("{}@company.com", name),
            password_hash: hash,
            roles: BTreeSet::from([Role::Employee]),
            employee_id: Some(id),
            enabled,
        }
    }

    fn verifier() -> CredentialVerifier {
        let hasher = Argon2Hasher;
        let mut map = HashMap::new();
        map.insert(
            "john.doe".to_string(),
            credential(2, "john.doe", hasher.hash("password123").unwrap(), true),
        );
        map.insert(
            "locked".to_string(),
            credential(3, "locked", hasher.hash("password123").unwrap(), false),
        );
        map.insert(
            "broken".to_string(),
            credential(4, "broken", "not-a-phc-string".into(), true),
        );
        CredentialVerifier::new(Arc::new(MapStore(map)), Arc::new(hasher)).unwrap()
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let identity = verifier().verify("john.doe", "password123").await.unwrap();
        assert_eq!(identity.user_id, 2);
        assert_eq!(identity.username, "john.doe");
        assert_eq!(identity.employee_id, Some(2));
        assert_eq!(identity.roles, BTreeSet::from([Role::Employee]));
    }

    #[tokio::test]
    async fn test_failures_are_undifferentiated() {
        let v = verifier();
        let cases = [
            ("john.doe", "wrong"),
            ("nobody", "password123"),
            ("locked", "password123"),
            ("broken", "password123"),
            ("", "password123"),
            ("john.doe", ""),
        ];
        for (user, pass) in cases {
            let err = v.verify(user, pass).await.unwrap_err();
            assert_eq!(err, AuthError::AuthenticationFailed, "{}/{}", user, pass);
        }
    }

    /// Plaintext "hasher" that counts verify calls
    #[derive(Default)]
    struct CountingHasher(AtomicUsize);

    impl PasswordHasher for CountingHasher {
        fn hash(&self, plaintext: &str) -> Result<String, password_hash::Error> {
            Ok(format!("plain:{}", plaintext))
        }

        fn verify(&self, plaintext: &str, digest: &str) -> bool {
            self.0.fetch_add(1, Ordering::SeqCst);
            digest == format!("plain:{}", plaintext)
        }
    }

    #[tokio::test]
    async fn test_oversized_input_skips_hasher() {
        let hasher = Arc::new(CountingHasher::default());
        let mut map = HashMap::new();
        map.insert(
            "john.doe".to_string(),
            credential(2, "john.doe", "plain:password123".into(), true),
        );
        let v = CredentialVerifier::new(Arc::new(MapStore(map)), hasher.clone()).unwrap();

        let long_password = "x".repeat(MAX_PASSWORD_LEN + 1);
        let long_username = "u".repeat(MAX_USERNAME_LEN + 1);
        for (user, pass) in [
            ("john.doe", long_password.as_str()),
            (long_username.as_str(), "password123"),
        ] {
            assert_eq!(
                v.verify(user, pass).await.unwrap_err(),
                AuthError::AuthenticationFailed
            );
        }
        assert_eq!(hasher.0.load(Ordering::SeqCst), 0);

        // The limit itself is still checked against the store
        let at_limit = "x".repeat(MAX_PASSWORD_LEN);
        assert_eq!(
            v.verify("john.doe", &at_limit).await.unwrap_err(),
            AuthError::AuthenticationFailed
        );
        assert!(v.verify("john.doe", "password123").await.is_ok());
        assert_eq!(hasher.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_authentication_failure() {
        let v = CredentialVerifier::new(Arc::new(BrokenStore), Arc::new(Argon2Hasher)).unwrap();
        let err = v.verify("john.doe", "password123").await.unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
    }

    #[test]
    fn test_debug_redacts_hash() {
        let c = credential(1, "a", "$argon2id$secret".into(), true);
        let out = format!("{:?}", c);
        assert!(!out.contains("secret"));
        assert!(out.contains("<redacted>"));
    }
}
