//! User Account Repository

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{RepoError, RepoResult, email_key};
use crate::auth::{CredentialStore, StoredCredential};
use crate::db::models::{UserAccount, UserAccountCreate};

#[derive(Debug)]
pub struct UserRepository {
    rows: DashMap<i64, UserAccount>,
    /// username (exact) -> user id
    usernames: DashMap<String, i64>,
    /// email (case-folded) -> user id
    emails: DashMap<String, i64>,
    next_id: AtomicI64,
}

impl Default for UserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            usernames: DashMap::new(),
            emails: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn find_by_id(&self, id: i64) -> Option<UserAccount> {
        self.rows.get(&id).map(|r| r.value().clone())
    }

    pub fn find_by_username(&self, username: &str) -> Option<UserAccount> {
        let id = *self.usernames.get(username)?;
        self.find_by_id(id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<UserAccount> {
        let id = *self.emails.get(&email_key(email))?;
        self.find_by_id(id)
    }

    pub fn find_by_employee_id(&self, employee_id: i64) -> Option<UserAccount> {
        self.rows
            .iter()
            .find(|r| r.employee_id == Some(employee_id))
            .map(|r| r.value().clone())
    }

    pub fn exists_by_username(&self, username: &str) -> bool {
        self.usernames.contains_key(username)
    }

    pub fn exists_by_email(&self, email: &str) -> bool {
        self.emails.contains_key(&email_key(email))
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Insert a new, enabled account. Username and email must both be free.
    pub fn create(&self, data: UserAccountCreate) -> RepoResult<UserAccount> {
        if data.roles.is_empty() {
            return Err(RepoError::Validation("account needs at least one role".into()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        match self.usernames.entry(data.username.clone()) {
            Entry::Occupied(_) => {
                return Err(RepoError::Duplicate(format!(
                    "Username '{}' is already taken",
                    data.username
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        match self.emails.entry(email_key(&data.email)) {
            Entry::Occupied(_) => {
                self.usernames.remove_if(&data.username, |_, owner| *owner == id);
                return Err(RepoError::Duplicate(format!(
                    "Email '{}' is already in use",
                    data.email
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let account = UserAccount {
            id,
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            roles: data.roles,
            employee_id: data.employee_id,
            enabled: true,
            created_at: Utc::now(),
        };
        self.rows.insert(id, account.clone());

        tracing::debug!(user_id = id, username = %account.username, "User account created");
        Ok(account)
    }

    /// Enable or disable login for an account
    pub fn set_enabled(&self, id: i64, enabled: bool) -> RepoResult<()> {
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("User {}", id)))?;
        row.enabled = enabled;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn lookup_by_username(&self, username: &str) -> RepoResult<Option<StoredCredential>> {
        Ok(self.find_by_username(username).map(|u| u.to_credential()))
    }
}
