//! Password hashing
//!
//! One-way salted hashing behind a small trait so the credential verifier
//! and the account repository share one implementation.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordVerifier, SaltString};

pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing digest
    fn hash(&self, plaintext: &str) -> Result<String, password_hash::Error>;

    /// `false` for a wrong password and for a digest that does not parse
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// Argon2id with a random salt, PHC string output
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, password_hash::Error> {
        use argon2::password_hash::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(plaintext.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher;
        let digest = hasher.hash("password123").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(!digest.contains("password123"));
        assert!(hasher.verify("password123", &digest));
        assert!(!hasher.verify("password124", &digest));
    }

    #[test]
    fn test_salted() {
        let hasher = Argon2Hasher;
        let a = hasher.hash("admin123").unwrap();
        let b = hasher.hash("admin123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unparseable_digest_never_verifies() {
        let hasher = Argon2Hasher;
        assert!(!hasher.verify("admin123", "admin123"));
        assert!(!hasher.verify("", ""));
    }
}
