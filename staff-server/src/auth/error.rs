//! Authentication / authorization errors
//!
//! Every failure of the auth core is exactly one of these kinds. None of them
//! is retried; the HTTP layer maps them through [`From<AuthError> for AppError`].
//!
//! | Kind | HTTP | Code |
//! |------|------|------|
//! | `AuthenticationFailed` | 401 | 1002 |
//! | `Malformed` | 401 | 1008 |
//! | `InvalidSignature` | 401 | 1004 |
//! | `Expired` | 401 | 1003 |
//! | `CorruptClaims` | 401 | 1009 |
//! | `Forbidden` | 403 | 2001 |
//! | `Issue` / `Store` | 500 | 9001 / 9002 |

use shared::{AppError, ErrorCode};
use thiserror::Error;

use super::policy::Capability;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Bad credentials. Deliberately says nothing about which part was wrong.
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("corrupt claims: {0}")]
    CorruptClaims(String),

    #[error("forbidden: {0}")]
    Forbidden(Capability),

    /// Token could not be signed
    #[error("token issuance failed: {0}")]
    Issue(String),

    /// Credential store could not be read
    #[error("credential store error: {0}")]
    Store(String),
}

impl AuthError {
    /// Stable event name for security logs
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::AuthenticationFailed => "authentication_failed",
            AuthError::Malformed => "malformed",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "expired",
            AuthError::CorruptClaims(_) => "corrupt_claims",
            AuthError::Forbidden(_) => "forbidden",
            AuthError::Issue(_) => "issue_failed",
            AuthError::Store(_) => "store_failed",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed => AppError::invalid_credentials(),
            AuthError::Malformed => AppError::new(ErrorCode::TokenMalformed),
            AuthError::InvalidSignature => AppError::new(ErrorCode::TokenInvalid),
            AuthError::Expired => AppError::new(ErrorCode::TokenExpired),
            // Cause stays in the logs
            AuthError::CorruptClaims(_) => AppError::new(ErrorCode::ClaimsCorrupt),
            AuthError::Forbidden(capability) => {
                AppError::forbidden(format!("Permission denied: {}", capability))
            }
            AuthError::Issue(msg) => AppError::internal(msg),
            AuthError::Store(msg) => AppError::database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_token_failures_map_to_401() {
        for err in [
            AuthError::AuthenticationFailed,
            AuthError::Malformed,
            AuthError::InvalidSignature,
            AuthError::Expired,
            AuthError::CorruptClaims("missing username".into()),
        ] {
            let app: AppError = err.into();
            assert_eq!(app.http_status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let app: AppError = AuthError::Forbidden(Capability::Delete).into();
        assert_eq!(app.code, ErrorCode::PermissionDenied);
        assert_eq!(app.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(app.message, "Permission denied: delete");
    }

    #[test]
    fn test_each_kind_has_distinct_code() {
        let codes: Vec<ErrorCode> = [
            AuthError::AuthenticationFailed,
            AuthError::Malformed,
            AuthError::InvalidSignature,
            AuthError::Expired,
            AuthError::CorruptClaims(String::new()),
            AuthError::Forbidden(Capability::Create),
        ]
        .into_iter()
        .map(|e| AppError::from(e).code)
        .collect();

        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_corrupt_claims_hides_cause() {
        let app: AppError = AuthError::CorruptClaims("sub is not numeric".into()).into();
        assert_eq!(app.message, "Invalid token claims");
    }
}
