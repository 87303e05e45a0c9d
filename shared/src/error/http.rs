//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::EmployeeNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists
            | Self::EmployeeEmailExists
            | Self::UsernameExists
            | Self::AccountEmailExists => StatusCode::CONFLICT,

            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::TokenMalformed
            | Self::ClaimsCorrupt => StatusCode::UNAUTHORIZED,

            Self::PermissionDenied => StatusCode::FORBIDDEN,

            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            Self::ValidationFailed | Self::InvalidRequest => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_failures_are_unauthorized() {
        for code in [
            ErrorCode::InvalidCredentials,
            ErrorCode::TokenMalformed,
            ErrorCode::TokenInvalid,
            ErrorCode::TokenExpired,
            ErrorCode::ClaimsCorrupt,
        ] {
            assert_eq!(code.http_status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_permission_denied_is_forbidden() {
        assert_eq!(
            ErrorCode::PermissionDenied.http_status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(
            ErrorCode::EmployeeEmailExists.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::UsernameExists.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_system_status() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
    }
}
