//! 统一错误处理
//!
//! The HTTP error type lives in `shared` so clients decode the same codes;
//! this module adds the server-side conversions into it.

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use crate::db::RepoError;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => AppError::not_found(what),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_repo_error_mapping() {
        let cases = [
            (RepoError::NotFound("Employee 9".into()), StatusCode::NOT_FOUND),
            (RepoError::Duplicate("email".into()), StatusCode::CONFLICT),
            (RepoError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (RepoError::Database("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).http_status(), status);
        }
    }
}
