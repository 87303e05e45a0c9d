//! JWT Extractor
//!
//! Resolves the principal once per request and hands it to the handler as a
//! plain argument. Nothing is stored in ambient state.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header).ok_or_else(|| {
                security_log!("WARN", "auth_header_invalid", uri = parts.uri.path());
                AppError::from(crate::auth::AuthError::Malformed)
            })?,
            None => {
                security_log!("WARN", "auth_missing", uri = parts.uri.path());
                return Err(AppError::unauthorized());
            }
        };

        state
            .auth_service()
            .require_authenticated(token)
            .map_err(AppError::from)
    }
}
