//! Authentication Handlers

use std::collections::BTreeSet;

use axum::{Json, extract::State, http::StatusCode};
use shared::Role;
use shared::client::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};

use crate::auth::{Capability, CurrentUser};
use crate::core::ServerState;
use crate::db::ResourceStore;
use crate::db::models::UserAccountCreate;
use crate::security_log;
use crate::utils::validation::validate_register_request;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Login handler
///
/// Unknown user, wrong password and disabled account all produce the same
/// `InvalidCredentials` response.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = state
        .auth_service()
        .login(&req.username, &req.password)
        .await?;
    Ok(Json(response))
}

/// Create a login account (admin only)
pub async fn register(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    state
        .auth_service()
        .require_capability(&user, Capability::RegisterUser, None)?;

    validate_register_request(&req)?;

    let users = state.users();
    let username = req.username.trim().to_string();
    if users.exists_by_username(&username) {
        return Err(AppError::with_message(
            ErrorCode::UsernameExists,
            "Username is already taken",
        ));
    }
    if users.exists_by_email(&req.email) {
        return Err(AppError::with_message(
            ErrorCode::AccountEmailExists,
            "Email is already in use",
        ));
    }
    if let Some(employee_id) = req.employee_id
        && !state.employees().exists(employee_id).await?
    {
        return Err(AppError::with_message(
            ErrorCode::EmployeeNotFound,
            format!("Employee {} not found", employee_id),
        ));
    }

    let password_hash = state
        .hasher
        .hash(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let account = users.create(UserAccountCreate {
        username,
        email: req.email.trim().to_string(),
        password_hash,
        roles: requested_roles(req.roles.as_deref()),
        employee_id: req.employee_id,
    })?;

    security_log!(
        "INFO",
        "user_registered",
        user_id = account.id,
        username = account.username.as_str(),
        by = user.username.as_str()
    );

    Ok((StatusCode::CREATED, Json(account.to_user_info())))
}

/// Current user
pub async fn me(user: CurrentUser) -> Json<UserInfo> {
    Json(user.to_user_info())
}

/// Asking for the admin role grants exactly that; anything else, including
/// nothing or unknown names, yields a plain employee account.
fn requested_roles(names: Option<&[String]>) -> BTreeSet<Role> {
    let wants_admin = names
        .unwrap_or_default()
        .iter()
        .any(|name| name.parse::<Role>() == Ok(Role::Admin));

    if wants_admin {
        BTreeSet::from([Role::Admin])
    } else {
        BTreeSet::from([Role::Employee])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_roles() {
        assert_eq!(requested_roles(None), BTreeSet::from([Role::Employee]));
        assert_eq!(
            requested_roles(Some(&["admin".to_string()])),
            BTreeSet::from([Role::Admin])
        );
        assert_eq!(
            requested_roles(Some(&["employee".to_string(), "ADMIN".to_string()])),
            BTreeSet::from([Role::Admin])
        );
        assert_eq!(
            requested_roles(Some(&["manager".to_string()])),
            BTreeSet::from([Role::Employee])
        );
    }
}
