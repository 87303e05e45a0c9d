//! Employee API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::Role;
use std::collections::BTreeSet;

use crate::auth::{Capability, CurrentUser};
use crate::core::ServerState;
use crate::db::ResourceStore;
use crate::db::models::{Employee, EmployeeRequest, UserAccountCreate};
use crate::security_log;
use crate::utils::validation::validate_employee_request;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

fn employee_not_found(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::EmployeeNotFound,
        format!("Employee {} not found", id),
    )
}

/// List all employees
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Employee>>> {
    state
        .auth_service()
        .require_capability(&user, Capability::ListAll, None)?;
    Ok(Json(state.employees().find_all()))
}

/// Search by name, email or department
pub async fn search(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    state
        .auth_service()
        .require_capability(&user, Capability::Search, None)?;
    let term = query
        .q
        .ok_or_else(|| AppError::validation("query parameter 'q' is required"))?;
    Ok(Json(state.employees().search(&term)))
}

pub async fn by_department(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(department): Path<String>,
) -> AppResult<Json<Vec<Employee>>> {
    state
        .auth_service()
        .require_capability(&user, Capability::ReadByDepartment, None)?;
    Ok(Json(state.employees().find_by_department(&department)))
}

/// The employee record linked to the caller's account
pub async fn profile(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Employee>> {
    state
        .auth_service()
        .require_capability(&user, Capability::ReadOwnProfile, user.employee_id)?;

    let employee_id = user.employee_id.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::EmployeeNotFound,
            "No employee record is linked to this account",
        )
    })?;

    state
        .employees()
        .find_by_id(employee_id)
        .map(Json)
        .ok_or_else(|| employee_not_found(employee_id))
}

/// Get employee by id (admin, or the owner)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Employee>> {
    state
        .auth_service()
        .require_capability(&user, Capability::ReadOne, Some(id))?;

    state
        .employees()
        .find_by_id(id)
        .map(Json)
        .ok_or_else(|| employee_not_found(id))
}

/// Create a new employee (admin only)
///
/// A non-empty `password` also provisions an EMPLOYEE login named
/// `first.last`, linked to the new record.
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<EmployeeRequest>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    state
        .auth_service()
        .require_capability(&user, Capability::Create, None)?;

    validate_employee_request(&payload)?;

    let employees = state.employees();
    if employees.exists_by_email(&payload.email) {
        return Err(AppError::with_message(
            ErrorCode::EmployeeEmailExists,
            "Email is already in use",
        ));
    }

    let password = payload.password.as_deref().filter(|p| !p.is_empty());
    let username = generate_username(&payload.first_name, &payload.last_name);
    let users = state.users();
    if password.is_some() {
        if users.exists_by_username(&username) {
            return Err(AppError::with_message(
                ErrorCode::UsernameExists,
                format!("Username '{}' is already taken", username),
            ));
        }
        if users.exists_by_email(&payload.email) {
            return Err(AppError::with_message(
                ErrorCode::AccountEmailExists,
                "Email is already in use by a login account",
            ));
        }
    }

    let employee = employees.create(&payload)?;

    if let Some(password) = password {
        let account = state
            .hasher
            .hash(password)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))
            .and_then(|password_hash| {
                users
                    .create(UserAccountCreate {
                        username,
                        email: employee.email.clone(),
                        password_hash,
                        roles: BTreeSet::from([Role::Employee]),
                        employee_id: Some(employee.id),
                    })
                    .map_err(AppError::from)
            });

        match account {
            Ok(account) => {
                security_log!(
                    "INFO",
                    "user_registered",
                    user_id = account.id,
                    username = account.username.as_str(),
                    by = user.username.as_str()
                );
            }
            Err(e) => {
                // 账号创建失败则回滚员工记录
                employees.delete(employee.id);
                return Err(e);
            }
        }
    }

    tracing::info!(employee_id = employee.id, by = %user.username, "Employee created");
    Ok((StatusCode::CREATED, Json(employee)))
}

/// Update an employee (admin, or the owner)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeRequest>,
) -> AppResult<Json<Employee>> {
    state
        .auth_service()
        .require_capability(&user, Capability::UpdateOne, Some(id))?;

    validate_employee_request(&payload)?;

    let employees = state.employees();
    if !employees.exists(id).await? {
        return Err(employee_not_found(id));
    }
    if employees.exists_by_email_and_not_id(&payload.email, id) {
        return Err(AppError::with_message(
            ErrorCode::EmployeeEmailExists,
            "Email is already in use by another employee",
        ));
    }

    let employee = employees.update(id, &payload)?;
    tracing::info!(employee_id = id, by = %user.username, "Employee updated");
    Ok(Json(employee))
}

/// Delete an employee (admin only)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .auth_service()
        .require_capability(&user, Capability::Delete, Some(id))?;

    if !state.employees().delete(id) {
        return Err(employee_not_found(id));
    }

    tracing::info!(employee_id = id, by = %user.username, "Employee deleted");
    Ok(Json(ApiResponse::ok_with_message(
        "Employee deleted successfully",
    )))
}

/// `first.last`, lowercase, whitespace removed
fn generate_username(first_name: &str, last_name: &str) -> String {
    format!("{}.{}", first_name, last_name)
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_username() {
        assert_eq!(generate_username("Jane", "Smith"), "jane.smith");
        assert_eq!(generate_username("Mary Ann", "Van Dyke"), "maryann.vandyke");
    }
}
