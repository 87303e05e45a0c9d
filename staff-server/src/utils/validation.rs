//! Input validation helpers
//!
//! Hand-written checks for request bodies; every failure becomes a
//! `ValidationFailed` (400) error naming the field.

use rust_decimal::Decimal;
use shared::client::RegisterRequest;
use shared::models::EmployeeRequest;

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// First / last names
pub const MAX_NAME_LEN: usize = 50;

/// Department names
pub const MAX_DEPARTMENT_LEN: usize = 100;

/// Phone numbers
pub const MAX_PHONE_LEN: usize = 20;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Field helpers ───────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        )));
    }
    Ok(())
}

/// One `@`, non-empty local part, domain containing a dot that is neither
/// first nor last.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;

    let invalid = || AppError::validation("email must be a well-formed email address");
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.find('.') {
        Some(pos) if pos > 0 && !domain.ends_with('.') => Ok(()),
        _ => Err(invalid()),
    }
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password is too long (max {MAX_PASSWORD_LEN})"
        )));
    }
    Ok(())
}

pub fn validate_positive(value: Decimal, field: &str) -> Result<(), AppError> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation(format!("{field} must be positive")));
    }
    Ok(())
}

// ── Request bodies ──────────────────────────────────────────────────

pub fn validate_employee_request(req: &EmployeeRequest) -> Result<(), AppError> {
    validate_required_text(&req.first_name, "firstName", MAX_NAME_LEN)?;
    validate_required_text(&req.last_name, "lastName", MAX_NAME_LEN)?;
    validate_email(&req.email)?;
    validate_optional_text(&req.phone, "phone", MAX_PHONE_LEN)?;
    validate_required_text(&req.department, "department", MAX_DEPARTMENT_LEN)?;
    validate_positive(req.salary, "salary")?;
    // Blank means "no account", same as absent
    if let Some(password) = req.password.as_deref()
        && !password.is_empty()
    {
        validate_password(password)?;
    }
    Ok(())
}

pub fn validate_register_request(req: &RegisterRequest) -> Result<(), AppError> {
    validate_required_text(&req.username, "username", MAX_USERNAME_LEN)?;
    if req.username.trim().chars().count() < MIN_USERNAME_LEN {
        return Err(AppError::validation(format!(
            "username must be at least {MIN_USERNAME_LEN} characters"
        )));
    }
    validate_email(&req.email)?;
    validate_password(&req.password)
}
