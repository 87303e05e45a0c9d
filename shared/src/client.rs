//! Client-related types shared between server and client
//!
//! Request/response bodies of the authentication API.

use serde::{Deserialize, Serialize};

use crate::models::Role;

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Always `"Bearer"`
    #[serde(rename = "type")]
    pub token_type: String,
    pub id: i64,
    pub username: String,
    pub email: String,
    pub employee_id: Option<i64>,
    pub roles: Vec<Role>,
}

/// Register request (admin only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Role names; containing `"admin"` grants the admin role, anything
    /// else (or nothing) yields a plain employee account
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    #[serde(default)]
    pub employee_id: Option<i64>,
}

/// Authenticated user information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub employee_id: Option<i64>,
    pub roles: Vec<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_wire_names() {
        let response = LoginResponse {
            token: "a.b.c".into(),
            token_type: "Bearer".into(),
            id: 2,
            username: "john.doe".into(),
            email: "john.doe@company.com".into(),
            employee_id: Some(1),
            roles: vec![Role::Employee],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "Bearer");
        assert_eq!(value["employeeId"], 1);
        assert_eq!(value["roles"], serde_json::json!(["EMPLOYEE"]));
    }

    #[test]
    fn test_register_request_defaults() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"jane","email":"jane@company.com","password":"secret1"}"#,
        )
        .unwrap();
        assert!(req.roles.is_none());
        assert!(req.employee_id.is_none());
    }
}
