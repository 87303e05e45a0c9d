//! Employee Model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Employee record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub department: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub salary: Decimal,
    pub date_of_joining: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Create / update employee payload
///
/// `password` is only honoured on create: when present, a login account
/// with the `EMPLOYEE` role is provisioned for the new record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub department: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub salary: Decimal,
    pub date_of_joining: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}
