//! Demo data
//!
//! Five employees and two login accounts: `admin` (ADMIN, linked to employee
//! 5) and `john.doe` (EMPLOYEE, linked to employee 1). A table that already
//! has rows is left alone.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::Role;
use shared::models::EmployeeRequest;

use super::models::UserAccountCreate;
use super::{MemoryDb, RepoError, RepoResult};
use crate::auth::PasswordHasher;

const EMPLOYEES: [(&str, &str, &str, &str, &str, i64, (i32, u32, u32)); 5] = [
    ("John", "Doe", "john.doe@company.com", "+1-555-0101", "Engineering", 75000, (2022, 1, 15)),
    ("Jane", "Smith", "jane.smith@company.com", "+1-555-0102", "Marketing", 65000, (2022, 3, 10)),
    ("Mike", "Johnson", "mike.johnson@company.com", "+1-555-0103", "Engineering", 80000, (2021, 8, 20)),
    ("Sarah", "Wilson", "sarah.wilson@company.com", "+1-555-0104", "HR", 70000, (2022, 5, 5)),
    ("Admin", "User", "admin@company.com", "+1-555-0100", "IT", 90000, (2021, 1, 1)),
];

/// (username, email, password, role, employee id)
const USERS: [(&str, &str, &str, Role, i64); 2] = [
    ("admin", "admin@company.com", "admin123", Role::Admin, 5),
    ("john.doe", "john.doe@company.com", "password123", Role::Employee, 1),
];

pub fn seed_demo_data(db: &MemoryDb, hasher: &dyn PasswordHasher) -> RepoResult<()> {
    let employees = db.employees();
    if employees.count() == 0 {
        for (first, last, email, phone, department, salary, (y, m, d)) in EMPLOYEES {
            let date_of_joining = NaiveDate::from_ymd_opt(y, m, d)
                .ok_or_else(|| RepoError::Validation(format!("bad seed date {y}-{m}-{d}")))?;
            employees.create(&EmployeeRequest {
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: email.to_string(),
                phone: Some(phone.to_string()),
                department: department.to_string(),
                salary: Decimal::from(salary),
                date_of_joining,
                password: None,
            })?;
        }
        tracing::info!(count = EMPLOYEES.len(), "Sample employees created");
    }

    let users = db.users();
    if users.count() == 0 {
        for (username, email, password, role, employee_id) in USERS {
            let password_hash = hasher
                .hash(password)
                .map_err(|e| RepoError::Database(format!("password hashing failed: {}", e)))?;
            users.create(UserAccountCreate {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                roles: BTreeSet::from([role]),
                employee_id: Some(employee_id),
            })?;
        }
        tracing::info!(
            count = USERS.len(),
            "Sample users created (admin / admin123, john.doe / password123)"
        );
    }

    Ok(())
}
