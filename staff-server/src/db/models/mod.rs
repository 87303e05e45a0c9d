//! Database Models
//!
//! Employee records are plain wire types from `shared`; login accounts carry
//! a password hash and stay server-side.

pub mod user;

pub use shared::models::{Employee, EmployeeRequest};
pub use user::{UserAccount, UserAccountCreate};
