//! Domain models shared between server and clients

pub mod employee;
pub mod role;

pub use employee::{Employee, EmployeeRequest};
pub use role::{InvalidRole, Role};
