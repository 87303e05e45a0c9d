//! Database Module
//!
//! In-memory tables behind shared handles. Everything is lost on restart;
//! demo data is re-seeded at start-up when enabled.

pub mod models;
pub mod repository;
pub mod seed;

use std::sync::Arc;

pub use repository::{
    EmployeeRepository, RepoError, RepoResult, ResourceStore, UserRepository,
};

/// Database service — owns every table
#[derive(Debug, Clone, Default)]
pub struct MemoryDb {
    employees: Arc<EmployeeRepository>,
    users: Arc<UserRepository>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn employees(&self) -> Arc<EmployeeRepository> {
        self.employees.clone()
    }

    pub fn users(&self) -> Arc<UserRepository> {
        self.users.clone()
    }
}
