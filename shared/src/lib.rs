//! Shared types for the staff directory
//!
//! Wire types used by the server and its clients: error codes, the unified
//! response envelope, authentication DTOs and employee records.

pub mod client;
pub mod error;
pub mod models;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::Role;
