//! 认证授权模块
//!
//! - [`CredentialVerifier`] - 用户名/密码校验
//! - [`JwtService`] - JWT 令牌签发与验证
//! - [`CurrentUser`] - 从令牌解析出的当前用户
//! - [`policy`] - 访问策略表
//! - [`AuthService`] - 对 HTTP 层暴露的入口

pub mod credentials;
pub mod error;
pub mod extractor;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod principal;
pub mod service;

pub use credentials::{CredentialStore, CredentialVerifier, Identity, StoredCredential};
pub use error::AuthError;
pub use jwt::{Claims, JwtConfig, JwtConfigError, JwtService};
pub use password::{Argon2Hasher, PasswordHasher};
pub use policy::{Capability, Decision, authorize, require_capability};
pub use principal::CurrentUser;
pub use service::AuthService;
