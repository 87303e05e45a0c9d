//! API 路由模块
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、注册、当前用户
//! - [`employees`] - 员工管理接口
//!
//! Every protected handler takes [`CurrentUser`](crate::auth::CurrentUser)
//! as an argument and checks the access policy before reading or writing
//! any store.

pub mod auth;
pub mod employees;
pub mod health;
