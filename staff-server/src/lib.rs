//! Staff Server - 员工档案管理后端
//!
//! # 架构概述
//!
//! - **认证** (`auth`): Argon2 密码校验, HS256 JWT, 当前用户解析, 访问策略表
//! - **数据库** (`db`): 内存存储 (DashMap), 示例数据
//! - **HTTP API** (`api`): axum 路由和处理器
//!
//! # 模块结构
//!
//! ```text
//! staff-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # 凭证校验、JWT、当前用户、策略
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由组装和中间件
//! ├── utils/         # 错误、日志、校验
//! └── db/            # 存储层
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod routes;
pub mod utils;

// Re-export 公共类型
pub use auth::{AuthService, Capability, CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use routes::build_app;
pub use utils::logger::init_logger;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境: 加载 .env, 初始化日志
///
/// Logging settings are read here, before [`Config::from_env`], so config
/// warnings are already captured.
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | LOG_LEVEL | info | 日志级别 (`RUST_LOG` 优先) |
/// | LOG_JSON | false | JSON 日志 |
/// | LOG_DIR | - | 日志目录 (按天滚动) |
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let json = std::env::var("LOG_JSON")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(false);
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty());

    init_logger(&level, json, log_dir.as_deref())
}
