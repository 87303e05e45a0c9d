use crate::auth::{JwtConfig, JwtConfigError};

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 8080 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | SEED_DEMO_DATA | true | 启动时写入示例数据 |
/// | JWT_SECRET | - | HMAC 密钥, 至少 32 字节 |
/// | JWT_EXPIRATION_MINUTES | 1440 | 令牌有效期 |
/// | JWT_ISSUER | staff-server | `iss` |
/// | JWT_AUDIENCE | staff-clients | `aud` |
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// development | production
    pub environment: String,
    pub seed_demo_data: bool,
    /// JWT 认证配置
    pub jwt: JwtConfig,
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, JwtConfigError> {
        let jwt = JwtConfig::from_env()?;
        Ok(Self {
            http_port: env_parse("HTTP_PORT").unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            seed_demo_data: env_parse("SEED_DEMO_DATA").unwrap_or(true),
            jwt,
        })
    }

    /// Defaults with an explicit JWT config, no environment involved.
    ///
    /// 常用于测试场景
    pub fn with_jwt(jwt: JwtConfig) -> Self {
        Self {
            http_port: 0,
            environment: "test".into(),
            seed_demo_data: true,
            jwt,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
