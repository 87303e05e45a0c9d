use std::fmt;
use std::sync::Arc;

use crate::auth::{Argon2Hasher, AuthService, PasswordHasher};
use crate::core::Config;
use crate::db::{EmployeeRepository, MemoryDb, UserRepository, seed};
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// Cheap to clone; every field is a handle.
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 内存数据库
    pub db: MemoryDb,
    /// 认证服务 (Arc 共享所有权)
    pub auth: Arc<AuthService>,
    /// 密码哈希 (注册和创建员工账号时使用)
    pub hasher: Arc<dyn PasswordHasher>,
}

impl fmt::Debug for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("db", &self.db)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 内存数据库
    /// 2. 示例数据 (如果启用)
    /// 3. 认证服务
    pub fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = MemoryDb::new();
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher);

        if config.seed_demo_data {
            seed::seed_demo_data(&db, hasher.as_ref())?;
        }

        let auth = AuthService::new(config.jwt.clone(), db.users(), hasher.clone())?;

        Ok(Self {
            config: config.clone(),
            db,
            auth: Arc::new(auth),
            hasher,
        })
    }

    pub fn auth_service(&self) -> &AuthService {
        &self.auth
    }

    pub fn employees(&self) -> Arc<EmployeeRepository> {
        self.db.employees()
    }

    pub fn users(&self) -> Arc<UserRepository> {
        self.db.users()
    }
}
