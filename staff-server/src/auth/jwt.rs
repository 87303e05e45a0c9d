//! JWT 令牌服务
//!
//! Issues and validates the self-contained bearer token. A token is the
//! compact JWS form `header.payload.signature` (base64url segments), signed
//! with HS256 under the process-wide secret.
//!
//! Validation never touches a store: it checks structure, then the signature,
//! then issuer/audience, then expiry against the supplied clock. The claims
//! carry the identity snapshot taken at login, so the TTL bounds how stale a
//! role set or linked employee id can get.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::credentials::Identity;
use super::error::AuthError;

/// Minimum secret length in bytes (256-bit key for HS256)
pub const MIN_SECRET_LEN: usize = 32;

/// 默认 24 小时
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 1440;

/// 最长 30 天
pub const MAX_EXPIRATION_MINUTES: i64 = 43_200;

pub const DEFAULT_ISSUER: &str = "staff-server";
pub const DEFAULT_AUDIENCE: &str = "staff-clients";

/// JWT 配置
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HMAC 密钥 (至少 32 字节)
    pub secret: String,
    /// 令牌有效期 (分钟)
    pub expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_minutes", &self.expiration_minutes)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

/// Configuration errors for the signing secret and TTL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtConfigError {
    #[error("JWT_SECRET environment variable must be set in production")]
    SecretMissing,

    #[error("JWT secret must be at least 32 bytes, got {0}")]
    SecretTooShort(usize),

    #[error("invalid JWT_EXPIRATION_MINUTES: {0}")]
    InvalidExpiration(String),

    #[error("failed to generate secure random key")]
    KeyGeneration,
}

impl JwtConfig {
    /// Config with the given secret and default TTL / issuer / audience
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_minutes: DEFAULT_EXPIRATION_MINUTES,
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
        }
    }

    /// 从环境变量加载
    ///
    /// | 环境变量 | 默认值 |
    /// |----------|--------|
    /// | JWT_SECRET | (debug: 随机生成; release: 必填) |
    /// | JWT_EXPIRATION_MINUTES | 1440 |
    /// | JWT_ISSUER | staff-server |
    /// | JWT_AUDIENCE | staff-clients |
    pub fn from_env() -> Result<Self, JwtConfigError> {
        let expiration_minutes = match std::env::var("JWT_EXPIRATION_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .ok_or(JwtConfigError::InvalidExpiration(raw))?,
            Err(_) => DEFAULT_EXPIRATION_MINUTES,
        };

        let config = Self {
            secret: load_jwt_secret()?,
            expiration_minutes,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| DEFAULT_AUDIENCE.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), JwtConfigError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(JwtConfigError::SecretTooShort(self.secret.len()));
        }
        if self.expiration_minutes <= 0 || self.expiration_minutes > MAX_EXPIRATION_MINUTES {
            return Err(JwtConfigError::InvalidExpiration(
                self.expiration_minutes.to_string(),
            ));
        }
        Ok(())
    }

    /// Token time-to-live; `None` when the minutes do not fit a `Duration`
    pub fn ttl(&self) -> Option<Duration> {
        Duration::try_minutes(self.expiration_minutes)
    }
}

/// 生成可打印的安全 JWT 密钥 (用于开发环境)
pub fn generate_secure_printable_jwt_secret() -> Result<String, JwtConfigError> {
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?";

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    rng.fill(&mut bytes)
        .map_err(|_| JwtConfigError::KeyGeneration)?;

    Ok(bytes
        .iter()
        .map(|b| ALLOWED[*b as usize % ALLOWED.len()] as char)
        .collect())
}

/// 从环境变量安全地加载 JWT 密钥
fn load_jwt_secret() -> Result<String, JwtConfigError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) => Ok(secret),
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!(
                    "JWT_SECRET not set! Generating a temporary key; tokens will not survive a restart."
                );
                generate_secure_printable_jwt_secret()
            }
            #[cfg(not(debug_assertions))]
            {
                Err(JwtConfigError::SecretMissing)
            }
        }
    }
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 用户名
    #[serde(default)]
    pub username: String,
    /// 邮箱
    #[serde(default)]
    pub email: String,
    /// 关联的员工 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i64>,
    /// 角色名称
    #[serde(default)]
    pub roles: Vec<String>,
    /// 签发时间戳
    pub iat: i64,
    /// 过期时间戳
    pub exp: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl fmt::Debug for JwtService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 为用户生成新令牌
    pub fn generate_token(&self, identity: &Identity) -> Result<String, AuthError> {
        self.generate_token_at(identity, Utc::now())
    }

    /// Issue a token as of `now`; it expires at `now + ttl`.
    pub fn generate_token_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let expiration = self
            .config
            .ttl()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AuthError::Issue(format!(
                    "token lifetime out of range: {} minutes",
                    self.config.expiration_minutes
                ))
            })?;

        let claims = Claims {
            sub: identity.user_id.to_string(),
            username: identity.username.clone(),
            email: identity.email.clone(),
            employee_id: identity.employee_id,
            roles: identity.roles.iter().map(|r| r.as_str().to_string()).collect(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Validate against an explicit clock.
    ///
    /// Structure is checked first so that any later base64 failure can only
    /// come from the signature segment. The MAC comparison itself is done by
    /// `jsonwebtoken` in constant time. Expiry is checked last, only for
    /// correctly signed tokens; `now == exp` is still valid.
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        check_structure(token)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iss", "aud"]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature
                    | ErrorKind::InvalidAlgorithm
                    | ErrorKind::Base64(_) => AuthError::InvalidSignature,
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    ErrorKind::MissingRequiredClaim(claim) => {
                        AuthError::CorruptClaims(format!("missing claim: {}", claim))
                    }
                    ErrorKind::InvalidIssuer => AuthError::CorruptClaims("issuer mismatch".into()),
                    ErrorKind::InvalidAudience => {
                        AuthError::CorruptClaims("audience mismatch".into())
                    }
                    ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                        AuthError::CorruptClaims(format!("undecodable claims: {}", e))
                    }
                    ErrorKind::InvalidToken => AuthError::Malformed,
                    _ => AuthError::InvalidSignature,
                }
            })?;

        let claims = token_data.claims;
        if now.timestamp() > claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// 获取距离过期的剩余秒数
    pub fn get_expiration_seconds(&self, claims: &Claims, now: DateTime<Utc>) -> i64 {
        (claims.exp - now.timestamp()).max(0)
    }
}

/// Three non-empty base64url segments; the header must parse as a JOSE
/// header and the payload must decode to a JSON object.
fn check_structure(token: &str) -> Result<(), AuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return Err(AuthError::Malformed);
    }

    jsonwebtoken::decode_header(token).map_err(|_| AuthError::Malformed)?;

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(|_| AuthError::Malformed)?;
    match serde_json::from_slice::<serde_json::Value>(&payload) {
        Ok(serde_json::Value::Object(_)) => Ok(()),
        _ => Err(AuthError::Malformed),
    }
}
