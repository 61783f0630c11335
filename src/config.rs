/*
 * Responsibility
 * - Load settings from the environment (.env via dotenvy)
 * - Validate them (missing/invalid -> startup fails)
 * - Derive the explicit AuthConfig handed to the token authority
 */
use jsonwebtoken::Algorithm;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::{authority::AuthConfig, jwt::parse_hmac_algorithm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Where revoked token ids live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Valkey,
    // Process-local; revocations do not survive restarts or span instances.
    Memory,
}

impl FromStr for CacheBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "valkey" | "redis" => Ok(Self::Valkey),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("CACHE_BACKEND")),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub database_url: String,

    pub redis_url: String,
    pub cache_backend: CacheBackend,

    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    // Token lifetimes (seconds)
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    pub jti_expiry_seconds: u64,
    pub url_token_ttl_seconds: u64,

    // Host used in emailed links
    pub domain: String,
    pub mail_from: String,
    pub cors_allowed_origins: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print secrets or connection strings (they may embed passwords)
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cache_backend", &self.cache_backend)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("jti_expiry_seconds", &self.jti_expiry_seconds)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(key)),
    }
}

/// Upper bound for every `*_SECONDS` setting (10 years).
pub const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 3600;

fn parse_seconds(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if (1..=MAX_TTL_SECONDS).contains(&n) => Ok(n),
        _ => Err(ConfigError::Invalid(key)),
    }
}

fn seconds_or(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(v) => parse_seconds(key, &v),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url = required("DATABASE_URL")?;

        let redis_url = std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379/0".to_string());

        let cache_backend = match std::env::var("CACHE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => CacheBackend::Valkey,
        };

        let jwt_secret = required("JWT_SECRET")?;

        let jwt_algorithm = match std::env::var("JWT_ALGORITHM") {
            Ok(v) => parse_hmac_algorithm(&v).ok_or(ConfigError::Invalid("JWT_ALGORITHM"))?,
            Err(_) => Algorithm::HS256,
        };

        let access_token_ttl_seconds = seconds_or("ACCESS_TOKEN_TTL_SECONDS", 3600)?; // 1 hour
        let refresh_token_ttl_seconds = seconds_or("REFRESH_TOKEN_TTL_SECONDS", 172_800)?; // 2 days
        let jti_expiry_seconds = seconds_or("JTI_EXPIRY_SECONDS", 3600)?;
        let url_token_ttl_seconds = seconds_or("URL_TOKEN_TTL_SECONDS", 86_400)?; // 1 day

        let domain = required("DOMAIN")?;

        let mail_from =
            std::env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@bookly.local".to_string());

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        Ok(Self {
            addr,
            app_env,
            database_url,
            redis_url,
            cache_backend,
            jwt_secret,
            jwt_algorithm,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            jti_expiry_seconds,
            url_token_ttl_seconds,
            domain,
            mail_from,
            cors_allowed_origins,
        })
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            secret: self.jwt_secret.clone(),
            algorithm: self.jwt_algorithm,
            access_ttl: Duration::from_secs(self.access_token_ttl_seconds),
            refresh_ttl: Duration::from_secs(self.refresh_token_ttl_seconds),
            revocation_ttl: Duration::from_secs(self.jti_expiry_seconds),
        }
    }
}
