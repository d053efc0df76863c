// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use dotenvy::dotenv;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Session lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    /// Seeded into `adminusers` at startup when set.
    pub admin_email: Option<String>,
    pub bind_addr: SocketAddr,
    /// Directory holding the built single-page frontend.
    pub static_dir: String,
    pub log_dir: String,
    /// How long a redirect sign-in code stays redeemable, in seconds.
    pub redirect_ttl: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/inkpost.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::InternalServerError("JWT_SECRET must be set".to_string()))?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let admin_email = env::var("ADMIN_EMAIL")
            .ok()
            .filter(|e| !e.trim().is_empty());

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration: parse_var("JWT_EXPIRATION", 86_400)?,
            rust_log,
            admin_email,
            bind_addr: parse_var("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "dist".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            redirect_ttl: parse_var("REDIRECT_TTL", 300)?,
        })
    }
}

/// Reads an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };
    raw.trim()
        .parse()
        .map_err(|_| AppError::InternalServerError(format!("{key} has an invalid value: {raw}")))
}
