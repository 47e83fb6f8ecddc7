use std::env;

use chrono::Duration;

use crate::error::AppError;

/// Default token lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60 * 24;
/// Longest token lifetime accepted: 30 days.
pub const MAX_TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 30;
/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` selects the in-memory stores.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    /// Token signing secret. Changing it invalidates every issued token.
    pub jwt_secret: String,
    /// Lifetime of issued tokens, between one second and `MAX_TOKEN_TTL_SECS`.
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    /// Report foreign resources as 404 instead of 403.
    pub mask_foreign_resources: bool,
    /// Single allowed CORS origin. `None` allows any origin.
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| config_error("JWT_SECRET must be set"))?;

        let server_port = parse_or(&lookup, "SERVER_PORT", 8080u16)?;
        let token_ttl_secs = parse_or(&lookup, "TOKEN_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECS)?;
        let token_ttl = Some(token_ttl_secs)
            .filter(|secs| (1..=MAX_TOKEN_TTL_SECS).contains(secs))
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                config_error(&format!(
                    "TOKEN_TTL_SECONDS must be between 1 and {}",
                    MAX_TOKEN_TTL_SECS
                ))
            })?;

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(config_error("BCRYPT_COST must be between 4 and 31"));
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            server_port,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            token_ttl,
            bcrypt_cost,
            mask_foreign_resources: parse_or(&lookup, "MASK_FOREIGN_RESOURCES", false)?,
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN").filter(|s| !s.is_empty()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| config_error(&format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

fn config_error(msg: &str) -> AppError {
    AppError::InternalServerError(format!("Configuration error: {}", msg))
}
