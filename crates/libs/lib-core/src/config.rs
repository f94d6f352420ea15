//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! The configuration is built once by the server and handed to the components
//! that need it; the token signing key in particular only reaches the token
//! service through [`Config::token_config`].
//!
//! ```rust,no_run
//! use lib_core::config::Config;
//!
//! let config = Config::from_env().expect("configuration should load");
//! config.validate().expect("configuration should be valid");
//! let tokens = config.token_config();
//! ```

use lib_auth::TokenConfig;
use lib_utils::envs::{get_env, get_env_opt, get_env_parse_or};

/// Default SQLite location when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/identity.db";
/// Default HTTP bind address when `BIND_ADDRESS` is unset.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3001";

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Secret key for JWT token signing and verification
    ///
    /// **Must be at least 32 characters long** for security.
    pub jwt_secret: String,

    /// JWT token validity period in hours
    ///
    /// Valid range: 1-720 hours (1 hour to 30 days)
    pub jwt_expiration_hours: i64,

    /// Address the HTTP server binds to
    pub bind_address: String,

    /// Outbound mail settings; `None` routes mail to the log notifier
    pub smtp: Option<SmtpConfig>,
}

/// SMTP relay settings for outbound mail.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender mailbox, e.g. `Warden <no-reply@example.com>`
    pub from: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url =
            get_env_opt("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let jwt_secret = get_env("JWT_SECRET").map_err(|e| e.to_string())?;

        let jwt_expiration_hours =
            get_env_parse_or("JWT_EXPIRATION_HOURS", 24).map_err(|e| e.to_string())?;

        let bind_address =
            get_env_opt("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let smtp = match get_env_opt("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: get_env_parse_or("SMTP_PORT", 465).map_err(|e| e.to_string())?,
                username: get_env("SMTP_USERNAME").map_err(|e| e.to_string())?,
                password: get_env("SMTP_PASSWORD").map_err(|e| e.to_string())?,
                from: get_env("SMTP_FROM").map_err(|e| e.to_string())?,
            }),
            None => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration_hours,
            bind_address,
            smtp,
        })
    }

    /// Validate configuration values against security and business rules.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters long".to_string());
        }

        if self.jwt_expiration_hours < 1 || self.jwt_expiration_hours > 720 {
            return Err("JWT_EXPIRATION_HOURS must be between 1 and 720 (30 days)".to_string());
        }

        if let Some(smtp) = &self.smtp {
            if smtp.from.trim().is_empty() {
                return Err("SMTP_FROM cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Signing key and lifetime for the token service.
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::with_hours(self.jwt_secret.clone(), self.jwt_expiration_hours)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"***REDACTED***")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("bind_address", &self.bind_address)
            .field("smtp", &self.smtp)
            .finish()
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***REDACTED***")
            .field("from", &self.from)
            .finish()
    }
}
