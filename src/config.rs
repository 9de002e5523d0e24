/// Configuration management for the back-office API
use crate::error::{ApiError, ApiResult};
use crate::rate_limit::RateLimitConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub authentication: AuthConfig,
    pub listing: ListingConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
    /// Development mode exposes internal error details in 500 responses
    pub development: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL (e.g. sqlite://data/admin.sqlite)
    pub url: String,
    pub max_connections: u32,
    /// Upper bound for any single statement
    pub statement_timeout_secs: u64,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// How often revoked tokens past their expiry are dropped
    pub revocation_sweep_secs: u64,
    /// Superadmin created at startup when no account has this username
    pub bootstrap: Option<BootstrapOperator>,
}

/// Initial operator credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct BootstrapOperator {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl std::fmt::Debug for BootstrapOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapOperator")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// List endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Largest page a client may request
    pub max_limit: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl DatabaseConfig {
    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.statement_timeout_secs)
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("ADMIN_HOSTNAME").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| ApiError::Validation("Invalid port number".to_string()))?;
        let development = env::var("ADMIN_ENV")
            .map(|v| v.eq_ignore_ascii_case("development"))
            .unwrap_or(false);

        let database_url = env::var("ADMIN_DATABASE_URL")
            .map_err(|_| ApiError::Validation("ADMIN_DATABASE_URL is required".to_string()))?;
        let max_connections = env::var("ADMIN_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);
        let statement_timeout_secs = env::var("ADMIN_DB_STATEMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        // No fallback secret: a missing signing key must stop startup.
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| ApiError::Validation("JWT_SECRET is required".to_string()))?;
        let token_ttl_hours = env::var("ADMIN_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "8".to_string())
            .parse()
            .unwrap_or(8);
        let revocation_sweep_secs = env::var("ADMIN_REVOCATION_SWEEP_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .unwrap_or(300);

        let bootstrap = match (
            env::var("ADMIN_BOOTSTRAP_USER").ok(),
            env::var("ADMIN_BOOTSTRAP_PASSWORD").ok(),
        ) {
            (Some(username), Some(password)) => Some(BootstrapOperator { username, password }),
            (None, None) => None,
            _ => {
                return Err(ApiError::Validation(
                    "ADMIN_BOOTSTRAP_USER and ADMIN_BOOTSTRAP_PASSWORD must be set together"
                        .to_string(),
                ))
            }
        };

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            session_rps: env_or("ADMIN_RATE_LIMIT_SESSION_RPS", defaults.session_rps),
            session_burst: env_or("ADMIN_RATE_LIMIT_SESSION_BURST", defaults.session_burst),
            api_rps: env_or("ADMIN_RATE_LIMIT_API_RPS", defaults.api_rps),
            api_burst: env_or("ADMIN_RATE_LIMIT_API_BURST", defaults.api_burst),
        };

        let max_limit = env::var("ADMIN_LIST_MAX_LIMIT")
            .unwrap_or_else(|_| "500".to_string())
            .parse()
            .unwrap_or(500);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_json = env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version: env!("CARGO_PKG_VERSION").to_string(),
                development,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                statement_timeout_secs,
            },
            authentication: AuthConfig {
                jwt_secret,
                token_ttl_hours,
                revocation_sweep_secs,
                bootstrap,
            },
            listing: ListingConfig { max_limit },
            rate_limit,
            logging: LoggingConfig {
                level: log_level,
                json: log_json,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.authentication.jwt_secret.len() < 32 {
            return Err(ApiError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.token_ttl_hours <= 0 {
            return Err(ApiError::Validation(
                "Token lifetime must be positive".to_string(),
            ));
        }

        if self.listing.max_limit <= 0 {
            return Err(ApiError::Validation(
                "List limit cap must be positive".to_string(),
            ));
        }

        if let Some(bootstrap) = &self.authentication.bootstrap {
            if bootstrap.username.trim().is_empty() || bootstrap.password.len() < 8 {
                return Err(ApiError::Validation(
                    "Bootstrap operator needs a username and a password of at least 8 characters"
                        .to_string(),
                ));
            }
        }

        let limits = &self.rate_limit;
        if [limits.session_rps, limits.session_burst, limits.api_rps, limits.api_burst].contains(&0) {
            return Err(ApiError::Validation(
                "Rate limits must be positive".to_string(),
            ));
        }

        if self.database.statement_timeout_secs == 0 {
            return Err(ApiError::Validation(
                "Statement timeout must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_or(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
