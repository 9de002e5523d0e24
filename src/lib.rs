/// Back-office API
///
/// Token-authenticated administrative service over events, items, users and
/// third-party API keys, backed by SQLite.

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod jobs;
pub mod rate_limit;
pub mod server;

pub use config::ServerConfig;
pub use context::AppContext;
pub use error::{ApiError, ApiResult};
