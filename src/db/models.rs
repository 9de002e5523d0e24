/// Row types for the back-office tables
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Operator account as read by the login flow.
/// Carries the password hash, so it is never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct OperatorAccount {
    pub id: i64,
    pub username: String,
    pub pw_hash: String,
    pub email: Option<String>,
    pub level: i64,
    pub status: i64,
}

/// Account view returned alongside a freshly issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorView {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub level: i64,
}

impl From<&OperatorAccount> for OperatorView {
    fn from(account: &OperatorAccount) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            level: account.level,
        }
    }
}

/// Event record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub status: i64,
    pub status_message: String,
    pub join_start: Option<NaiveDate>,
    pub join_end: Option<NaiveDate>,
    pub exposure_pre_start: Option<NaiveDate>,
    pub exposure_pre_end: Option<NaiveDate>,
    pub exposure_main_start: Option<NaiveDate>,
    pub exposure_main_end: Option<NaiveDate>,
    pub createdat: NaiveDateTime,
    pub updatedat: NaiveDateTime,
}

/// Item record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub storage_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub status: i64,
    pub status_message: Option<String>,
    pub event_id: Option<i64>,
    pub createdat: NaiveDateTime,
    pub updatedat: NaiveDateTime,
}

/// Platform user record (no credential columns)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: i64,
    pub status_message: Option<String>,
    pub level: i64,
    pub createdat: NaiveDateTime,
    pub updatedat: NaiveDateTime,
}

/// Third-party API key record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub id: i64,
    pub sns_id: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub access_token: Option<String>,
    pub action: Option<String>,
    pub status: i64,
    pub status_message: Option<String>,
    pub createdat: NaiveDateTime,
    pub updatedat: NaiveDateTime,
}
