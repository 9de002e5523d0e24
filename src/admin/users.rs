/// Platform user repository: list, fetch and moderate
///
/// Users live in the same table as operator accounts; the credential column
/// is never selected here.
use sqlx::SqlitePool;
use std::time::Duration;

use super::listing::{fetch_page, ListQuery, Listing, Page};
use super::status::{apply_status, StatusChange, StatusSubject};
use crate::db::{models::User, with_timeout};
use crate::error::{ApiError, ApiResult};

const USER_COLUMNS: &str =
    "id, username, email, phone, status, status_message, level, createdat, updatedat";

pub const USER_LISTING: Listing = Listing {
    table: "\"user\"",
    select: USER_COLUMNS,
    sort_columns: &[("id", "id"), ("username", "username"), ("status", "status")],
    search_columns: &["username"],
    default_limit: 50,
};

/// User manager
#[derive(Clone)]
pub struct UserManager {
    db: SqlitePool,
    timeout: Duration,
}

impl UserManager {
    pub fn new(db: SqlitePool, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub async fn list(&self, query: &ListQuery) -> ApiResult<Page<User>> {
        fetch_page(&self.db, self.timeout, &USER_LISTING, query).await
    }

    pub async fn get(&self, id: i64) -> ApiResult<User> {
        let sql = format!("SELECT {} FROM \"user\" WHERE id = ? LIMIT 1", USER_COLUMNS);

        with_timeout(
            self.timeout,
            sqlx::query_as::<_, User>(&sql)
                .bind(id)
                .fetch_optional(&self.db),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Suspend, activate or deactivate a user
    pub async fn set_status(&self, id: i64, status: i64) -> ApiResult<StatusChange> {
        apply_status(&self.db, self.timeout, StatusSubject::User, id, status).await
    }
}
