/// Item repository: list, fetch and moderate
use sqlx::SqlitePool;
use std::time::Duration;

use super::listing::{fetch_page, ListQuery, Listing, Page};
use super::status::{apply_status, StatusChange, StatusSubject};
use crate::db::{models::Item, with_timeout};
use crate::error::{ApiError, ApiResult};

pub const ITEM_LISTING: Listing = Listing {
    table: "item",
    select: "*",
    sort_columns: &[("id", "id"), ("name", "name"), ("status", "status")],
    search_columns: &["name"],
    default_limit: 50,
};

/// Item manager
#[derive(Clone)]
pub struct ItemManager {
    db: SqlitePool,
    timeout: Duration,
}

impl ItemManager {
    pub fn new(db: SqlitePool, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// List items, optionally restricted to one owner
    pub async fn list(&self, query: ListQuery, user_id: Option<i64>) -> ApiResult<Page<Item>> {
        let query = match user_id {
            Some(owner) => query.with_filter("user_id", owner),
            None => query,
        };

        fetch_page(&self.db, self.timeout, &ITEM_LISTING, &query).await
    }

    pub async fn get(&self, id: i64) -> ApiResult<Item> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, Item>("SELECT * FROM item WHERE id = ? LIMIT 1")
                .bind(id)
                .fetch_optional(&self.db),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))
    }

    /// Ban, approve or deactivate an item
    pub async fn set_status(&self, id: i64, status: i64) -> ApiResult<StatusChange> {
        apply_status(&self.db, self.timeout, StatusSubject::Item, id, status).await
    }
}
