/// Third-party API key records (read only)
use sqlx::SqlitePool;
use std::time::Duration;

use super::listing::{fetch_page, ListParams, ListQuery, Listing, Page};
use crate::db::models::ApiKeyRecord;
use crate::error::ApiResult;

/// Path segment meaning "no search" on the key list route
pub const NO_SEARCH_SENTINEL: &str = "_";

pub const API_KEY_LISTING: Listing = Listing {
    table: "sns_key",
    select: "id, sns_id, api_key, api_secret, access_token, action, status, status_message, createdat, updatedat",
    sort_columns: &[
        ("id", "id"),
        ("sns_id", "sns_id"),
        ("status", "status"),
        ("createdat", "createdat"),
    ],
    search_columns: &["sns_id", "api_key"],
    default_limit: 50,
};

/// Build list parameters from the path-encoded key route
pub fn params_from_path(
    search: String,
    sort_by: String,
    sort_order: String,
    offset: String,
    limit: String,
) -> ListParams {
    ListParams {
        search: Some(search).filter(|s| s != NO_SEARCH_SENTINEL),
        sort_by: Some(sort_by),
        sort_order: Some(sort_order),
        limit: Some(limit),
        offset: Some(offset),
    }
}

/// API key manager
#[derive(Clone)]
pub struct ApiKeyManager {
    db: SqlitePool,
    timeout: Duration,
}

impl ApiKeyManager {
    pub fn new(db: SqlitePool, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub async fn list(&self, query: &ListQuery) -> ApiResult<Page<ApiKeyRecord>> {
        fetch_page(&self.db, self.timeout, &API_KEY_LISTING, query).await
    }
}
