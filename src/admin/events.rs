/// Event repository: list, fetch, create and update
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::time::Duration;

use super::listing::{fetch_page, ListQuery, Listing, Page};
use crate::db::{models::Event, with_timeout};
use crate::error::{ApiError, ApiResult};

pub const EVENT_LISTING: Listing = Listing {
    table: "event",
    select: "*",
    sort_columns: &[
        ("id", "id"),
        ("title", "title"),
        ("date", "event_date"),
        ("event_date", "event_date"),
        ("status", "status"),
    ],
    search_columns: &["title"],
    default_limit: 20,
};

/// Event fields as submitted by a client (create and update)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub event_date: Option<String>,
    pub status: Option<serde_json::Value>,
    pub status_message: Option<String>,
    pub join_start: Option<String>,
    pub join_end: Option<String>,
    pub exposure_pre_start: Option<String>,
    pub exposure_pre_end: Option<String>,
    pub exposure_main_start: Option<String>,
    pub exposure_main_end: Option<String>,
}

/// Normalized event fields ready for storage
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
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
}

/// Blank text becomes NULL
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Truncate a date or timestamp to its date part; blank becomes NULL
pub fn normalize_date(field: &str, value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ApiError::Validation(format!("Invalid date for {}: {}", field, raw)))
}

/// Integer value or `default` when absent or not an integer
pub fn normalize_int(value: Option<&serde_json::Value>, default: i64) -> i64 {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or(default),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

impl EventInput {
    pub fn normalize(self) -> ApiResult<EventDraft> {
        Ok(EventDraft {
            event_date: normalize_date("event_date", self.event_date.as_deref())?,
            join_start: normalize_date("join_start", self.join_start.as_deref())?,
            join_end: normalize_date("join_end", self.join_end.as_deref())?,
            exposure_pre_start: normalize_date(
                "exposure_pre_start",
                self.exposure_pre_start.as_deref(),
            )?,
            exposure_pre_end: normalize_date("exposure_pre_end", self.exposure_pre_end.as_deref())?,
            exposure_main_start: normalize_date(
                "exposure_main_start",
                self.exposure_main_start.as_deref(),
            )?,
            exposure_main_end: normalize_date(
                "exposure_main_end",
                self.exposure_main_end.as_deref(),
            )?,
            status: normalize_int(self.status.as_ref(), 1),
            // Missing message is an empty string, unlike dates which go NULL
            status_message: self.status_message.unwrap_or_default(),
            title: non_blank(self.title),
            description: non_blank(self.description),
            kind: non_blank(self.kind),
        })
    }
}

/// Event manager
#[derive(Clone)]
pub struct EventManager {
    db: SqlitePool,
    timeout: Duration,
}

impl EventManager {
    pub fn new(db: SqlitePool, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub async fn list(&self, query: &ListQuery) -> ApiResult<Page<Event>> {
        fetch_page(&self.db, self.timeout, &EVENT_LISTING, query).await
    }

    pub async fn get(&self, id: i64) -> ApiResult<Event> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, Event>("SELECT * FROM event WHERE id = ? LIMIT 1")
                .bind(id)
                .fetch_optional(&self.db),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))
    }

    /// Insert an event and return its id
    pub async fn create(&self, draft: &EventDraft) -> ApiResult<i64> {
        let now = Utc::now().naive_utc();

        let result = with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO event
                    (title, description, kind, event_date, status, status_message,
                     join_start, join_end, exposure_pre_start, exposure_pre_end,
                     exposure_main_start, exposure_main_end, createdat, updatedat)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.kind)
            .bind(draft.event_date)
            .bind(draft.status)
            .bind(&draft.status_message)
            .bind(draft.join_start)
            .bind(draft.join_end)
            .bind(draft.exposure_pre_start)
            .bind(draft.exposure_pre_end)
            .bind(draft.exposure_main_start)
            .bind(draft.exposure_main_end)
            .bind(now)
            .bind(now)
            .execute(&self.db),
        )
        .await?;

        let id = result.last_insert_rowid();
        tracing::info!(event_id = id, "Event created");

        Ok(id)
    }

    /// Overwrite an event.
    ///
    /// Only rows whose stored values differ are touched, so a body identical
    /// to the stored row changes nothing and reports NotFound just like a
    /// missing id.
    pub async fn update(&self, id: i64, draft: &EventDraft) -> ApiResult<()> {
        let result = with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                UPDATE event SET
                    title = ?1, description = ?2, kind = ?3, event_date = ?4,
                    status = ?5, status_message = ?6,
                    join_start = ?7, join_end = ?8,
                    exposure_pre_start = ?9, exposure_pre_end = ?10,
                    exposure_main_start = ?11, exposure_main_end = ?12,
                    updatedat = ?13
                WHERE id = ?14
                  AND NOT (
                    title IS ?1 AND description IS ?2 AND kind IS ?3 AND event_date IS ?4
                    AND status IS ?5 AND status_message IS ?6
                    AND join_start IS ?7 AND join_end IS ?8
                    AND exposure_pre_start IS ?9 AND exposure_pre_end IS ?10
                    AND exposure_main_start IS ?11 AND exposure_main_end IS ?12
                  )
                "#,
            )
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.kind)
            .bind(draft.event_date)
            .bind(draft.status)
            .bind(&draft.status_message)
            .bind(draft.join_start)
            .bind(draft.join_end)
            .bind(draft.exposure_pre_start)
            .bind(draft.exposure_pre_end)
            .bind(draft.exposure_main_start)
            .bind(draft.exposure_main_end)
            .bind(Utc::now().naive_utc())
            .bind(id)
            .execute(&self.db),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(
                "Event not found or no changes made".to_string(),
            ));
        }

        tracing::info!(event_id = id, "Event updated");

        Ok(())
    }
}
