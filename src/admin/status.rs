/// Status transitions for moderated resources (items, users)
///
/// The stored `status_message` is always derived from the numeric status;
/// clients never supply it on this path.
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use std::time::Duration;

use crate::db::with_timeout;
use crate::error::{ApiError, ApiResult};

/// Which message table to derive from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSubject {
    Item,
    User,
}

impl StatusSubject {
    fn table(&self) -> &'static str {
        match self {
            StatusSubject::Item => "item",
            StatusSubject::User => "\"user\"",
        }
    }

    pub fn not_found_message(&self) -> &'static str {
        match self {
            StatusSubject::Item => "Item not found",
            StatusSubject::User => "User not found",
        }
    }

    /// Canonical message for a status value
    pub fn message_for(&self, status: i64) -> &'static str {
        match (self, status) {
            (StatusSubject::Item, 1) => "Approved",
            (StatusSubject::Item, 2) => "Banned / Archived / Hidden",
            (StatusSubject::Item, 0) => "Deactivated / Hidden",
            (StatusSubject::User, 1) => "Active",
            (StatusSubject::User, 2) => "Suspended / Banned",
            (StatusSubject::User, 0) => "Deactivated",
            _ => "Unknown",
        }
    }
}

/// Outcome of a successful transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub id: i64,
    pub status: i64,
    pub status_message: &'static str,
}

/// Parse the `status` field of a request body.
///
/// Accepts JSON integers and integer strings.
pub fn parse_status(value: Option<&serde_json::Value>) -> ApiResult<i64> {
    let value = match value {
        None | Some(serde_json::Value::Null) => {
            return Err(ApiError::Validation("Missing status value".to_string()))
        }
        Some(v) => v,
    };

    let parsed = match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| ApiError::Validation("Invalid status value".to_string()))
}

/// Write a new status and its derived message
pub async fn apply_status(
    db: &SqlitePool,
    timeout: Duration,
    subject: StatusSubject,
    id: i64,
    status: i64,
) -> ApiResult<StatusChange> {
    let status_message = subject.message_for(status);
    let sql = format!(
        "UPDATE {} SET status = ?, status_message = ?, updatedat = ? WHERE id = ?",
        subject.table()
    );

    let result = with_timeout(
        timeout,
        sqlx::query(&sql)
            .bind(status)
            .bind(status_message)
            .bind(Utc::now().naive_utc())
            .bind(id)
            .execute(db),
    )
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(subject.not_found_message().to_string()));
    }

    tracing::info!(
        table = subject.table(),
        id,
        status,
        status_message,
        "Status updated"
    );

    Ok(StatusChange {
        id,
        status,
        status_message,
    })
}
