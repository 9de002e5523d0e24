/// Operator accounts and the login flow
use sqlx::SqlitePool;
use std::time::Duration;

use crate::auth::{password, privilege, PrivilegeLevel};
use crate::db::{models::OperatorAccount, with_timeout};
use crate::error::{ApiError, ApiResult};

/// Operator account manager
#[derive(Clone)]
pub struct OperatorManager {
    db: SqlitePool,
    timeout: Duration,
}

impl OperatorManager {
    pub fn new(db: SqlitePool, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub async fn find_by_username(&self, username: &str) -> ApiResult<Option<OperatorAccount>> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, OperatorAccount>(
                "SELECT id, username, pw_hash, email, level, status FROM \"user\" WHERE username = ? LIMIT 1",
            )
            .bind(username)
            .fetch_optional(&self.db),
        )
        .await
    }

    /// Check credentials and the login privilege threshold.
    ///
    /// Order matters for the status codes clients see: missing input (400),
    /// unknown user (404), bad password (401), insufficient level (403).
    pub async fn authenticate(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> ApiResult<OperatorAccount> {
        let (Some(username), Some(password)) = (
            username.filter(|u| !u.is_empty()),
            password.filter(|p| !p.is_empty()),
        ) else {
            return Err(ApiError::Validation(
                "Username and password are required".to_string(),
            ));
        };

        let account = self
            .find_by_username(username)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if !password::verify_password_blocking(password, &account.pw_hash).await? {
            tracing::warn!(username, "Login rejected: invalid password");
            return Err(ApiError::Authentication("Invalid password".to_string()));
        }

        if !PrivilegeLevel::from_level(account.level).can_act_as(privilege::LOGIN_REQUIRED) {
            tracing::warn!(username, level = account.level, "Login rejected: insufficient level");
            return Err(ApiError::Authorization(
                "Forbidden: superadmin only".to_string(),
            ));
        }

        // Account status is not part of the login gate; a suspended operator
        // still receives a token, so make it visible.
        if account.status != 1 {
            tracing::warn!(
                account_id = account.id,
                status = account.status,
                "Operator with non-active status logged in"
            );
        }

        tracing::info!(account_id = account.id, "Operator logged in");

        Ok(account)
    }

    /// Create a superadmin unless the username already exists.
    ///
    /// Returns whether an account was created. Existing accounts, including
    /// their password, are left untouched.
    pub async fn ensure_superadmin(&self, username: &str, password: &str) -> ApiResult<bool> {
        if self.find_by_username(username).await?.is_some() {
            return Ok(false);
        }

        self.create(username, password, None, privilege::SUPERADMIN_LEVEL)
            .await?;

        Ok(true)
    }

    /// Create an operator account with a hashed password
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
        level: i64,
    ) -> ApiResult<i64> {
        let pw_hash = password::hash_password(password)?;
        let now = chrono::Utc::now().naive_utc();

        let result = with_timeout(
            self.timeout,
            sqlx::query(
                "INSERT INTO \"user\" (username, pw_hash, email, level, status, status_message, createdat, updatedat)
                 VALUES (?, ?, ?, ?, 1, 'Active', ?, ?)",
            )
            .bind(username)
            .bind(&pw_hash)
            .bind(email)
            .bind(level)
            .bind(now)
            .bind(now)
            .execute(&self.db),
        )
        .await?;

        Ok(result.last_insert_rowid())
    }
}
