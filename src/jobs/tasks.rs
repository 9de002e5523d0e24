/// Background task implementations
use crate::{context::AppContext, db, error::ApiResult};
use chrono::Utc;

/// Drop revoked tokens whose own expiry has passed
pub async fn sweep_revoked_tokens(ctx: &AppContext) -> usize {
    ctx.tokens
        .revocations()
        .sweep_expired(Utc::now().timestamp())
        .await
}

/// Health check - verify the database answers within the statement timeout
pub async fn health_check(ctx: &AppContext) -> ApiResult<()> {
    db::with_timeout(
        ctx.config.database.statement_timeout(),
        sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&ctx.db),
    )
    .await?;

    Ok(())
}
