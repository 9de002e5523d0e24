/// Health check endpoint
///
/// Reports the service version plus a database round trip. A failing
/// database yields 503 so load balancers can drain the instance.
use crate::{context::AppContext, db};
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;
use std::time::Instant;

/// Health status response
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// "healthy" or "unhealthy"
    pub status: &'static str,
    pub version: String,
    pub database: ComponentHealth,
}

/// Health of a single dependency
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub status: &'static str,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Build health check routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(ctx): State<AppContext>) -> (StatusCode, Json<HealthStatus>) {
    let started = Instant::now();
    let round_trip = db::with_timeout(
        ctx.config.database.statement_timeout(),
        sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&ctx.db),
    )
    .await;
    let response_time_ms = started.elapsed().as_millis() as u64;

    let database = match round_trip {
        Ok(_) => ComponentHealth {
            status: "healthy",
            response_time_ms,
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health check query failed");
            ComponentHealth {
                status: "unhealthy",
                response_time_ms,
                // Raw driver text only leaves the process in development
                error: ctx.config.service.development.then(|| e.to_string()),
            }
        }
    };

    let (code, status) = if database.status == "healthy" {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        code,
        Json(HealthStatus {
            status,
            version: ctx.config.service.version.clone(),
            database,
        }),
    )
}
