/// Rate Limiting System
///
/// Two process-wide buckets: one for the session routes under `/api/`
/// (login runs an Argon2 verify per call), one for everything else.
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use serde::{Deserialize, Serialize};
use std::{num::NonZeroU32, sync::Arc};

/// Rate limiter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per second on login, verify-token and logout
    pub session_rps: u32,
    pub session_burst: u32,
    /// Requests per second on the resource routes
    pub api_rps: u32,
    pub api_burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            session_rps: 5,
            session_burst: 10,
            api_rps: 100,
            api_burst: 200,
        }
    }
}

type DirectLimiter = GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>;

fn quota(rps: u32, burst: u32) -> Quota {
    Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN))
        .allow_burst(NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN))
}

/// Rate limiter manager
#[derive(Clone)]
pub struct RateLimiter {
    session: Arc<DirectLimiter>,
    api: Arc<DirectLimiter>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            session: Arc::new(GovernorLimiter::direct(quota(
                config.session_rps,
                config.session_burst,
            ))),
            api: Arc::new(GovernorLimiter::direct(quota(config.api_rps, config.api_burst))),
        }
    }

    pub fn check_session(&self) -> Result<(), ApiError> {
        self.session.check().map_err(|_| ApiError::RateLimited)
    }

    pub fn check_api(&self) -> Result<(), ApiError> {
        self.api.check().map_err(|_| ApiError::RateLimited)
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(ctx): State<crate::context::AppContext>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path();

    let result = if path.starts_with("/api/") {
        ctx.rate_limiter.check_session()
    } else if path == "/health" {
        Ok(())
    } else {
        ctx.rate_limiter.check_api()
    };

    if let Err(e) = result {
        tracing::warn!(path = %path, "Rate limit exceeded");
        return Err(e);
    }

    Ok(next.run(request).await)
}
