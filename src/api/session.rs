/// Session endpoints: login, token verification, logout
use crate::{
    api::middleware::{extract_bearer_token, json_rejection},
    auth::TokenError,
    context::AppContext,
    db::models::OperatorView,
    error::ApiResult,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Build session routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/verify-token", post(verify_token))
        .route("/api/logout", post(logout))
}

#[derive(Debug, Default, Deserialize)]
struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    user: OperatorView,
}

/// Authenticate an operator and hand back a signed token
async fn login(
    State(ctx): State<AppContext>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = body.map_err(json_rejection)?;

    let account = ctx
        .operators
        .authenticate(req.username.as_deref(), req.password.as_deref())
        .await?;

    let (token, _claims) = ctx.tokens.issuer().issue(&account)?;

    Ok(Json(LoginResponse {
        token,
        user: OperatorView::from(&account),
    }))
}

/// Report whether the bearer token is currently accepted
async fn verify_token(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let result = match extract_bearer_token(&headers) {
        Some(token) => ctx.tokens.verify(&token).await,
        None => Err(TokenError::Missing),
    };

    match result {
        Ok(claims) => Json(json!({ "valid": true, "decoded": claims })),
        Err(e) => Json(json!({
            "valid": false,
            "reason": e.reason(),
            "message": e.to_string(),
        })),
    }
}

/// Revoke the presented token, if any
async fn logout(State(ctx): State<AppContext>, headers: HeaderMap) -> Json<serde_json::Value> {
    if let Some(token) = extract_bearer_token(&headers) {
        ctx.tokens.revoke(&token).await;
    }

    Json(json!({ "ok": true }))
}
