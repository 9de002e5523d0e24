/// User endpoints
use crate::{
    admin::{status::parse_status, users::USER_LISTING, ListParams},
    api::{
        middleware::{json_rejection, parse_id},
        StatusUpdateRequest,
    },
    auth::AuthContext,
    context::AppContext,
    db::models::User,
    error::ApiResult,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde_json::json;

/// Build user routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/:id/status", put(update_user_status))
}

async fn list_users(
    State(ctx): State<AppContext>,
    _auth: AuthContext,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let query = USER_LISTING.resolve(&params, ctx.config.listing.max_limit);
    let page = ctx.users.list(&query).await?;

    Ok(Json(page.to_json("users")))
}

async fn get_user(
    State(ctx): State<AppContext>,
    _auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id)?;

    Ok(Json(ctx.users.get(id).await?))
}

async fn update_user_status(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<String>,
    body: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = parse_id(&id)?;
    let Json(req) = body.map_err(json_rejection)?;
    let status = parse_status(req.status.as_ref())?;

    let change = ctx.users.set_status(id, status).await?;
    tracing::info!(
        user_id = id,
        status = change.status,
        operator = auth.claims.id,
        privilege = auth.privilege().as_str(),
        "User status updated"
    );

    Ok(Json(json!({
        "success": true,
        "message": "User status updated successfully",
        "userId": change.id,
        "newStatus": change.status,
        "newStatusMessage": change.status_message,
    })))
}
