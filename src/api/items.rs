/// Item endpoints
use crate::{
    admin::{items::ITEM_LISTING, status::parse_status, ListParams},
    api::{
        middleware::{json_rejection, parse_id},
        StatusUpdateRequest,
    },
    auth::AuthContext,
    context::AppContext,
    db::models::Item,
    error::ApiResult,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

/// Build item routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/items", get(list_items))
        .route("/items/:id", get(get_item))
        .route("/items/:id/status", put(update_item_status))
}

#[derive(Debug, Default, Deserialize)]
struct ItemListQuery {
    #[serde(flatten)]
    params: ListParams,
    user_id: Option<String>,
}

async fn list_items(
    State(ctx): State<AppContext>,
    _auth: AuthContext,
    Query(query): Query<ItemListQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    // Non-numeric owner filters are ignored rather than rejected
    let owner = query
        .user_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok());

    let resolved = ITEM_LISTING.resolve(&query.params, ctx.config.listing.max_limit);
    let page = ctx.items.list(resolved, owner).await?;

    Ok(Json(page.to_json("items")))
}

async fn get_item(
    State(ctx): State<AppContext>,
    _auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Item>> {
    let id = parse_id(&id)?;

    Ok(Json(ctx.items.get(id).await?))
}

async fn update_item_status(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<String>,
    body: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = parse_id(&id)?;
    let Json(req) = body.map_err(json_rejection)?;
    let status = parse_status(req.status.as_ref())?;

    let change = ctx.items.set_status(id, status).await?;
    tracing::info!(
        item_id = id,
        status = change.status,
        operator = auth.claims.id,
        privilege = auth.privilege().as_str(),
        "Item status updated"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Item status updated successfully",
        "itemId": change.id,
        "newStatus": change.status,
        "newStatusMessage": change.status_message,
    })))
}
