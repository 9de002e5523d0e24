/// Event endpoints
use crate::{
    admin::{events::EVENT_LISTING, EventInput, ListParams},
    api::middleware::{json_rejection, parse_id},
    auth::AuthContext,
    context::AppContext,
    db::models::Event,
    error::ApiResult,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde_json::json;

/// Build event routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id", get(get_event).put(update_event))
}

async fn list_events(
    State(ctx): State<AppContext>,
    _auth: AuthContext,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let query = EVENT_LISTING.resolve(&params, ctx.config.listing.max_limit);
    let page = ctx.events.list(&query).await?;

    Ok(Json(page.to_json("events")))
}

async fn get_event(
    State(ctx): State<AppContext>,
    _auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Event>> {
    let id = parse_id(&id)?;

    Ok(Json(ctx.events.get(id).await?))
}

async fn create_event(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    body: Result<Json<EventInput>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Json(input) = body.map_err(json_rejection)?;
    let draft = input.normalize()?;

    let id = ctx.events.create(&draft).await?;
    tracing::info!(
        event_id = id,
        operator = auth.claims.id,
        privilege = auth.privilege().as_str(),
        "Event created"
    );

    Ok(Json(json!({ "message": "Event created successfully!", "id": id })))
}

async fn update_event(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<String>,
    body: Result<Json<EventInput>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = parse_id(&id)?;
    let Json(input) = body.map_err(json_rejection)?;
    let draft = input.normalize()?;

    ctx.events.update(id, &draft).await?;
    tracing::info!(
        event_id = id,
        operator = auth.claims.id,
        privilege = auth.privilege().as_str(),
        "Event updated"
    );

    Ok(Json(json!({ "message": "Event updated successfully!" })))
}
