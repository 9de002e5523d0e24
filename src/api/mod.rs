/// API routes and handlers
pub mod api_keys;
pub mod events;
pub mod health;
pub mod items;
pub mod middleware;
pub mod session;
pub mod users;

use crate::context::AppContext;
use axum::Router;
use serde::Deserialize;

/// Body of the item and user status routes
#[derive(Debug, Default, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<serde_json::Value>,
}

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(health::routes())
        .merge(session::routes())
        .merge(events::routes())
        .merge(items::routes())
        .merge(users::routes())
        .merge(api_keys::routes())
}
