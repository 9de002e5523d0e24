/// API key listing endpoint (path-encoded parameters)
use crate::{
    admin::api_keys::{params_from_path, API_KEY_LISTING},
    auth::AuthContext,
    context::AppContext,
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

/// Build API key routes
pub fn routes() -> Router<AppContext> {
    Router::new().route(
        "/admin/list/custom/sns_key/:search/:sort_by/:sort_order/:offset/:limit",
        get(list_api_keys),
    )
}

async fn list_api_keys(
    State(ctx): State<AppContext>,
    _auth: AuthContext,
    Path((search, sort_by, sort_order, offset, limit)): Path<(String, String, String, String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let params = params_from_path(search, sort_by, sort_order, offset, limit);
    let query = API_KEY_LISTING.resolve(&params, ctx.config.listing.max_limit);
    let page = ctx.api_keys.list(&query).await?;

    Ok(Json(page.to_json("list")))
}
