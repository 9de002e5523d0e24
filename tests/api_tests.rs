/// End-to-end tests driving the full router
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use backoffice_api::{
    config::{AuthConfig, DatabaseConfig, ListingConfig, LoggingConfig, ServiceConfig},
    db,
    rate_limit::RateLimitConfig,
    server, AppContext, ServerConfig,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn config() -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "127.0.0.1".to_string(),
            port: 0,
            version: "test".to_string(),
            development: false,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            statement_timeout_secs: 5,
        },
        authentication: AuthConfig {
            jwt_secret: "integration-secret-key-0123456789abcdef".to_string(),
            token_ttl_hours: 8,
            revocation_sweep_secs: 300,
            bootstrap: None,
        },
        listing: ListingConfig { max_limit: 500 },
        rate_limit: RateLimitConfig {
            session_rps: 100,
            session_burst: 100,
            api_rps: 1000,
            api_burst: 1000,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            json: false,
        },
    }
}

async fn setup() -> (AppContext, Router) {
    setup_with(config()).await
}

async fn setup_with(config: ServerConfig) -> (AppContext, Router) {
    let pool = db::connect_in_memory().await.unwrap();
    let ctx = AppContext::with_pool(config, pool).unwrap();

    ctx.operators
        .create("root", "correct-horse", Some("root@example.com"), 90)
        .await
        .unwrap();
    ctx.operators
        .create("admin1", "pass1234", None, 2)
        .await
        .unwrap();

    let app = server::build_router(ctx.clone());
    (ctx, app)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/admin/login",
        None,
        Some(json!({ "username": "root", "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_login_success_returns_token_and_profile() {
    let (_ctx, app) = setup().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/login",
        None,
        Some(json!({ "username": "root", "password": "correct-horse" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["username"], "root");
    assert_eq!(body["user"]["email"], "root@example.com");
    assert_eq!(body["user"]["level"], 90);
    assert!(body["user"].get("pw_hash").is_none());
}

#[tokio::test]
async fn test_login_failures() {
    let (_ctx, app) = setup().await;

    let cases = [
        (json!({ "username": "root" }), StatusCode::BAD_REQUEST, "Username and password are required"),
        (json!({ "username": "ghost", "password": "x" }), StatusCode::NOT_FOUND, "User not found"),
        (json!({ "username": "root", "password": "wrong" }), StatusCode::UNAUTHORIZED, "Invalid password"),
        (json!({ "username": "admin1", "password": "pass1234" }), StatusCode::FORBIDDEN, "Forbidden: superadmin only"),
    ];

    for (body, expected_status, expected_error) in cases {
        let (status, response) =
            send(&app, Method::POST, "/api/admin/login", None, Some(body)).await;
        assert_eq!(status, expected_status);
        assert_eq!(response["error"], expected_error);
        assert!(response.get("token").is_none());
    }
}

#[tokio::test]
async fn test_verify_token() {
    let (_ctx, app) = setup().await;
    let token = login(&app).await;

    let (status, body) = send(&app, Method::POST, "/api/verify-token", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["decoded"]["username"], "root");
    assert_eq!(
        body["decoded"]["exp"].as_i64().unwrap() - body["decoded"]["iat"].as_i64().unwrap(),
        8 * 3600
    );

    let (_, body) = send(&app, Method::POST, "/api/verify-token", None, None).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["reason"], "missing");

    let (_, body) = send(&app, Method::POST, "/api/verify-token", Some("not.a.jwt"), None).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["reason"], "invalid");
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let (ctx, app) = setup().await;
    let token = login(&app).await;

    let (status, body) = send(&app, Method::GET, "/events", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (status, body) = send(&app, Method::POST, "/api/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
    assert_eq!(ctx.tokens.revocations().len().await, 1);

    let (_, body) = send(&app, Method::POST, "/api/verify-token", Some(&token), None).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["reason"], "revoked");

    let (status, body) = send(&app, Method::GET, "/events", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token revoked");
}

#[tokio::test]
async fn test_logout_without_token_is_ok() {
    let (ctx, app) = setup().await;

    let (status, body) = send(&app, Method::POST, "/api/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    send(&app, Method::POST, "/api/logout", Some("garbage"), None).await;
    assert!(ctx.tokens.revocations().is_empty().await);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (_ctx, app) = setup().await;

    for uri in ["/events", "/items", "/users", "/items/1", "/admin/list/custom/sns_key/_/id/asc/0/10"] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["error"], "Missing or invalid Authorization header");
    }
}

#[tokio::test]
async fn test_missing_item_is_404() {
    let (_ctx, app) = setup().await;
    let token = login(&app).await;

    let (status, body) = send(&app, Method::GET, "/items/999999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Item not found" }));

    let (status, _) = send(&app, Method::GET, "/items/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_create_get_update() {
    let (_ctx, app) = setup().await;
    let token = login(&app).await;

    let event = json!({
        "title": "Spring Festival",
        "event_date": "2025-03-01T10:00:00.000Z",
        "join_start": "2025-02-01 09:00:00",
        "status": "2",
    });

    let (status, body) = send(&app, Method::POST, "/events", Some(&token), Some(event.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event created successfully!");
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/events/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event_date"], "2025-03-01");
    assert_eq!(body["join_start"], "2025-02-01");
    assert_eq!(body["join_end"], Value::Null);
    assert_eq!(body["status"], 2);
    assert_eq!(body["status_message"], "");

    // Identical payload changes nothing
    let (status, body) =
        send(&app, Method::PUT, &format!("/events/{}", id), Some(&token), Some(event)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Event not found or no changes made");

    let changed = json!({ "title": "Spring Festival", "event_date": "2025-03-02", "status": 2 });
    let (status, body) =
        send(&app, Method::PUT, &format!("/events/{}", id), Some(&token), Some(changed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event updated successfully!");

    let (status, _) = send(
        &app,
        Method::POST,
        "/events",
        Some(&token),
        Some(json!({ "title": "Bad", "event_date": "not-a-date" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_list_ignores_unknown_sort_column() {
    let (_ctx, app) = setup().await;
    let token = login(&app).await;

    for title in ["Charlie", "Alpha", "Bravo"] {
        send(&app, Method::POST, "/events", Some(&token), Some(json!({ "title": title }))).await;
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/events?sortBy=title%3BDROP%20TABLE%20event&sortOrder=desc",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Bravo", "Alpha", "Charlie"]);
    assert_eq!(body["total"], 3);

    let (_, body) = send(&app, Method::GET, "/events?sortBy=title&search=lph", Some(&token), None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["events"][0]["title"], "Alpha");
}

#[tokio::test]
async fn test_item_status_transitions() {
    let (ctx, app) = setup().await;
    let token = login(&app).await;

    let id = sqlx::query(
        "INSERT INTO item (user_id, name, status, createdat, updatedat)
         VALUES (7, 'poster', 1, datetime('now'), datetime('now'))",
    )
    .execute(&ctx.db)
    .await
    .unwrap()
    .last_insert_rowid();

    let uri = format!("/items/{}/status", id);

    let (status, body) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({ "status": 2 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["itemId"], id);
    assert_eq!(body["newStatus"], 2);
    assert_eq!(body["newStatusMessage"], "Banned / Archived / Hidden");

    let (status, body) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing status value");

    let (status, body) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({ "status": "abc" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid status value");

    let (_, body) = send(&app, Method::GET, "/items?user_id=7", Some(&token), None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["status_message"], "Banned / Archived / Hidden");

    let (_, body) = send(&app, Method::GET, "/items?user_id=8", Some(&token), None).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["start"], 0);
    assert_eq!(body["end"], 0);
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn test_user_status_and_listing() {
    let (ctx, app) = setup().await;
    let token = login(&app).await;

    let admin = ctx.operators.find_by_username("admin1").await.unwrap().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/users/{}/status", admin.id),
        Some(&token),
        Some(json!({ "status": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], admin.id);
    assert_eq!(body["newStatusMessage"], "Suspended / Banned");

    let (status, body) = send(&app, Method::PUT, "/users/999999/status", Some(&token), Some(json!({ "status": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (_, body) = send(&app, Method::GET, "/users?limit=1&offset=1", Some(&token), None).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["start"], 2);
    assert_eq!(body["end"], 2);
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
    assert!(body["users"][0].get("pw_hash").is_none());
}

#[tokio::test]
async fn test_api_key_path_listing() {
    let (ctx, app) = setup().await;
    let token = login(&app).await;

    for (sns_id, api_key) in [("twitter", "k1"), ("mastodon", "k2"), ("bluesky", "tw3")] {
        sqlx::query(
            "INSERT INTO sns_key (sns_id, api_key, status, createdat, updatedat)
             VALUES (?, ?, 1, datetime('now'), datetime('now'))",
        )
        .bind(sns_id)
        .bind(api_key)
        .execute(&ctx.db)
        .await
        .unwrap();
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/admin/list/custom/sns_key/_/sns_id/asc/0/10",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["list"][0]["sns_id"], "bluesky");

    let (_, body) = send(
        &app,
        Method::GET,
        "/admin/list/custom/sns_key/tw/id/desc/0/10",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["list"][0]["sns_id"], "bluesky");
    assert_eq!(body["list"][1]["sns_id"], "twitter");
}

#[tokio::test]
async fn test_unknown_route_and_health() {
    let (_ctx, app) = setup().await;

    let (status, body) = send(&app, Method::GET, "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_huge_offset_returns_empty_page() {
    let (_ctx, app) = setup().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/events?offset=9223372036854775807&limit=1",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["total"], 0);
    assert_eq!(body["start"], 0);
    assert_eq!(body["end"], 0);
    assert_eq!(body["currentPage"], i64::MAX);
    assert!(body["events"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_health_hides_database_error_outside_development() {
    let (ctx, app) = setup().await;
    ctx.db.close().await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"]["status"], "unhealthy");
    assert!(body["database"].get("error").is_none());
}

#[tokio::test]
async fn test_health_shows_database_error_in_development() {
    let mut config = config();
    config.service.development = true;
    let (ctx, app) = setup_with(config).await;
    ctx.db.close().await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["database"]["error"].is_string());
}

#[tokio::test]
async fn test_login_is_rate_limited() {
    let mut config = config();
    config.rate_limit.session_rps = 1;
    config.rate_limit.session_burst = 3;
    let (_ctx, app) = setup_with(config).await;

    let attempt = json!({ "username": "root", "password": "wrong" });
    for _ in 0..3 {
        let (status, _) =
            send(&app, Method::POST, "/api/admin/login", None, Some(attempt.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) =
        send(&app, Method::POST, "/api/admin/login", None, Some(attempt)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests");

    // Health is never throttled
    let (status, _) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
