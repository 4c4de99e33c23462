/// Integration tests for the Worklane API
///
/// These tests exercise the router end-to-end: session authentication,
/// the task lifecycle over HTTP, invite error mapping, and the audit log.
/// Database-backed tests are skipped when DATABASE_URL is not set.
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::Service as _;

use common::TestContext;
use worklane_api::app::{build_router, AppState};

async fn send(
    app: &mut axum::Router,
    request: Request<Body>,
) -> (StatusCode, serde_json::Value) {
    let response = app.call(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Requests without a session token never reach a handler
#[tokio::test]
async fn test_missing_token_rejected() {
    // A lazy pool is enough: the middleware rejects before any query
    let db = sqlx::PgPool::connect_lazy("postgresql://localhost/unused").unwrap();
    let state = AppState::new(db, common::test_config("postgresql://localhost/unused".into()));
    let mut app = build_router(state);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/board")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let db = sqlx::PgPool::connect_lazy("postgresql://localhost/unused").unwrap();
    let state = AppState::new(db, common::test_config("postgresql://localhost/unused".into()));
    let mut app = build_router(state);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/board")
        .header("authorization", "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let Some(ctx) = TestContext::new().await else { return };
    let mut app = ctx.app.clone();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_task_lifecycle_over_http() {
    let Some(ctx) = TestContext::new().await else { return };
    let mut app = ctx.app.clone();

    // Create
    let request = Request::builder()
        .method("POST")
        .uri("/v1/tasks")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "title": "Ship it",
                "description": "tracking #release",
                "tags": ["infra"]
            })
            .to_string(),
        ))
        .unwrap();

    let (status, task) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "Todo");
    assert_eq!(task["human_id"], "GEN-1");
    assert_eq!(task["tags"], json!(["infra", "release"]));

    let task_id = task["id"].as_str().unwrap().to_string();

    // Partial update: rename and clear the (unset) assignee sentinel path
    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/v1/tasks/{}", task_id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "title": "Ship it now", "assignee_id": "" }).to_string(),
        ))
        .unwrap();

    let (status, updated) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Ship it now");
    assert!(updated["assignee_id"].is_null());

    // Move
    let request = Request::builder()
        .method("POST")
        .uri(format!("/v1/tasks/{}/move", task_id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "status": "In Progress", "sort_order": 3 }).to_string(),
        ))
        .unwrap();

    let (status, moved) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["status"], "In Progress");

    // The board shows it in the right column
    let request = Request::builder()
        .method("GET")
        .uri("/v1/board")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let (status, board) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
    let in_progress = board
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["status"] == "In Progress")
        .unwrap();
    assert_eq!(in_progress["tasks"].as_array().unwrap().len(), 1);

    // Trash it
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/tasks/{}", task_id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/trash")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let (status, trash) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trash.as_array().unwrap().len(), 1);

    // Purge
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/tasks/{}/purge", task_id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["purged"], true);

    // Purged tasks 404
    let request = Request::builder()
        .method("POST")
        .uri(format!("/v1/tasks/{}/restore", task_id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors() {
    let Some(ctx) = TestContext::new().await else { return };
    let mut app = ctx.app.clone();

    // Empty title fails the request validator
    let request = Request::builder()
        .method("POST")
        .uri("/v1/tasks")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "title": "" }).to_string()))
        .unwrap();

    let (status, body) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    // Unknown status string fails domain validation
    let request = Request::builder()
        .method("POST")
        .uri("/v1/tasks")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "title": "ok", "status": "Archived" }).to_string(),
        ))
        .unwrap();

    let (status, _) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_invite_error_mapping() {
    let Some(ctx) = TestContext::new().await else { return };
    let mut app = ctx.app.clone();

    // Unknown token maps to 400
    let request = Request::builder()
        .method("POST")
        .uri("/v1/invites/redeem")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "token": "deadbeef", "username": "ghost" }).to_string(),
        ))
        .unwrap();

    let (status, body) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_invite_round_trip_over_http() {
    let Some(ctx) = TestContext::new().await else { return };
    let mut app = ctx.app.clone();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/v1/orgs/{}/invites", ctx.org.id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let (status, invite) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
    let token = invite["token"].as_str().unwrap();
    assert_eq!(invite["link"], format!("/invite/{}", token));

    // A second user redeems it
    let joiner = TestContext::new().await.unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/invites/redeem")
        .header("authorization", joiner.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "token": token, "username": "newcomer" }).to_string(),
        ))
        .unwrap();

    let (status, membership) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(membership["username"], "newcomer");

    // The roster now lists both members
    let request = Request::builder()
        .method("GET")
        .uri(format!("/v1/orgs/{}/members", ctx.org.id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let (status, members) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_logs_endpoint() {
    let Some(ctx) = TestContext::new().await else { return };
    let mut app = ctx.app.clone();

    // Creating a task writes an audit entry
    let request = Request::builder()
        .method("POST")
        .uri("/v1/tasks")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "title": "Audited" }).to_string()))
        .unwrap();

    let (status, _) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/logs?page=1")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let (status, page) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
    let entries = page["entries"].as_array().unwrap();
    assert!(!entries.is_empty());
    assert_eq!(entries[0]["action"], "created task");
}
