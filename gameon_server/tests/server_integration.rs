//! Integration tests for the HTTP API over the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tower::ServiceExt; // for `oneshot`

use gameon::auth::AuthManager;
use gameon::payments::{ReservationStatus, SandboxPaymentProvider};
use gameon::{GameManager, MemGameStore, PaymentCoordinator, SettlementManager};
use gameon_server::api::{create_router, AppState};

const WEBHOOK_SECRET: &str = "test_webhook_secret";

struct TestServer {
    app: axum::Router,
    provider: Arc<SandboxPaymentProvider>,
}

async fn test_server() -> TestServer {
    let store = Arc::new(MemGameStore::new());
    store.seed_defaults().await;
    let provider = Arc::new(SandboxPaymentProvider::new());
    let settlement = SettlementManager::new(store.clone());

    let state = AppState {
        auth_manager: Arc::new(AuthManager::new(
            store.clone(),
            "test_pepper_for_testing_only".to_string(),
            "test_secret_key_for_testing_only".to_string(),
        )),
        game_manager: GameManager::new(store.clone()),
        payments: PaymentCoordinator::new(store.clone(), provider.clone(), settlement.clone()),
        settlement,
        store: store.clone(),
        webhook_secret: WEBHOOK_SECRET.to_string(),
    };

    TestServer {
        app: create_router(state),
        provider,
    }
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn register(app: &axum::Router, username: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            json!({
                "username": username,
                "password": "Sup3rSecret",
                "email": format!("{username}@example.com"),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    (
        body["user_id"].as_i64().unwrap(),
        body["access_token"].as_str().unwrap().to_string(),
    )
}

async fn create_game(app: &axum::Router, token: &str) -> i64 {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/v1/games",
            Some(token),
            json!({
                "name": "Friday Pickup",
                "game_type_id": 1,
                "structure_id": 4,
                "location": "Court 3",
                "datetime": "2026-10-01T18:00:00Z",
                "max_players": 4,
                "entry_fee": 2_500,
                "payout_structure": "1:100",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["id"].as_i64().unwrap()
}

fn webhook_signature(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(WEBHOOK_SECRET.as_bytes());
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let server = test_server().await;
    let (status, body) = send(
        &server.app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn protected_routes_require_bearer_token() {
    let server = test_server().await;
    let (status, _) = send(
        &server.app,
        json_request("POST", "/api/v1/games", None, json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &server.app,
        json_request("POST", "/api/v1/games", Some("garbage"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_create_join_flow() {
    let server = test_server().await;
    let (_, master_token) = register(&server.app, "master").await;
    let (referrer_id, _) = register(&server.app, "referrer").await;
    let (_, player_token) = register(&server.app, "player").await;

    let game_id = create_game(&server.app, &master_token).await;

    let (status, participant) = send(
        &server.app,
        json_request(
            "POST",
            &format!("/api/v1/games/{game_id}/join"),
            Some(&player_token),
            json!({ "referrer_id": referrer_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(participant["has_paid"], false);

    // duplicate join conflicts
    let (status, body) = send(
        &server.app,
        json_request(
            "POST",
            &format!("/api/v1/games/{game_id}/join"),
            Some(&player_token),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "already_joined");

    let (status, games) = send(
        &server.app,
        Request::builder()
            .uri("/api/v1/games?status=scheduled")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(games.as_array().unwrap().len(), 1);
    assert_eq!(games[0]["current_players"], 1);
}

#[tokio::test]
async fn non_master_cannot_change_status() {
    let server = test_server().await;
    let (_, master_token) = register(&server.app, "master").await;
    let (_, other_token) = register(&server.app, "other").await;
    let game_id = create_game(&server.app, &master_token).await;

    let (status, body) = send(
        &server.app,
        json_request(
            "PATCH",
            &format!("/api/v1/games/{game_id}/status"),
            Some(&other_token),
            json!({ "status": "active" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "not_authorized");
}

#[tokio::test]
async fn payment_confirmation_and_earnings() {
    let server = test_server().await;
    let (_, master_token) = register(&server.app, "master").await;
    let (referrer_id, referrer_token) = register(&server.app, "referrer").await;
    let (_, player_token) = register(&server.app, "player").await;
    let game_id = create_game(&server.app, &master_token).await;

    send(
        &server.app,
        json_request(
            "POST",
            &format!("/api/v1/games/{game_id}/join"),
            Some(&player_token),
            json!({ "referrer_id": referrer_id }),
        ),
    )
    .await;

    let (status, intent) = send(
        &server.app,
        json_request(
            "POST",
            &format!("/api/v1/games/{game_id}/pay"),
            Some(&player_token),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(intent["amount"], 2_500);
    let reference = intent["reference"].as_str().unwrap().to_string();

    // confirming before the charge settles is rejected
    let (status, _) = send(
        &server.app,
        json_request(
            "POST",
            &format!("/api/v1/games/{game_id}/pay/confirm"),
            Some(&player_token),
            json!({ "reference": reference }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);

    server
        .provider
        .settle(&reference, ReservationStatus::Succeeded)
        .await
        .unwrap();
    let (status, participant) = send(
        &server.app,
        json_request(
            "POST",
            &format!("/api/v1/games/{game_id}/pay/confirm"),
            Some(&player_token),
            json!({ "reference": reference }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(participant["has_paid"], true);

    // referrer earned 10% of the $25.00 entry fee
    let (status, earnings) = send(
        &server.app,
        json_request("GET", "/api/v1/earnings", Some(&referrer_token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(earnings["total"], 250);

    let (status, referrals) = send(
        &server.app,
        json_request("GET", "/api/v1/referrals", Some(&referrer_token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(referrals["total_earnings"], 250);
    assert_eq!(referrals["referrals"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn webhook_requires_valid_signature() {
    let server = test_server().await;
    let body = json!({ "reference": "sbx_x", "status": "succeeded" }).to_string();

    // no signature
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/payments")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.clone()))
        .unwrap();
    let (status, _) = send(&server.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // wrong signature
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/payments")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-webhook-signature", "deadbeef")
        .body(Body::from(body.clone()))
        .unwrap();
    let (status, _) = send(&server.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // valid signature with an unknown reference is acknowledged
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/payments")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-webhook-signature", webhook_signature(&body))
        .body(Body::from(body))
        .unwrap();
    let (status, ack) = send(&server.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["received"], true);
}

#[tokio::test]
async fn webhook_marks_participant_paid() {
    let server = test_server().await;
    let (_, master_token) = register(&server.app, "master").await;
    let (_, player_token) = register(&server.app, "player").await;
    let game_id = create_game(&server.app, &master_token).await;

    send(
        &server.app,
        json_request(
            "POST",
            &format!("/api/v1/games/{game_id}/join"),
            Some(&player_token),
            json!({}),
        ),
    )
    .await;
    let (_, intent) = send(
        &server.app,
        json_request(
            "POST",
            &format!("/api/v1/games/{game_id}/pay"),
            Some(&player_token),
            json!({}),
        ),
    )
    .await;
    let reference = intent["reference"].as_str().unwrap().to_string();
    server
        .provider
        .settle(&reference, ReservationStatus::Succeeded)
        .await
        .unwrap();

    let body = json!({ "reference": reference, "status": "succeeded" }).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/payments")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-webhook-signature", webhook_signature(&body))
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(&server.app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, mine) = send(
        &server.app,
        json_request("GET", "/api/v1/games/mine", Some(&player_token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (_, participants) = send(
        &server.app,
        Request::builder()
            .uri(format!("/api/v1/games/{game_id}/participants"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(participants[0]["has_paid"], true);
}
