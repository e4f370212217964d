//! HTTP API for the GameOn server.
//!
//! REST surface over the core managers:
//!
//! - [`auth`]: registration and login
//! - [`games`]: game CRUD, joining, status transitions, settlement
//! - [`payments`]: entry-fee reservations, confirmation, provider webhooks
//! - [`earnings`]: per-user earnings and referral summaries
//! - [`middleware`]: JWT bearer authentication for protected routes
//! - [`request_id`]: request correlation ids
//!
//! # Endpoints
//!
//! ```text
//! GET  /health                              - Health check (public)
//! POST /api/v1/auth/register                - Register user (public)
//! POST /api/v1/auth/login                   - Login (public)
//! GET  /api/v1/game-types                   - List game types (public)
//! GET  /api/v1/tournament-structures        - List structures (public)
//! GET  /api/v1/games[?status=...]           - List games (public)
//! GET  /api/v1/games/{id}                   - Game details (public)
//! GET  /api/v1/games/{id}/participants      - Participant list (public)
//! POST /api/v1/games                        - Create game (auth)
//! POST /api/v1/games/{id}/join              - Join game (auth)
//! PATCH /api/v1/games/{id}/status           - Change status (auth, master only)
//! POST /api/v1/games/{id}/complete          - Settle winner payouts (auth, master only)
//! POST /api/v1/games/{id}/pay               - Reserve entry-fee charge (auth)
//! POST /api/v1/games/{id}/pay/confirm       - Confirm payment (auth)
//! GET  /api/v1/games/mine                   - Games I joined (auth)
//! GET  /api/v1/games/created                - Games I created (auth)
//! GET  /api/v1/earnings                     - My earnings ledger (auth)
//! GET  /api/v1/referrals                    - My referrals (auth)
//! POST /webhooks/payments                   - Provider notifications (signed)
//! ```

pub mod auth;
pub mod earnings;
pub mod games;
pub mod middleware;
pub mod payments;
pub mod request_id;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use gameon::{
    auth::AuthManager, db::GameStore, GameError, GameManager, PaymentCoordinator, PaymentError,
    SettlementManager,
};

/// Application state shared across all handlers.
///
/// Cloned per request; every field is an `Arc` or a cheap manager handle.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub game_manager: GameManager,
    pub payments: PaymentCoordinator,
    pub settlement: SettlementManager,
    pub store: Arc<dyn GameStore>,
    /// Shared secret the payment provider signs webhook bodies with.
    pub webhook_secret: String,
}

/// Standard error body: a client-safe message plus a stable code.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

fn game_error_status(err: &GameError) -> StatusCode {
    match err {
        GameError::Validation(_) | GameError::Payout(_) => StatusCode::BAD_REQUEST,
        GameError::GameNotFound(_)
        | GameError::UserNotFound(_)
        | GameError::ParticipantNotFound { .. } => StatusCode::NOT_FOUND,
        GameError::GameFull
        | GameError::AlreadyJoined
        | GameError::GameNotJoinable(_)
        | GameError::InvalidTransition { .. }
        | GameError::AlreadySettled(_) => StatusCode::CONFLICT,
        GameError::NotAuthorized => StatusCode::FORBIDDEN,
        GameError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn game_error_response(err: GameError) -> ApiError {
    let status = game_error_status(&err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("internal error: {err}");
    }
    (
        status,
        Json(ErrorResponse {
            error: err.client_message(),
            code: err.code().to_string(),
        }),
    )
}

pub(crate) fn payment_error_response(err: PaymentError) -> ApiError {
    let status = match &err {
        PaymentError::NotJoined { .. } | PaymentError::UnknownReservation(_) => {
            StatusCode::NOT_FOUND
        }
        PaymentError::AlreadyPaid => StatusCode::CONFLICT,
        PaymentError::PaymentNotCompleted => StatusCode::PAYMENT_REQUIRED,
        PaymentError::Provider(_) => StatusCode::BAD_GATEWAY,
        PaymentError::Store(inner) => game_error_status(inner),
    };
    if status.is_server_error() {
        tracing::error!("payment error: {err}");
    }
    (
        status,
        Json(ErrorResponse {
            error: err.client_message(),
            code: err.code().to_string(),
        }),
    )
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    let root_routes = Router::new()
        .route("/health", get(health_check))
        // Signed by the provider, not by a user token.
        .route("/webhooks/payments", post(payments::payment_webhook));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/game-types", get(games::list_game_types))
        .route("/tournament-structures", get(games::list_structures))
        .route("/games", get(games::list_games))
        .route("/games/{game_id}", get(games::get_game))
        .route("/games/{game_id}/participants", get(games::list_participants));

    let protected_routes = Router::new()
        .route("/games", post(games::create_game))
        .route("/games/mine", get(games::my_games))
        .route("/games/created", get(games::created_games))
        .route("/games/{game_id}/join", post(games::join_game))
        .route("/games/{game_id}/status", patch(games::update_status))
        .route("/games/{game_id}/complete", post(games::complete_game))
        .route("/games/{game_id}/pay", post(payments::create_reservation))
        .route(
            "/games/{game_id}/pay/confirm",
            post(payments::confirm_payment),
        )
        .route("/earnings", get(earnings::list_earnings))
        .route("/referrals", get(earnings::list_referrals))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Probes the store and returns `200 OK` when healthy, `503` otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = state.store.ping().await.is_ok();

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
