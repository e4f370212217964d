//! Payment API handlers: reservations, confirmation, provider webhooks.

use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use gameon::game::models::GameParticipant;
use gameon::payments::{PaymentIntent, ReservationStatus};

use super::{payment_error_response, ApiError, AppState, ErrorResponse};

/// Header carrying the provider's body signature.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-webhook-signature";

#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentPayload {
    pub reference: String,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub reference: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Reserve an entry-fee charge for the authenticated user.
///
/// Returns the provider reference and client secret the frontend needs
/// to complete the charge.
pub async fn create_reservation(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
    Path(game_id): Path<i64>,
) -> Result<(StatusCode, Json<PaymentIntent>), ApiError> {
    let intent = state
        .payments
        .create_reservation(game_id, user_id)
        .await
        .map_err(payment_error_response)?;

    metrics::counter!("payment_reservations_total").increment(1);
    Ok((StatusCode::CREATED, Json(intent)))
}

/// Confirm a completed charge. Safe to retry; a second confirmation of a
/// paid entry is a no-op.
pub async fn confirm_payment(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
    Path(game_id): Path<i64>,
    Json(payload): Json<ConfirmPaymentPayload>,
) -> Result<Json<GameParticipant>, ApiError> {
    let participant = state
        .payments
        .confirm_payment(game_id, user_id, &payload.reference)
        .await
        .map_err(payment_error_response)?;

    metrics::counter!("payments_confirmed_total").increment(1);
    Ok(Json(participant))
}

/// Compute the expected webhook signature: hex(sha256(secret || body)).
fn webhook_signature(secret: &str, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(body);
    hex::encode(hasher.finalize())
}

/// Receive a payment notification from the provider.
///
/// The raw body must carry a valid signature in `x-webhook-signature`.
/// Notifications for unknown references are acknowledged and dropped so
/// the provider stops redelivering them.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("missing webhook signature"))?;

    let expected = webhook_signature(&state.webhook_secret, &body);
    if signature != expected {
        metrics::counter!("webhook_signature_failures_total").increment(1);
        crate::logging::log_security_event(
            "webhook_signature_mismatch",
            None,
            "payment webhook rejected",
        );
        return Err(unauthorized("invalid webhook signature"));
    }

    let payload: WebhookPayload = serde_json::from_slice(&body).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "malformed webhook body".to_string(),
                code: "validation_error".to_string(),
            }),
        )
    })?;

    let status = match ReservationStatus::parse(&payload.status) {
        Some(status) => status,
        None => {
            tracing::warn!("webhook with unknown status {:?}", payload.status);
            return Ok(Json(WebhookAck { received: true }));
        }
    };

    state
        .payments
        .handle_notification(&payload.reference, status)
        .await
        .map_err(payment_error_response)?;

    metrics::counter!("webhooks_processed_total").increment(1);
    Ok(Json(WebhookAck { received: true }))
}

fn unauthorized(message: &str) -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
            code: "invalid_signature".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_stable_hex_sha256() {
        let sig = webhook_signature("secret", b"{}");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(sig, webhook_signature("secret", b"{}"));
        assert_ne!(sig, webhook_signature("other", b"{}"));
        assert_ne!(sig, webhook_signature("secret", b"{} "));
    }
}
