//! Earnings and referral API handlers.

use axum::{
    extract::{Extension, State},
    Json,
};
use serde::Serialize;

use gameon::game::models::{Earning, Referral};
use gameon::Cents;

use super::{game_error_response, ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct EarningsResponse {
    pub total: Cents,
    pub earnings: Vec<Earning>,
}

#[derive(Debug, Serialize)]
pub struct ReferralsResponse {
    pub total_earnings: Cents,
    pub referrals: Vec<Referral>,
}

/// The authenticated user's earnings ledger with its running total.
pub async fn list_earnings(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
) -> Result<Json<EarningsResponse>, ApiError> {
    let earnings = state
        .store
        .list_earnings(user_id)
        .await
        .map_err(game_error_response)?;
    let total = state
        .store
        .sum_earnings(user_id)
        .await
        .map_err(game_error_response)?;

    Ok(Json(EarningsResponse { total, earnings }))
}

/// The authenticated user's referrals and what they have earned from them.
pub async fn list_referrals(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
) -> Result<Json<ReferralsResponse>, ApiError> {
    let referrals = state
        .store
        .list_referrals(user_id)
        .await
        .map_err(game_error_response)?;
    let total_earnings = referrals.iter().map(|r| r.earnings).sum();

    Ok(Json(ReferralsResponse {
        total_earnings,
        referrals,
    }))
}
