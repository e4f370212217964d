//! Payment data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::models::{GameId, UserId};
use crate::ledger::Cents;

/// Terminal and non-terminal states a provider reservation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Succeeded,
    Failed,
}

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Succeeded => "succeeded",
            ReservationStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<ReservationStatus> {
        match s {
            "pending" => Some(ReservationStatus::Pending),
            "succeeded" => Some(ReservationStatus::Succeeded),
            "failed" => Some(ReservationStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the provider hands back when a reservation is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderReservation {
    /// Opaque provider reference; doubles as the idempotency key
    pub reference: String,
    /// Secret the client uses to drive the provider's payment UI
    pub client_secret: String,
}

/// Persisted record correlating a provider reservation with a participant.
///
/// Webhook deliveries arrive keyed only by `reference`; this record is how
/// they find the participant to mark paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReservation {
    pub reference: String,
    pub game_id: GameId,
    pub user_id: UserId,
    pub amount: Cents,
    pub created_at: DateTime<Utc>,
}

/// Response to a reservation request: what the client needs to pay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub reference: String,
    pub client_secret: String,
    /// Entry fee being reserved, in cents
    pub amount: Cents,
}
