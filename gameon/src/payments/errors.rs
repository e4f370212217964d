//! Payment error types.

use thiserror::Error;

use crate::game::errors::GameError;
use crate::game::models::{GameId, UserId};

#[derive(Debug, Error)]
pub enum PaymentError {
    /// The user has no participant row for this game.
    #[error("user {user_id} has not joined game {game_id}")]
    NotJoined { game_id: GameId, user_id: UserId },

    #[error("entry fee already paid")]
    AlreadyPaid,

    /// The provider reports the reservation as not (yet) succeeded.
    #[error("payment has not completed")]
    PaymentNotCompleted,

    /// No reservation on record for the given provider reference.
    #[error("unknown payment reservation: {0}")]
    UnknownReservation(String),

    #[error("payment provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Store(#[from] GameError),
}

impl PaymentError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::NotJoined { .. } => "not_joined",
            PaymentError::AlreadyPaid => "already_paid",
            PaymentError::PaymentNotCompleted => "payment_not_completed",
            PaymentError::UnknownReservation(_) => "unknown_reservation",
            PaymentError::Provider(_) => "provider_error",
            PaymentError::Store(e) => e.code(),
        }
    }

    /// Message safe to return to clients.
    pub fn client_message(&self) -> String {
        match self {
            PaymentError::Provider(_) => "payment provider error".to_string(),
            PaymentError::Store(e) => e.client_message(),
            other => other.to_string(),
        }
    }
}

pub type PaymentResult<T> = Result<T, PaymentError>;
