//! Game lifecycle and store error types.

use thiserror::Error;

use super::models::{GameId, GameStatus, UserId};

/// Game errors
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Participant not found for game {game_id}, user {user_id}")]
    ParticipantNotFound { game_id: GameId, user_id: UserId },

    #[error("Game is full")]
    GameFull,

    #[error("Already joined this game")]
    AlreadyJoined,

    #[error("Game is not accepting joins (status: {0})")]
    GameNotJoinable(GameStatus),

    #[error("Only the game master may perform this action")]
    NotAuthorized,

    #[error("Illegal status transition: {from} -> {to}")]
    InvalidTransition { from: GameStatus, to: GameStatus },

    #[error("Game {0} has already been settled")]
    AlreadySettled(GameId),

    #[error("Payout structure error: {0}")]
    Payout(#[from] crate::ledger::LedgerError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl GameError {
    /// Stable machine-checkable identifier, surfaced to API clients so they
    /// can branch on the error kind instead of parsing messages.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Validation(_) => "validation_error",
            GameError::GameNotFound(_) => "not_found",
            GameError::UserNotFound(_) => "not_found",
            GameError::ParticipantNotFound { .. } => "not_found",
            GameError::GameFull => "game_full",
            GameError::AlreadyJoined => "already_joined",
            GameError::GameNotJoinable(_) => "game_not_joinable",
            GameError::NotAuthorized => "not_authorized",
            GameError::InvalidTransition { .. } => "invalid_transition",
            GameError::AlreadySettled(_) => "already_settled",
            GameError::Payout(e) => e.code(),
            GameError::Database(_) => "internal_error",
        }
    }

    /// Client-safe message. Database details are never exposed.
    pub fn client_message(&self) -> String {
        match self {
            GameError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;
