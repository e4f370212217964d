//! Game domain: entities, lifecycle rules, and the game manager.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{GameError, GameResult};
pub use manager::GameManager;
pub use models::{
    Earning, EarningKind, Game, GameId, GameParticipant, GameStatus, GameType, NewGame, Referral,
    TournamentStructure, UserId,
};
