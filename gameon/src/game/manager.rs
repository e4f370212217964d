//! Game lifecycle manager: creation, joining, status transitions.

use std::sync::Arc;

use log::info;

use crate::db::GameStore;
use crate::game::errors::{GameError, GameResult};
use crate::game::models::{
    Game, GameId, GameParticipant, GameStatus, NewGame, UserId, MAX_ENTRY_FEE, MAX_PLAYERS,
    MIN_ENTRY_FEE, MIN_PLAYERS,
};
use crate::ledger::{self, parse_payout_structure};

/// Orchestrates the game lifecycle over a [`GameStore`].
///
/// The manager owns every rule the store does not: field validation,
/// payout-structure parsing, referral attribution, the status transition
/// table, and the game-master authorization check. The store only owns
/// join atomicity.
#[derive(Clone)]
pub struct GameManager {
    store: Arc<dyn GameStore>,
}

impl GameManager {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    /// Create a game. Validates bounds, payout structure, lookups, and
    /// precomputes the full prize pool from entry fee and capacity.
    pub async fn create_game(&self, game: NewGame) -> GameResult<Game> {
        if game.name.trim().is_empty() {
            return Err(GameError::Validation("game name must not be empty".into()));
        }
        if game.location.trim().is_empty() {
            return Err(GameError::Validation(
                "game location must not be empty".into(),
            ));
        }
        if !(MIN_ENTRY_FEE..=MAX_ENTRY_FEE).contains(&game.entry_fee) {
            return Err(GameError::Validation(format!(
                "entry fee must be between {MIN_ENTRY_FEE} and {MAX_ENTRY_FEE} cents"
            )));
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&game.max_players) {
            return Err(GameError::Validation(format!(
                "max players must be between {MIN_PLAYERS} and {MAX_PLAYERS}"
            )));
        }
        parse_payout_structure(&game.payout_structure)?;

        if self
            .store
            .get_user(game.game_master_id)
            .await?
            .is_none()
        {
            return Err(GameError::UserNotFound(game.game_master_id));
        }
        if self.store.get_game_type(game.game_type_id).await?.is_none() {
            return Err(GameError::Validation(format!(
                "unknown game type {}",
                game.game_type_id
            )));
        }
        if self.store.get_structure(game.structure_id).await?.is_none() {
            return Err(GameError::Validation(format!(
                "unknown tournament structure {}",
                game.structure_id
            )));
        }

        let prize_pool = ledger::prize_pool(game.entry_fee, game.max_players);
        let created = self.store.create_game(game, prize_pool).await?;
        info!(
            "created game {} ({:?}) with prize pool {} cents",
            created.id, created.name, created.prize_pool
        );
        Ok(created)
    }

    pub async fn get_game(&self, id: GameId) -> GameResult<Game> {
        self.store
            .get_game(id)
            .await?
            .ok_or(GameError::GameNotFound(id))
    }

    pub async fn list_games(&self, status: Option<GameStatus>) -> GameResult<Vec<Game>> {
        self.store.list_games(status).await
    }

    pub async fn list_games_for_participant(&self, user_id: UserId) -> GameResult<Vec<Game>> {
        self.store.list_games_for_participant(user_id).await
    }

    pub async fn list_games_created(&self, game_master_id: UserId) -> GameResult<Vec<Game>> {
        self.store.list_games_created(game_master_id).await
    }

    pub async fn list_participants(&self, game_id: GameId) -> GameResult<Vec<GameParticipant>> {
        self.get_game(game_id).await?;
        self.store.list_participants(game_id).await
    }

    /// Join a game, optionally crediting a referrer.
    ///
    /// Referral rules: the referrer must be an existing user, must not be
    /// the joining user, and at most one referral record is created per
    /// (referred user, game) pair. The capacity, duplicate, and status
    /// checks all happen atomically inside the store.
    pub async fn join_game(
        &self,
        game_id: GameId,
        user_id: UserId,
        referrer_id: Option<UserId>,
    ) -> GameResult<GameParticipant> {
        if self.store.get_user(user_id).await?.is_none() {
            return Err(GameError::UserNotFound(user_id));
        }

        if let Some(referrer_id) = referrer_id {
            if referrer_id == user_id {
                return Err(GameError::Validation(
                    "players cannot refer themselves".into(),
                ));
            }
            if self.store.get_user(referrer_id).await?.is_none() {
                return Err(GameError::UserNotFound(referrer_id));
            }
        }

        let participant = self
            .store
            .add_participant(game_id, user_id, referrer_id)
            .await?;

        if let Some(referrer_id) = referrer_id {
            if self
                .store
                .find_referral(user_id, game_id)
                .await?
                .is_none()
            {
                self.store
                    .create_referral(referrer_id, user_id, Some(game_id))
                    .await?;
            }
        }

        info!("user {user_id} joined game {game_id}");
        Ok(participant)
    }

    /// Change a game's status. Only its game master may do this, and only
    /// along the legal transition table. Transitioning to `Completed`
    /// posts the game master's share of the prize pool as an earning.
    pub async fn update_status(
        &self,
        actor: UserId,
        game_id: GameId,
        to: GameStatus,
    ) -> GameResult<Game> {
        let game = self.get_game(game_id).await?;
        if game.game_master_id != actor {
            return Err(GameError::NotAuthorized);
        }
        if !game.status.can_transition_to(to) {
            return Err(GameError::InvalidTransition {
                from: game.status,
                to,
            });
        }

        // Conditional on the status we just checked, so a racing
        // transition cannot apply twice or double-post the earning.
        let Some(updated) = self
            .store
            .update_game_status(game_id, game.status, to)
            .await?
        else {
            let current = self.get_game(game_id).await?;
            return Err(GameError::InvalidTransition {
                from: current.status,
                to,
            });
        };

        if to == GameStatus::Completed {
            let split = ledger::distribute(game.prize_pool);
            self.store
                .add_earning(
                    game.game_master_id,
                    Some(game_id),
                    split.game_master_fee,
                    crate::game::models::EarningKind::GameMaster,
                )
                .await?;
            info!(
                "game {game_id} completed; game master {} earned {} cents",
                game.game_master_id, split.game_master_fee
            );
        } else {
            info!("game {game_id} moved to {to}");
        }

        Ok(updated)
    }
}
