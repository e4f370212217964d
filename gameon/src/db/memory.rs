//! In-memory `GameStore` for tests and the `--memory` development backend.
//!
//! All tables live behind one mutex, so every operation is atomic with
//! respect to every other. That single lock is what makes `add_participant`
//! and `mark_participant_paid` honor the same guarantees as the Postgres
//! transaction without any extra machinery.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::auth::models::{NewUser, User, UserCredentials};
use crate::game::errors::{GameError, GameResult};
use crate::game::models::{
    Earning, EarningKind, Game, GameId, GameParticipant, GameStatus, GameType, NewGame, Referral,
    TournamentStructure, UserId,
};
use crate::ledger::Cents;
use crate::payments::models::PaymentReservation;

use super::repository::GameStore;

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    credentials: HashMap<UserId, String>,
    game_types: HashMap<i64, GameType>,
    structures: HashMap<i64, TournamentStructure>,
    games: HashMap<GameId, Game>,
    participants: HashMap<i64, GameParticipant>,
    referrals: HashMap<i64, Referral>,
    earnings: HashMap<i64, Earning>,
    reservations: HashMap<String, PaymentReservation>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Map-backed `GameStore`.
pub struct MemGameStore {
    tables: Mutex<Tables>,
}

impl MemGameStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    /// Populate the lookup tables the way a fresh deployment is seeded.
    /// Ids count from 1 per table, matching the SQL seed rows, so a
    /// `game_type_id`/`structure_id` valid against one backend is valid
    /// against the other.
    pub async fn seed_defaults(&self) {
        let mut t = self.tables.lock().await;

        for (i, (name, icon)) in [
            ("Basketball", "fa-basketball"),
            ("Soccer", "fa-futbol"),
            ("Tennis", "fa-table-tennis"),
        ]
        .into_iter()
        .enumerate()
        {
            let id = i as i64 + 1;
            t.game_types.insert(
                id,
                GameType {
                    id,
                    name: name.to_string(),
                    icon_class: Some(icon.to_string()),
                },
            );
        }

        for (i, (name, description)) in [
            ("Single Match", "One game decides it all"),
            ("Knockout", "Single elimination bracket"),
            ("Round Robin", "Everyone plays everyone"),
            ("League", "Points table over multiple rounds"),
        ]
        .into_iter()
        .enumerate()
        {
            let id = i as i64 + 1;
            t.structures.insert(
                id,
                TournamentStructure {
                    id,
                    name: name.to_string(),
                    description: Some(description.to_string()),
                },
            );
        }

        // Keep the shared counter clear of the fixed seed ids.
        t.next_id = t.next_id.max(4);
    }
}

impl Default for MemGameStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameStore for MemGameStore {
    async fn create_user(&self, user: NewUser) -> GameResult<User> {
        let mut t = self.tables.lock().await;
        let id = t.next_id();
        let created = User {
            id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            created_at: Utc::now(),
        };
        t.users.insert(id, created.clone());
        t.credentials.insert(id, user.password_hash);
        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> GameResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> GameResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> GameResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_credentials(&self, username: &str) -> GameResult<Option<UserCredentials>> {
        let t = self.tables.lock().await;
        let user = match t.users.values().find(|u| u.username == username) {
            Some(user) => user,
            None => return Ok(None),
        };
        Ok(t.credentials.get(&user.id).map(|hash| UserCredentials {
            user_id: user.id,
            password_hash: hash.clone(),
        }))
    }

    async fn list_game_types(&self) -> GameResult<Vec<GameType>> {
        let t = self.tables.lock().await;
        let mut out: Vec<_> = t.game_types.values().cloned().collect();
        out.sort_by_key(|gt| gt.id);
        Ok(out)
    }

    async fn get_game_type(&self, id: i64) -> GameResult<Option<GameType>> {
        let t = self.tables.lock().await;
        Ok(t.game_types.get(&id).cloned())
    }

    async fn create_game_type(&self, name: &str, icon_class: Option<&str>) -> GameResult<GameType> {
        let mut t = self.tables.lock().await;
        let id = t.next_id();
        let created = GameType {
            id,
            name: name.to_string(),
            icon_class: icon_class.map(str::to_string),
        };
        t.game_types.insert(id, created.clone());
        Ok(created)
    }

    async fn list_structures(&self) -> GameResult<Vec<TournamentStructure>> {
        let t = self.tables.lock().await;
        let mut out: Vec<_> = t.structures.values().cloned().collect();
        out.sort_by_key(|s| s.id);
        Ok(out)
    }

    async fn get_structure(&self, id: i64) -> GameResult<Option<TournamentStructure>> {
        let t = self.tables.lock().await;
        Ok(t.structures.get(&id).cloned())
    }

    async fn create_structure(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> GameResult<TournamentStructure> {
        let mut t = self.tables.lock().await;
        let id = t.next_id();
        let created = TournamentStructure {
            id,
            name: name.to_string(),
            description: description.map(str::to_string),
        };
        t.structures.insert(id, created.clone());
        Ok(created)
    }

    async fn create_game(&self, game: NewGame, prize_pool: Cents) -> GameResult<Game> {
        let mut t = self.tables.lock().await;
        let id = t.next_id();
        let created = Game {
            id,
            name: game.name,
            game_master_id: game.game_master_id,
            game_type_id: game.game_type_id,
            structure_id: game.structure_id,
            location: game.location,
            datetime: game.datetime,
            max_players: game.max_players,
            current_players: 0,
            entry_fee: game.entry_fee,
            prize_pool,
            is_private: game.is_private,
            status: GameStatus::Scheduled,
            payout_structure: game.payout_structure,
            created_at: Utc::now(),
        };
        t.games.insert(id, created.clone());
        Ok(created)
    }

    async fn get_game(&self, id: GameId) -> GameResult<Option<Game>> {
        let t = self.tables.lock().await;
        Ok(t.games.get(&id).cloned())
    }

    async fn list_games(&self, status: Option<GameStatus>) -> GameResult<Vec<Game>> {
        let t = self.tables.lock().await;
        let mut out: Vec<_> = t
            .games
            .values()
            .filter(|g| status.map_or(true, |s| g.status == s))
            .cloned()
            .collect();
        out.sort_by_key(|g| g.id);
        Ok(out)
    }

    async fn list_games_for_participant(&self, user_id: UserId) -> GameResult<Vec<Game>> {
        let t = self.tables.lock().await;
        let mut out: Vec<_> = t
            .participants
            .values()
            .filter(|p| p.user_id == user_id)
            .filter_map(|p| t.games.get(&p.game_id).cloned())
            .collect();
        out.sort_by_key(|g| g.id);
        Ok(out)
    }

    async fn list_games_created(&self, game_master_id: UserId) -> GameResult<Vec<Game>> {
        let t = self.tables.lock().await;
        let mut out: Vec<_> = t
            .games
            .values()
            .filter(|g| g.game_master_id == game_master_id)
            .cloned()
            .collect();
        out.sort_by_key(|g| g.id);
        Ok(out)
    }

    async fn update_game_status(
        &self,
        id: GameId,
        from: GameStatus,
        to: GameStatus,
    ) -> GameResult<Option<Game>> {
        let mut t = self.tables.lock().await;
        let game = t.games.get_mut(&id).ok_or(GameError::GameNotFound(id))?;
        if game.status != from {
            return Ok(None);
        }
        game.status = to;
        Ok(Some(game.clone()))
    }

    async fn get_participant(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> GameResult<Option<GameParticipant>> {
        let t = self.tables.lock().await;
        Ok(t.participants
            .values()
            .find(|p| p.game_id == game_id && p.user_id == user_id)
            .cloned())
    }

    async fn list_participants(&self, game_id: GameId) -> GameResult<Vec<GameParticipant>> {
        let t = self.tables.lock().await;
        let mut out: Vec<_> = t
            .participants
            .values()
            .filter(|p| p.game_id == game_id)
            .cloned()
            .collect();
        out.sort_by_key(|p| p.id);
        Ok(out)
    }

    async fn add_participant(
        &self,
        game_id: GameId,
        user_id: UserId,
        referred_by: Option<UserId>,
    ) -> GameResult<GameParticipant> {
        let mut t = self.tables.lock().await;

        let game = t
            .games
            .get(&game_id)
            .ok_or(GameError::GameNotFound(game_id))?;
        if !game.status.is_joinable() {
            return Err(GameError::GameNotJoinable(game.status));
        }
        if game.current_players >= game.max_players {
            return Err(GameError::GameFull);
        }
        if t.participants
            .values()
            .any(|p| p.game_id == game_id && p.user_id == user_id)
        {
            return Err(GameError::AlreadyJoined);
        }

        let id = t.next_id();
        let participant = GameParticipant {
            id,
            game_id,
            user_id,
            joined_at: Utc::now(),
            has_paid: false,
            referred_by,
        };
        t.participants.insert(id, participant.clone());
        if let Some(game) = t.games.get_mut(&game_id) {
            game.current_players += 1;
        }
        Ok(participant)
    }

    async fn mark_participant_paid(&self, participant_id: i64) -> GameResult<bool> {
        let mut t = self.tables.lock().await;
        let participant = t.participants.get_mut(&participant_id).ok_or_else(|| {
            GameError::Validation(format!("participant {participant_id} not found"))
        })?;
        if participant.has_paid {
            return Ok(false);
        }
        participant.has_paid = true;
        Ok(true)
    }

    async fn create_referral(
        &self,
        referrer_id: UserId,
        referred_user_id: UserId,
        game_id: Option<GameId>,
    ) -> GameResult<Referral> {
        let mut t = self.tables.lock().await;
        let id = t.next_id();
        let referral = Referral {
            id,
            referrer_id,
            referred_user_id,
            game_id,
            earnings: 0,
            created_at: Utc::now(),
        };
        t.referrals.insert(id, referral.clone());
        Ok(referral)
    }

    async fn list_referrals(&self, referrer_id: UserId) -> GameResult<Vec<Referral>> {
        let t = self.tables.lock().await;
        let mut out: Vec<_> = t
            .referrals
            .values()
            .filter(|r| r.referrer_id == referrer_id)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.id);
        Ok(out)
    }

    async fn find_referral(
        &self,
        referred_user_id: UserId,
        game_id: GameId,
    ) -> GameResult<Option<Referral>> {
        let t = self.tables.lock().await;
        Ok(t.referrals
            .values()
            .find(|r| r.referred_user_id == referred_user_id && r.game_id == Some(game_id))
            .cloned())
    }

    async fn add_referral_earnings(&self, referral_id: i64, delta: Cents) -> GameResult<Referral> {
        let mut t = self.tables.lock().await;
        let referral = t
            .referrals
            .get_mut(&referral_id)
            .ok_or_else(|| GameError::Validation(format!("referral {referral_id} not found")))?;
        referral.earnings += delta;
        Ok(referral.clone())
    }

    async fn add_earning(
        &self,
        user_id: UserId,
        game_id: Option<GameId>,
        amount: Cents,
        kind: EarningKind,
    ) -> GameResult<Earning> {
        let mut t = self.tables.lock().await;
        let id = t.next_id();
        let earning = Earning {
            id,
            user_id,
            game_id,
            amount,
            kind,
            created_at: Utc::now(),
        };
        t.earnings.insert(id, earning.clone());
        Ok(earning)
    }

    async fn list_earnings(&self, user_id: UserId) -> GameResult<Vec<Earning>> {
        let t = self.tables.lock().await;
        let mut out: Vec<_> = t
            .earnings
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by_key(|e| e.id);
        Ok(out)
    }

    async fn list_game_earnings(&self, game_id: GameId) -> GameResult<Vec<Earning>> {
        let t = self.tables.lock().await;
        let mut out: Vec<_> = t
            .earnings
            .values()
            .filter(|e| e.game_id == Some(game_id))
            .cloned()
            .collect();
        out.sort_by_key(|e| e.id);
        Ok(out)
    }

    async fn sum_earnings(&self, user_id: UserId) -> GameResult<Cents> {
        let t = self.tables.lock().await;
        Ok(t.earnings
            .values()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.amount)
            .sum())
    }

    async fn record_reservation(
        &self,
        reference: &str,
        game_id: GameId,
        user_id: UserId,
        amount: Cents,
    ) -> GameResult<PaymentReservation> {
        let mut t = self.tables.lock().await;
        let reservation = PaymentReservation {
            reference: reference.to_string(),
            game_id,
            user_id,
            amount,
            created_at: Utc::now(),
        };
        t.reservations
            .insert(reference.to_string(), reservation.clone());
        Ok(reservation)
    }

    async fn get_reservation(&self, reference: &str) -> GameResult<Option<PaymentReservation>> {
        let t = self.tables.lock().await;
        Ok(t.reservations.get(reference).cloned())
    }

    async fn ping(&self) -> GameResult<()> {
        Ok(())
    }
}
