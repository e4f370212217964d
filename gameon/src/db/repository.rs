//! Store trait definition and the PostgreSQL implementation.
//!
//! `GameStore` is the repository interface every manager consumes; it keeps
//! persistence concerns out of the lifecycle logic and makes the managers
//! testable against the in-memory store. The store is deliberately dumb
//! about status-transition legality (the lifecycle service owns that), but
//! it DOES own join atomicity: capacity check, duplicate check, status
//! re-check, participant insert, and counter increment are one atomic unit.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use crate::auth::models::{NewUser, User, UserCredentials};
use crate::game::errors::{GameError, GameResult};
use crate::game::models::{
    Earning, EarningKind, Game, GameId, GameParticipant, GameStatus, GameType, NewGame, Referral,
    TournamentStructure, UserId,
};
use crate::ledger::Cents;
use crate::payments::models::PaymentReservation;

/// Repository interface over the GameOn entities.
#[async_trait]
pub trait GameStore: Send + Sync {
    // Users
    async fn create_user(&self, user: NewUser) -> GameResult<User>;
    async fn get_user(&self, id: UserId) -> GameResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> GameResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> GameResult<Option<User>>;
    async fn get_credentials(&self, username: &str) -> GameResult<Option<UserCredentials>>;

    // Lookup tables
    async fn list_game_types(&self) -> GameResult<Vec<GameType>>;
    async fn get_game_type(&self, id: i64) -> GameResult<Option<GameType>>;
    async fn create_game_type(&self, name: &str, icon_class: Option<&str>) -> GameResult<GameType>;
    async fn list_structures(&self) -> GameResult<Vec<TournamentStructure>>;
    async fn get_structure(&self, id: i64) -> GameResult<Option<TournamentStructure>>;
    async fn create_structure(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> GameResult<TournamentStructure>;

    // Games
    async fn create_game(&self, game: NewGame, prize_pool: Cents) -> GameResult<Game>;
    async fn get_game(&self, id: GameId) -> GameResult<Option<Game>>;
    async fn list_games(&self, status: Option<GameStatus>) -> GameResult<Vec<Game>>;
    async fn list_games_for_participant(&self, user_id: UserId) -> GameResult<Vec<Game>>;
    async fn list_games_created(&self, game_master_id: UserId) -> GameResult<Vec<Game>>;
    /// Conditional status write: succeeds only while the game still holds
    /// `from`, so two racing transitions cannot both take effect. Returns
    /// `None` when the game has moved on since the caller read it.
    /// Transition legality is the lifecycle service's job.
    async fn update_game_status(
        &self,
        id: GameId,
        from: GameStatus,
        to: GameStatus,
    ) -> GameResult<Option<Game>>;

    // Participants
    async fn get_participant(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> GameResult<Option<GameParticipant>>;
    async fn list_participants(&self, game_id: GameId) -> GameResult<Vec<GameParticipant>>;
    /// Atomic join: fails with `GameNotFound`, `GameNotJoinable`, `GameFull`
    /// or `AlreadyJoined`; on success the participant row exists and the
    /// game's `current_players` has been incremented, as one unit.
    async fn add_participant(
        &self,
        game_id: GameId,
        user_id: UserId,
        referred_by: Option<UserId>,
    ) -> GameResult<GameParticipant>;
    /// Conditionally flip `has_paid` false -> true. Returns `true` if this
    /// call performed the flip, `false` if the participant was already paid.
    /// The single point that makes payment confirmation idempotent.
    async fn mark_participant_paid(&self, participant_id: i64) -> GameResult<bool>;

    // Referrals
    async fn create_referral(
        &self,
        referrer_id: UserId,
        referred_user_id: UserId,
        game_id: Option<GameId>,
    ) -> GameResult<Referral>;
    async fn list_referrals(&self, referrer_id: UserId) -> GameResult<Vec<Referral>>;
    async fn find_referral(
        &self,
        referred_user_id: UserId,
        game_id: GameId,
    ) -> GameResult<Option<Referral>>;
    async fn add_referral_earnings(&self, referral_id: i64, delta: Cents) -> GameResult<Referral>;

    // Earnings
    async fn add_earning(
        &self,
        user_id: UserId,
        game_id: Option<GameId>,
        amount: Cents,
        kind: EarningKind,
    ) -> GameResult<Earning>;
    async fn list_earnings(&self, user_id: UserId) -> GameResult<Vec<Earning>>;
    async fn list_game_earnings(&self, game_id: GameId) -> GameResult<Vec<Earning>>;
    async fn sum_earnings(&self, user_id: UserId) -> GameResult<Cents>;

    // Payment reservations
    async fn record_reservation(
        &self,
        reference: &str,
        game_id: GameId,
        user_id: UserId,
        amount: Cents,
    ) -> GameResult<PaymentReservation>;
    async fn get_reservation(&self, reference: &str) -> GameResult<Option<PaymentReservation>>;

    /// Liveness probe for health checks.
    async fn ping(&self) -> GameResult<()>;
}

/// PostgreSQL implementation of `GameStore`.
pub struct PgGameStore {
    pool: Arc<PgPool>,
}

impl PgGameStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        full_name: row.get("full_name"),
        avatar_url: row.get("avatar_url"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

fn row_to_game(row: &sqlx::postgres::PgRow) -> GameResult<Game> {
    let status_str: String = row.get("status");
    let status = GameStatus::parse(&status_str)
        .ok_or_else(|| GameError::Validation(format!("unknown stored status {status_str:?}")))?;

    Ok(Game {
        id: row.get("id"),
        name: row.get("name"),
        game_master_id: row.get("game_master_id"),
        game_type_id: row.get("game_type_id"),
        structure_id: row.get("structure_id"),
        location: row.get("location"),
        datetime: row.get::<chrono::NaiveDateTime, _>("datetime").and_utc(),
        max_players: row.get("max_players"),
        current_players: row.get("current_players"),
        entry_fee: row.get("entry_fee_cents"),
        prize_pool: row.get("prize_pool_cents"),
        is_private: row.get("is_private"),
        status,
        payout_structure: row.get("payout_structure"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    })
}

fn row_to_participant(row: &sqlx::postgres::PgRow) -> GameParticipant {
    GameParticipant {
        id: row.get("id"),
        game_id: row.get("game_id"),
        user_id: row.get("user_id"),
        joined_at: row.get::<chrono::NaiveDateTime, _>("joined_at").and_utc(),
        has_paid: row.get("has_paid"),
        referred_by: row.get("referred_by"),
    }
}

fn row_to_referral(row: &sqlx::postgres::PgRow) -> Referral {
    Referral {
        id: row.get("id"),
        referrer_id: row.get("referrer_id"),
        referred_user_id: row.get("referred_user_id"),
        game_id: row.get("game_id"),
        earnings: row.get("earnings_cents"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

fn row_to_earning(row: &sqlx::postgres::PgRow) -> GameResult<Earning> {
    let kind_str: String = row.get("kind");
    let kind = EarningKind::parse(&kind_str)
        .ok_or_else(|| GameError::Validation(format!("unknown earning kind {kind_str:?}")))?;

    Ok(Earning {
        id: row.get("id"),
        user_id: row.get("user_id"),
        game_id: row.get("game_id"),
        amount: row.get("amount_cents"),
        kind,
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    })
}

const GAME_COLUMNS: &str = "id, name, game_master_id, game_type_id, structure_id, location, \
     datetime, max_players, current_players, entry_fee_cents, prize_pool_cents, is_private, \
     status, payout_structure, created_at";

#[async_trait]
impl GameStore for PgGameStore {
    async fn create_user(&self, user: NewUser) -> GameResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, email, full_name, avatar_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, full_name, avatar_url, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.avatar_url)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row_to_user(&row))
    }

    async fn get_user(&self, id: UserId) -> GameResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, full_name, avatar_url, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn get_user_by_username(&self, username: &str) -> GameResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, full_name, avatar_url, created_at
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn get_user_by_email(&self, email: &str) -> GameResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, full_name, avatar_url, created_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn get_credentials(&self, username: &str) -> GameResult<Option<UserCredentials>> {
        let row = sqlx::query("SELECT id, password_hash FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(|r| UserCredentials {
            user_id: r.get("id"),
            password_hash: r.get("password_hash"),
        }))
    }

    async fn list_game_types(&self) -> GameResult<Vec<GameType>> {
        let rows = sqlx::query("SELECT id, name, icon_class FROM game_types ORDER BY id")
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| GameType {
                id: r.get("id"),
                name: r.get("name"),
                icon_class: r.get("icon_class"),
            })
            .collect())
    }

    async fn get_game_type(&self, id: i64) -> GameResult<Option<GameType>> {
        let row = sqlx::query("SELECT id, name, icon_class FROM game_types WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(|r| GameType {
            id: r.get("id"),
            name: r.get("name"),
            icon_class: r.get("icon_class"),
        }))
    }

    async fn create_game_type(&self, name: &str, icon_class: Option<&str>) -> GameResult<GameType> {
        let row = sqlx::query(
            "INSERT INTO game_types (name, icon_class) VALUES ($1, $2)
             RETURNING id, name, icon_class",
        )
        .bind(name)
        .bind(icon_class)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(GameType {
            id: row.get("id"),
            name: row.get("name"),
            icon_class: row.get("icon_class"),
        })
    }

    async fn list_structures(&self) -> GameResult<Vec<TournamentStructure>> {
        let rows =
            sqlx::query("SELECT id, name, description FROM tournament_structures ORDER BY id")
                .fetch_all(self.pool.as_ref())
                .await?;

        Ok(rows
            .into_iter()
            .map(|r| TournamentStructure {
                id: r.get("id"),
                name: r.get("name"),
                description: r.get("description"),
            })
            .collect())
    }

    async fn get_structure(&self, id: i64) -> GameResult<Option<TournamentStructure>> {
        let row =
            sqlx::query("SELECT id, name, description FROM tournament_structures WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(row.map(|r| TournamentStructure {
            id: r.get("id"),
            name: r.get("name"),
            description: r.get("description"),
        }))
    }

    async fn create_structure(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> GameResult<TournamentStructure> {
        let row = sqlx::query(
            "INSERT INTO tournament_structures (name, description) VALUES ($1, $2)
             RETURNING id, name, description",
        )
        .bind(name)
        .bind(description)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(TournamentStructure {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
        })
    }

    async fn create_game(&self, game: NewGame, prize_pool: Cents) -> GameResult<Game> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO games (name, game_master_id, game_type_id, structure_id, location,
                               datetime, max_players, current_players, entry_fee_cents,
                               prize_pool_cents, is_private, status, payout_structure)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $9, $10, $11, $12)
            RETURNING {GAME_COLUMNS}
            "#
        ))
        .bind(&game.name)
        .bind(game.game_master_id)
        .bind(game.game_type_id)
        .bind(game.structure_id)
        .bind(&game.location)
        .bind(game.datetime.naive_utc())
        .bind(game.max_players)
        .bind(game.entry_fee)
        .bind(prize_pool)
        .bind(game.is_private)
        .bind(GameStatus::Scheduled.as_str())
        .bind(&game.payout_structure)
        .fetch_one(self.pool.as_ref())
        .await?;

        row_to_game(&row)
    }

    async fn get_game(&self, id: GameId) -> GameResult<Option<Game>> {
        let row = sqlx::query(&format!("SELECT {GAME_COLUMNS} FROM games WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(|r| row_to_game(&r)).transpose()
    }

    async fn list_games(&self, status: Option<GameStatus>) -> GameResult<Vec<Game>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {GAME_COLUMNS} FROM games WHERE status = $1"
                ))
                .bind(status.as_str())
                .fetch_all(self.pool.as_ref())
                .await?
            }
            None => {
                sqlx::query(&format!("SELECT {GAME_COLUMNS} FROM games"))
                    .fetch_all(self.pool.as_ref())
                    .await?
            }
        };

        rows.iter().map(row_to_game).collect()
    }

    async fn list_games_for_participant(&self, user_id: UserId) -> GameResult<Vec<Game>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {GAME_COLUMNS} FROM games
            WHERE id IN (SELECT game_id FROM game_participants WHERE user_id = $1)
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(row_to_game).collect()
    }

    async fn list_games_created(&self, game_master_id: UserId) -> GameResult<Vec<Game>> {
        let rows = sqlx::query(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE game_master_id = $1"
        ))
        .bind(game_master_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(row_to_game).collect()
    }

    async fn update_game_status(
        &self,
        id: GameId,
        from: GameStatus,
        to: GameStatus,
    ) -> GameResult<Option<Game>> {
        let row = sqlx::query(&format!(
            "UPDATE games SET status = $1 WHERE id = $2 AND status = $3 RETURNING {GAME_COLUMNS}"
        ))
        .bind(to.as_str())
        .bind(id)
        .bind(from.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_game(&row)?)),
            None => {
                // Distinguish a missing game from a stale `from` status.
                let exists = sqlx::query("SELECT id FROM games WHERE id = $1")
                    .bind(id)
                    .fetch_optional(self.pool.as_ref())
                    .await?;
                match exists {
                    Some(_) => Ok(None),
                    None => Err(GameError::GameNotFound(id)),
                }
            }
        }
    }

    async fn get_participant(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> GameResult<Option<GameParticipant>> {
        let row = sqlx::query(
            "SELECT id, game_id, user_id, joined_at, has_paid, referred_by
             FROM game_participants WHERE game_id = $1 AND user_id = $2",
        )
        .bind(game_id)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| row_to_participant(&r)))
    }

    async fn list_participants(&self, game_id: GameId) -> GameResult<Vec<GameParticipant>> {
        let rows = sqlx::query(
            "SELECT id, game_id, user_id, joined_at, has_paid, referred_by
             FROM game_participants WHERE game_id = $1 ORDER BY joined_at",
        )
        .bind(game_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.iter().map(row_to_participant).collect())
    }

    async fn add_participant(
        &self,
        game_id: GameId,
        user_id: UserId,
        referred_by: Option<UserId>,
    ) -> GameResult<GameParticipant> {
        // Single transaction with a row lock on the game: two concurrent
        // joins cannot both pass the capacity check, and the participant
        // insert plus counter increment commit or roll back together.
        let mut tx = self.pool.begin().await?;

        let game_row = sqlx::query(
            "SELECT status, current_players, max_players FROM games WHERE id = $1 FOR UPDATE",
        )
        .bind(game_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GameError::GameNotFound(game_id))?;

        let status_str: String = game_row.get("status");
        let status = GameStatus::parse(&status_str)
            .ok_or_else(|| GameError::Validation(format!("unknown stored status {status_str:?}")))?;
        if !status.is_joinable() {
            return Err(GameError::GameNotJoinable(status));
        }

        let current_players: i32 = game_row.get("current_players");
        let max_players: i32 = game_row.get("max_players");
        if current_players >= max_players {
            return Err(GameError::GameFull);
        }

        let existing = sqlx::query(
            "SELECT id FROM game_participants WHERE game_id = $1 AND user_id = $2",
        )
        .bind(game_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            return Err(GameError::AlreadyJoined);
        }

        let row = sqlx::query(
            r#"
            INSERT INTO game_participants (game_id, user_id, has_paid, referred_by)
            VALUES ($1, $2, FALSE, $3)
            RETURNING id, game_id, user_id, joined_at, has_paid, referred_by
            "#,
        )
        .bind(game_id)
        .bind(user_id)
        .bind(referred_by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE games SET current_players = current_players + 1 WHERE id = $1")
            .bind(game_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row_to_participant(&row))
    }

    async fn mark_participant_paid(&self, participant_id: i64) -> GameResult<bool> {
        let result = sqlx::query(
            "UPDATE game_participants SET has_paid = TRUE WHERE id = $1 AND has_paid = FALSE",
        )
        .bind(participant_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_referral(
        &self,
        referrer_id: UserId,
        referred_user_id: UserId,
        game_id: Option<GameId>,
    ) -> GameResult<Referral> {
        let row = sqlx::query(
            r#"
            INSERT INTO referrals (referrer_id, referred_user_id, game_id, earnings_cents)
            VALUES ($1, $2, $3, 0)
            RETURNING id, referrer_id, referred_user_id, game_id, earnings_cents, created_at
            "#,
        )
        .bind(referrer_id)
        .bind(referred_user_id)
        .bind(game_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row_to_referral(&row))
    }

    async fn list_referrals(&self, referrer_id: UserId) -> GameResult<Vec<Referral>> {
        let rows = sqlx::query(
            "SELECT id, referrer_id, referred_user_id, game_id, earnings_cents, created_at
             FROM referrals WHERE referrer_id = $1 ORDER BY created_at",
        )
        .bind(referrer_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.iter().map(row_to_referral).collect())
    }

    async fn find_referral(
        &self,
        referred_user_id: UserId,
        game_id: GameId,
    ) -> GameResult<Option<Referral>> {
        let row = sqlx::query(
            "SELECT id, referrer_id, referred_user_id, game_id, earnings_cents, created_at
             FROM referrals WHERE referred_user_id = $1 AND game_id = $2",
        )
        .bind(referred_user_id)
        .bind(game_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| row_to_referral(&r)))
    }

    async fn add_referral_earnings(&self, referral_id: i64, delta: Cents) -> GameResult<Referral> {
        let row = sqlx::query(
            r#"
            UPDATE referrals SET earnings_cents = earnings_cents + $1 WHERE id = $2
            RETURNING id, referrer_id, referred_user_id, game_id, earnings_cents, created_at
            "#,
        )
        .bind(delta)
        .bind(referral_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| GameError::Validation(format!("referral {referral_id} not found")))?;

        Ok(row_to_referral(&row))
    }

    async fn add_earning(
        &self,
        user_id: UserId,
        game_id: Option<GameId>,
        amount: Cents,
        kind: EarningKind,
    ) -> GameResult<Earning> {
        let row = sqlx::query(
            r#"
            INSERT INTO earnings (user_id, game_id, amount_cents, kind)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, game_id, amount_cents, kind, created_at
            "#,
        )
        .bind(user_id)
        .bind(game_id)
        .bind(amount)
        .bind(kind.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;

        row_to_earning(&row)
    }

    async fn list_earnings(&self, user_id: UserId) -> GameResult<Vec<Earning>> {
        let rows = sqlx::query(
            "SELECT id, user_id, game_id, amount_cents, kind, created_at
             FROM earnings WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(row_to_earning).collect()
    }

    async fn list_game_earnings(&self, game_id: GameId) -> GameResult<Vec<Earning>> {
        let rows = sqlx::query(
            "SELECT id, user_id, game_id, amount_cents, kind, created_at
             FROM earnings WHERE game_id = $1 ORDER BY created_at",
        )
        .bind(game_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(row_to_earning).collect()
    }

    async fn sum_earnings(&self, user_id: UserId) -> GameResult<Cents> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount_cents), 0)::BIGINT AS total
             FROM earnings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.get("total"))
    }

    async fn record_reservation(
        &self,
        reference: &str,
        game_id: GameId,
        user_id: UserId,
        amount: Cents,
    ) -> GameResult<PaymentReservation> {
        let row = sqlx::query(
            r#"
            INSERT INTO payment_reservations (reference, game_id, user_id, amount_cents)
            VALUES ($1, $2, $3, $4)
            RETURNING reference, game_id, user_id, amount_cents, created_at
            "#,
        )
        .bind(reference)
        .bind(game_id)
        .bind(user_id)
        .bind(amount)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row_to_reservation(&row))
    }

    async fn get_reservation(&self, reference: &str) -> GameResult<Option<PaymentReservation>> {
        let row = sqlx::query(
            "SELECT reference, game_id, user_id, amount_cents, created_at
             FROM payment_reservations WHERE reference = $1",
        )
        .bind(reference)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| row_to_reservation(&r)))
    }

    async fn ping(&self) -> GameResult<()> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}

fn row_to_reservation(row: &sqlx::postgres::PgRow) -> PaymentReservation {
    PaymentReservation {
        reference: row.get("reference"),
        game_id: row.get("game_id"),
        user_id: row.get("user_id"),
        amount: row.get("amount_cents"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}
