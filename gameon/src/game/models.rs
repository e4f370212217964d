//! Game domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::Cents;

/// Game ID type
pub type GameId = i64;

/// User ID type
pub type UserId = i64;

/// Minimum entry fee in cents ($1).
pub const MIN_ENTRY_FEE: Cents = 100;
/// Maximum entry fee in cents ($10,000).
pub const MAX_ENTRY_FEE: Cents = 1_000_000;
/// Minimum game capacity.
pub const MIN_PLAYERS: i32 = 2;
/// Maximum game capacity.
pub const MAX_PLAYERS: i32 = 64;

/// Game status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Accepting joins
    Scheduled,
    /// Game in progress
    Active,
    /// Game finished
    Completed,
    /// Game cancelled
    Cancelled,
    /// Game postponed, may be rescheduled
    Postponed,
}

impl GameStatus {
    /// Whether a transition from `self` to `to` is legal.
    ///
    /// ```text
    /// scheduled -> active, cancelled, postponed
    /// active    -> completed, cancelled
    /// postponed -> scheduled, cancelled
    /// completed -> (terminal)
    /// cancelled -> (terminal)
    /// ```
    pub fn can_transition_to(self, to: GameStatus) -> bool {
        use GameStatus::*;
        matches!(
            (self, to),
            (Scheduled, Active)
                | (Scheduled, Cancelled)
                | (Scheduled, Postponed)
                | (Active, Completed)
                | (Active, Cancelled)
                | (Postponed, Scheduled)
                | (Postponed, Cancelled)
        )
    }

    /// Whether this status accepts new joins.
    pub fn is_joinable(self) -> bool {
        self == GameStatus::Scheduled
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::Active => "active",
            GameStatus::Completed => "completed",
            GameStatus::Cancelled => "cancelled",
            GameStatus::Postponed => "postponed",
        }
    }

    /// Parse a stored status string.
    pub fn parse(s: &str) -> Option<GameStatus> {
        match s {
            "scheduled" => Some(GameStatus::Scheduled),
            "active" => Some(GameStatus::Active),
            "completed" => Some(GameStatus::Completed),
            "cancelled" => Some(GameStatus::Cancelled),
            "postponed" => Some(GameStatus::Postponed),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Earning type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarningKind {
    Winner,
    GameMaster,
    Referrer,
}

impl EarningKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EarningKind::Winner => "winner",
            EarningKind::GameMaster => "game_master",
            EarningKind::Referrer => "referrer",
        }
    }

    pub fn parse(s: &str) -> Option<EarningKind> {
        match s {
            "winner" => Some(EarningKind::Winner),
            "game_master" => Some(EarningKind::GameMaster),
            "referrer" => Some(EarningKind::Referrer),
            _ => None,
        }
    }
}

impl std::fmt::Display for EarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Game type lookup row (e.g. Basketball)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameType {
    pub id: i64,
    pub name: String,
    pub icon_class: Option<String>,
}

/// Tournament structure lookup row (e.g. Knockout)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentStructure {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// The central game aggregate.
///
/// `entry_fee`, `max_players` and `prize_pool` are fixed at creation;
/// `current_players` only moves through atomic join operations and never
/// exceeds `max_players`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub game_master_id: UserId,
    pub game_type_id: i64,
    pub structure_id: i64,
    pub location: String,
    pub datetime: DateTime<Utc>,
    pub max_players: i32,
    pub current_players: i32,
    /// Entry fee in cents
    pub entry_fee: Cents,
    /// Prize pool in cents (= entry_fee * max_players, fixed at creation)
    pub prize_pool: Cents,
    pub is_private: bool,
    pub status: GameStatus,
    /// Serialized position->percentage mapping, e.g. "1st:70,2nd:30"
    pub payout_structure: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a game. The lifecycle service validates bounds and
/// computes the prize pool before this reaches a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGame {
    pub name: String,
    pub game_master_id: UserId,
    pub game_type_id: i64,
    pub structure_id: i64,
    pub location: String,
    pub datetime: DateTime<Utc>,
    pub max_players: i32,
    pub entry_fee: Cents,
    pub is_private: bool,
    pub payout_structure: String,
}

/// Join record linking a user to a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameParticipant {
    pub id: i64,
    pub game_id: GameId,
    pub user_id: UserId,
    pub joined_at: DateTime<Utc>,
    pub has_paid: bool,
    pub referred_by: Option<UserId>,
}

/// Referral attribution record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: i64,
    pub referrer_id: UserId,
    pub referred_user_id: UserId,
    pub game_id: Option<GameId>,
    /// Cumulative referral earnings in cents, updated by settlement
    pub earnings: Cents,
    pub created_at: DateTime<Utc>,
}

/// Append-only payout ledger row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Earning {
    pub id: i64,
    pub user_id: UserId,
    pub game_id: Option<GameId>,
    pub amount: Cents,
    pub kind: EarningKind,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            GameStatus::Scheduled,
            GameStatus::Active,
            GameStatus::Completed,
            GameStatus::Cancelled,
            GameStatus::Postponed,
        ] {
            assert_eq!(GameStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(GameStatus::parse("finished"), None);
    }

    #[test]
    fn test_transition_table_from_scheduled() {
        let s = GameStatus::Scheduled;
        assert!(s.can_transition_to(GameStatus::Active));
        assert!(s.can_transition_to(GameStatus::Cancelled));
        assert!(s.can_transition_to(GameStatus::Postponed));
        assert!(!s.can_transition_to(GameStatus::Completed));
        assert!(!s.can_transition_to(GameStatus::Scheduled));
    }

    #[test]
    fn test_transition_table_from_active() {
        let s = GameStatus::Active;
        assert!(s.can_transition_to(GameStatus::Completed));
        assert!(s.can_transition_to(GameStatus::Cancelled));
        assert!(!s.can_transition_to(GameStatus::Postponed));
        assert!(!s.can_transition_to(GameStatus::Scheduled));
    }

    #[test]
    fn test_postponed_can_be_rescheduled() {
        let s = GameStatus::Postponed;
        assert!(s.can_transition_to(GameStatus::Scheduled));
        assert!(s.can_transition_to(GameStatus::Cancelled));
        assert!(!s.can_transition_to(GameStatus::Active));
    }

    #[test]
    fn test_terminal_states() {
        for terminal in [GameStatus::Completed, GameStatus::Cancelled] {
            for target in [
                GameStatus::Scheduled,
                GameStatus::Active,
                GameStatus::Completed,
                GameStatus::Cancelled,
                GameStatus::Postponed,
            ] {
                assert!(!terminal.can_transition_to(target));
            }
        }
    }

    #[test]
    fn test_only_scheduled_is_joinable() {
        assert!(GameStatus::Scheduled.is_joinable());
        assert!(!GameStatus::Active.is_joinable());
        assert!(!GameStatus::Postponed.is_joinable());
        assert!(!GameStatus::Completed.is_joinable());
        assert!(!GameStatus::Cancelled.is_joinable());
    }

    #[test]
    fn test_earning_kind_round_trip() {
        for kind in [
            EarningKind::Winner,
            EarningKind::GameMaster,
            EarningKind::Referrer,
        ] {
            assert_eq!(EarningKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EarningKind::parse("promoter"), None);
    }
}
