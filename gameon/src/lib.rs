//! # GameOn
//!
//! Core library for a paid real-world game platform: players organize
//! pickup games and tournaments with real entry fees, and the platform
//! settles the money.
//!
//! ## Core Modules
//!
//! - [`ledger`]: Prize-pool arithmetic in integer cents
//! - [`game`]: Game entities, lifecycle state machine, and the game manager
//! - [`db`]: The `GameStore` repository trait with PostgreSQL and
//!   in-memory implementations
//! - [`auth`]: Registration, login, and JWT access tokens
//! - [`payments`]: Entry-fee reservations, confirmation, and provider
//!   notifications
//! - [`settlement`]: Referral credits and winner payouts
//!
//! ## Money
//!
//! Every amount in this crate is an integer number of cents
//! ([`ledger::Cents`]). Pool distribution never creates or destroys a
//! cent: the winners' share absorbs all rounding remainders.
//!
//! ## Example
//!
//! ```
//! use gameon::ledger;
//!
//! // A $25 entry fee and 8 players make a $200 pool.
//! let pool = ledger::prize_pool(2_500, 8);
//! let split = ledger::distribute(pool);
//! assert_eq!(split.total(), pool);
//! assert_eq!(split.winners_prize, 15_000);
//! ```

pub mod auth;
pub mod db;
pub mod game;
pub mod ledger;
pub mod payments;
pub mod settlement;

pub use auth::AuthManager;
pub use db::{Database, DatabaseConfig, GameStore, MemGameStore, PgGameStore};
pub use game::{GameError, GameManager, GameResult, GameStatus};
pub use ledger::Cents;
pub use payments::{PaymentCoordinator, PaymentError, PaymentProvider, SandboxPaymentProvider};
pub use settlement::SettlementManager;
