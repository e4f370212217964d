//! Prize-pool and payout math.
//!
//! All monetary amounts in GameOn are integer cents. Entry fees aggregate
//! into a prize pool that is split four ways (platform, game master,
//! promoters, winners); the split always sums exactly to the pool, with no
//! rounding leak. Payout structures describe how the winners' share is
//! divided among finishing positions.
//!
//! ## Example
//!
//! ```
//! use gameon::ledger::{self, parse_payout_structure};
//!
//! // $25 entry, 8 players -> $200 pool
//! let pool = ledger::prize_pool(2_500, 8);
//! assert_eq!(pool, 20_000);
//!
//! let dist = ledger::distribute(pool);
//! assert_eq!(dist.winners_prize, 15_000); // 75%
//!
//! let tiers = parse_payout_structure("1st:70,2nd:30").unwrap();
//! assert_eq!(tiers.len(), 2);
//! ```

pub mod math;
pub mod payout;

pub use math::{distribute, prize_pool, referral_share, Cents, PoolDistribution};
pub use payout::{parse_payout_structure, split_prize, LedgerError, PayoutTier};
