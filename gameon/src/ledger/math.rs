//! Pool computation and the four-way distribution split.

use serde::{Deserialize, Serialize};

/// Monetary amount in integer cents.
pub type Cents = i64;

/// Platform share of the prize pool, in percent.
pub const PLATFORM_PCT: i64 = 10;
/// Game-master share of the prize pool, in percent.
pub const GAME_MASTER_PCT: i64 = 5;
/// Promoter share of the prize pool, in percent.
pub const PROMOTERS_PCT: i64 = 10;
/// Winner share of the prize pool, in percent.
pub const WINNERS_PCT: i64 = 75;

/// Referrer share of a single participant's entry fee, in percent.
pub const REFERRAL_PCT: i64 = 10;

/// Four-way split of a prize pool.
///
/// Invariant: the four fields sum exactly to the pool they were computed
/// from. `winners_prize` absorbs any integer-division remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDistribution {
    pub platform_fee: Cents,
    pub game_master_fee: Cents,
    pub promoters_fee: Cents,
    pub winners_prize: Cents,
}

impl PoolDistribution {
    /// Total of all four shares.
    pub fn total(&self) -> Cents {
        self.platform_fee + self.game_master_fee + self.promoters_fee + self.winners_prize
    }
}

/// Compute a game's prize pool: entry fee times capacity.
///
/// Inputs are assumed to already satisfy their domain bounds (fee
/// $1–$10,000, players 2–64); this function does not re-validate.
pub fn prize_pool(entry_fee: Cents, max_players: i32) -> Cents {
    entry_fee * max_players as Cents
}

/// Split a prize pool into platform / game-master / promoter / winner shares.
///
/// The first three shares are floored percentages; the winners' prize is the
/// remainder, so the four always sum exactly to `pool`.
pub fn distribute(pool: Cents) -> PoolDistribution {
    let platform_fee = pool * PLATFORM_PCT / 100;
    let game_master_fee = pool * GAME_MASTER_PCT / 100;
    let promoters_fee = pool * PROMOTERS_PCT / 100;
    let winners_prize = pool - platform_fee - game_master_fee - promoters_fee;

    PoolDistribution {
        platform_fee,
        game_master_fee,
        promoters_fee,
        winners_prize,
    }
}

/// The referrer's cut of one participant's entry fee (10%, floored).
pub fn referral_share(entry_fee: Cents) -> Cents {
    entry_fee * REFERRAL_PCT / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_prize_pool() {
        // $25 x 8 players = $200
        assert_eq!(prize_pool(2_500, 8), 20_000);
        assert_eq!(prize_pool(100, 2), 200);
        assert_eq!(prize_pool(1_000_000, 64), 64_000_000);
    }

    #[test]
    fn test_distribute_scenario() {
        // $200 pool: platform $20, game master $10, promoters $20, winners $150
        let dist = distribute(20_000);
        assert_eq!(dist.platform_fee, 2_000);
        assert_eq!(dist.game_master_fee, 1_000);
        assert_eq!(dist.promoters_fee, 2_000);
        assert_eq!(dist.winners_prize, 15_000);
        assert_eq!(dist.total(), 20_000);
    }

    #[test]
    fn test_distribute_zero_pool() {
        let dist = distribute(0);
        assert_eq!(dist.total(), 0);
        assert_eq!(dist.winners_prize, 0);
    }

    #[test]
    fn test_distribute_indivisible_pool() {
        // 333 cents does not divide evenly; winners absorb the remainder
        let dist = distribute(333);
        assert_eq!(dist.platform_fee, 33);
        assert_eq!(dist.game_master_fee, 16);
        assert_eq!(dist.promoters_fee, 33);
        assert_eq!(dist.winners_prize, 251);
        assert_eq!(dist.total(), 333);
    }

    #[test]
    fn test_referral_share() {
        assert_eq!(referral_share(2_500), 250); // $2.50 on a $25 fee
        assert_eq!(referral_share(100), 10);
        assert_eq!(referral_share(99), 9);
    }

    proptest! {
        #[test]
        fn distribution_sums_exactly(pool in 0i64..=64 * 1_000_000) {
            let dist = distribute(pool);
            prop_assert_eq!(dist.total(), pool);
            prop_assert!(dist.platform_fee >= 0);
            prop_assert!(dist.game_master_fee >= 0);
            prop_assert!(dist.promoters_fee >= 0);
            prop_assert!(dist.winners_prize >= 0);
        }
    }
}
