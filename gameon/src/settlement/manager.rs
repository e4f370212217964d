//! Earnings settlement: referral credits on payment, winner payouts on
//! completion.

use std::sync::Arc;

use log::{info, warn};

use crate::db::GameStore;
use crate::game::errors::{GameError, GameResult};
use crate::game::models::{EarningKind, Game, GameId, GameParticipant, GameStatus, UserId};
use crate::ledger::{self, parse_payout_structure, split_prize};

/// Posts earnings ledger entries. Never moves real money; it records who
/// is owed what.
#[derive(Clone)]
pub struct SettlementManager {
    store: Arc<dyn GameStore>,
}

impl SettlementManager {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    /// Credit the referrer's share for a freshly paid entry fee.
    ///
    /// Must only be called after the participant's `has_paid` flag was
    /// flipped by the caller; the flip is what makes this run at most once
    /// per participant. No referral on record means nothing to settle.
    pub async fn settle_payment(
        &self,
        game: &Game,
        participant: &GameParticipant,
    ) -> GameResult<()> {
        let referral = match self
            .store
            .find_referral(participant.user_id, game.id)
            .await?
        {
            Some(referral) => referral,
            None => return Ok(()),
        };

        let share = ledger::referral_share(game.entry_fee);
        if share == 0 {
            return Ok(());
        }

        self.store
            .add_earning(
                referral.referrer_id,
                Some(game.id),
                share,
                EarningKind::Referrer,
            )
            .await?;
        self.store.add_referral_earnings(referral.id, share).await?;

        info!(
            "referral credit: user {} earned {} cents for referring user {} into game {}",
            referral.referrer_id, share, participant.user_id, game.id
        );
        Ok(())
    }

    /// Pay out the winners' prize of a completed game.
    ///
    /// `placements` lists user ids in finishing order; each must be a
    /// participant. Tiers beyond the number of placements are skipped with
    /// a warning. Runs at most once per game: a second call fails with
    /// `AlreadySettled`.
    pub async fn settle_completed_game(
        &self,
        actor: UserId,
        game_id: GameId,
        placements: &[UserId],
    ) -> GameResult<Vec<(UserId, ledger::Cents)>> {
        let game = self
            .store
            .get_game(game_id)
            .await?
            .ok_or(GameError::GameNotFound(game_id))?;

        if game.game_master_id != actor {
            return Err(GameError::NotAuthorized);
        }
        if game.status != GameStatus::Completed {
            return Err(GameError::InvalidTransition {
                from: game.status,
                to: GameStatus::Completed,
            });
        }

        let existing = self.store.list_game_earnings(game_id).await?;
        if existing.iter().any(|e| e.kind == EarningKind::Winner) {
            return Err(GameError::AlreadySettled(game_id));
        }

        for user_id in placements {
            if self.store.get_participant(game_id, *user_id).await?.is_none() {
                return Err(GameError::ParticipantNotFound {
                    game_id,
                    user_id: *user_id,
                });
            }
        }

        let tiers = parse_payout_structure(&game.payout_structure)?;
        let split = ledger::distribute(game.prize_pool);
        let prizes = split_prize(split.winners_prize, &tiers);

        let mut payouts = Vec::new();
        for (tier_idx, amount) in prizes.iter().enumerate() {
            let Some(user_id) = placements.get(tier_idx).copied() else {
                warn!(
                    "game {game_id}: payout tier {} has no placement, {} cents unawarded",
                    tier_idx + 1,
                    amount
                );
                continue;
            };
            if *amount == 0 {
                continue;
            }
            self.store
                .add_earning(user_id, Some(game_id), *amount, EarningKind::Winner)
                .await?;
            payouts.push((user_id, *amount));
        }

        info!(
            "game {game_id} settled: {} winner payout(s) from a {}-cent winners prize",
            payouts.len(),
            split.winners_prize
        );
        Ok(payouts)
    }
}
