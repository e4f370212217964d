//! Payment coordinator: ties provider reservations to participants and
//! fires settlement exactly once per paid entry.

use std::sync::Arc;

use log::{info, warn};

use crate::db::GameStore;
use crate::game::errors::GameError;
use crate::game::models::{Game, GameId, GameParticipant, UserId};
use crate::settlement::SettlementManager;

use super::errors::{PaymentError, PaymentResult};
use super::models::{PaymentIntent, ReservationStatus};
use super::provider::PaymentProvider;

/// Coordinates the entry-fee payment flow.
///
/// Confirmation and webhook delivery can race; both funnel through the
/// store's conditional paid-flag flip, so whichever path loses the race
/// becomes a no-op and settlement runs exactly once.
#[derive(Clone)]
pub struct PaymentCoordinator {
    store: Arc<dyn GameStore>,
    provider: Arc<dyn PaymentProvider>,
    settlement: SettlementManager,
}

impl PaymentCoordinator {
    pub fn new(
        store: Arc<dyn GameStore>,
        provider: Arc<dyn PaymentProvider>,
        settlement: SettlementManager,
    ) -> Self {
        Self {
            store,
            provider,
            settlement,
        }
    }

    async fn game_and_participant(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> PaymentResult<(Game, GameParticipant)> {
        let game = self
            .store
            .get_game(game_id)
            .await
            .map_err(PaymentError::Store)?
            .ok_or(PaymentError::Store(GameError::GameNotFound(game_id)))?;
        let participant = self
            .store
            .get_participant(game_id, user_id)
            .await
            .map_err(PaymentError::Store)?
            .ok_or(PaymentError::NotJoined { game_id, user_id })?;
        Ok((game, participant))
    }

    /// Reserve a charge for a participant's entry fee.
    pub async fn create_reservation(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> PaymentResult<PaymentIntent> {
        let (game, participant) = self.game_and_participant(game_id, user_id).await?;
        if participant.has_paid {
            return Err(PaymentError::AlreadyPaid);
        }

        let reservation = self.provider.create_reservation(game.entry_fee).await?;
        self.store
            .record_reservation(&reservation.reference, game_id, user_id, game.entry_fee)
            .await
            .map_err(PaymentError::Store)?;

        info!(
            "reserved {} cents for user {user_id} in game {game_id} (ref {})",
            game.entry_fee, reservation.reference
        );
        Ok(PaymentIntent {
            reference: reservation.reference,
            client_secret: reservation.client_secret,
            amount: game.entry_fee,
        })
    }

    /// Confirm a payment from the client side.
    ///
    /// Verifies the provider reports the reservation as succeeded, then
    /// flips the paid flag. Returns the participant; calling it again for
    /// an already-paid participant is a successful no-op, so clients can
    /// retry safely.
    pub async fn confirm_payment(
        &self,
        game_id: GameId,
        user_id: UserId,
        reference: &str,
    ) -> PaymentResult<GameParticipant> {
        let reservation = self
            .store
            .get_reservation(reference)
            .await
            .map_err(PaymentError::Store)?
            .ok_or_else(|| PaymentError::UnknownReservation(reference.to_string()))?;
        if reservation.game_id != game_id || reservation.user_id != user_id {
            return Err(PaymentError::UnknownReservation(reference.to_string()));
        }

        if self.provider.reservation_status(reference).await? != ReservationStatus::Succeeded {
            return Err(PaymentError::PaymentNotCompleted);
        }

        self.settle_paid(game_id, user_id).await
    }

    /// Apply a provider notification (webhook delivery).
    ///
    /// Unknown references are discarded rather than erroring: the provider
    /// retries deliveries and may also notify about charges we never made.
    pub async fn handle_notification(
        &self,
        reference: &str,
        status: ReservationStatus,
    ) -> PaymentResult<()> {
        let reservation = match self
            .store
            .get_reservation(reference)
            .await
            .map_err(PaymentError::Store)?
        {
            Some(reservation) => reservation,
            None => {
                warn!("discarding notification for unknown reservation {reference}");
                return Ok(());
            }
        };

        match status {
            ReservationStatus::Succeeded => {
                self.settle_paid(reservation.game_id, reservation.user_id)
                    .await?;
            }
            ReservationStatus::Failed => {
                info!(
                    "payment failed for user {} in game {} (ref {reference})",
                    reservation.user_id, reservation.game_id
                );
            }
            ReservationStatus::Pending => {}
        }
        Ok(())
    }

    async fn settle_paid(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> PaymentResult<GameParticipant> {
        let (game, participant) = self.game_and_participant(game_id, user_id).await?;

        let flipped = self
            .store
            .mark_participant_paid(participant.id)
            .await
            .map_err(PaymentError::Store)?;
        if !flipped {
            // Another confirmation path got here first.
            return Ok(participant);
        }

        self.settlement
            .settle_payment(&game, &participant)
            .await
            .map_err(PaymentError::Store)?;

        info!("user {user_id} paid entry fee for game {game_id}");
        self.store
            .get_participant(game_id, user_id)
            .await
            .map_err(PaymentError::Store)?
            .ok_or(PaymentError::NotJoined { game_id, user_id })
    }
}
