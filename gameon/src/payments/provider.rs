//! Payment provider abstraction and the in-process sandbox provider.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::ledger::Cents;

use super::errors::{PaymentError, PaymentResult};
use super::models::{ProviderReservation, ReservationStatus};

/// External payment processor interface.
///
/// Providers hold money, not domain state. They know nothing about games
/// or participants; correlation back to the domain happens through the
/// reservation records the coordinator persists.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Reserve a charge for the given amount. Returns the provider's
    /// reference and the client secret the frontend completes the charge
    /// with.
    async fn create_reservation(&self, amount: Cents) -> PaymentResult<ProviderReservation>;

    /// Current status of a reservation.
    async fn reservation_status(&self, reference: &str) -> PaymentResult<ReservationStatus>;
}

struct SandboxCharge {
    status: ReservationStatus,
}

/// In-process provider for development and tests.
///
/// Reservations start `Pending`; tests (or the dev webhook endpoint) move
/// them to `Succeeded` or `Failed` with [`SandboxPaymentProvider::settle`].
pub struct SandboxPaymentProvider {
    charges: Mutex<HashMap<String, SandboxCharge>>,
}

impl SandboxPaymentProvider {
    pub fn new() -> Self {
        Self {
            charges: Mutex::new(HashMap::new()),
        }
    }

    /// Move a reservation to a terminal status, simulating the processor
    /// completing (or declining) the charge.
    pub async fn settle(&self, reference: &str, status: ReservationStatus) -> PaymentResult<()> {
        let mut charges = self.charges.lock().await;
        let charge = charges
            .get_mut(reference)
            .ok_or_else(|| PaymentError::UnknownReservation(reference.to_string()))?;
        charge.status = status;
        Ok(())
    }
}

impl Default for SandboxPaymentProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProvider for SandboxPaymentProvider {
    async fn create_reservation(&self, amount: Cents) -> PaymentResult<ProviderReservation> {
        if amount <= 0 {
            return Err(PaymentError::Provider(format!(
                "cannot reserve non-positive amount {amount}"
            )));
        }

        let reference = format!("sbx_{}", Uuid::new_v4().simple());
        let client_secret = format!("{}_secret_{}", reference, Uuid::new_v4().simple());
        let mut charges = self.charges.lock().await;
        charges.insert(
            reference.clone(),
            SandboxCharge {
                status: ReservationStatus::Pending,
            },
        );
        Ok(ProviderReservation {
            reference,
            client_secret,
        })
    }

    async fn reservation_status(&self, reference: &str) -> PaymentResult<ReservationStatus> {
        let charges = self.charges.lock().await;
        charges
            .get(reference)
            .map(|c| c.status)
            .ok_or_else(|| PaymentError::UnknownReservation(reference.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reservation_starts_pending_and_settles() {
        let provider = SandboxPaymentProvider::new();
        let res = provider.create_reservation(2_500).await.unwrap();
        assert_eq!(
            provider.reservation_status(&res.reference).await.unwrap(),
            ReservationStatus::Pending
        );

        provider
            .settle(&res.reference, ReservationStatus::Succeeded)
            .await
            .unwrap();
        assert_eq!(
            provider.reservation_status(&res.reference).await.unwrap(),
            ReservationStatus::Succeeded
        );
    }

    #[tokio::test]
    async fn unknown_reference_is_an_error() {
        let provider = SandboxPaymentProvider::new();
        assert!(matches!(
            provider.reservation_status("sbx_missing").await,
            Err(PaymentError::UnknownReservation(_))
        ));
    }

    #[tokio::test]
    async fn non_positive_amount_rejected() {
        let provider = SandboxPaymentProvider::new();
        assert!(provider.create_reservation(0).await.is_err());
    }
}
