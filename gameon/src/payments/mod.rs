//! Entry-fee payments: provider abstraction, reservations, confirmation.

pub mod coordinator;
pub mod errors;
pub mod models;
pub mod provider;

pub use coordinator::PaymentCoordinator;
pub use errors::{PaymentError, PaymentResult};
pub use models::{PaymentIntent, PaymentReservation, ProviderReservation, ReservationStatus};
pub use provider::{PaymentProvider, SandboxPaymentProvider};
