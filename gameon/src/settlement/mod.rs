//! Settlement of earnings: referral credits and winner payouts.

pub mod manager;

pub use manager::SettlementManager;
