//! Payout-structure parsing and winner splits.
//!
//! A payout structure is stored on the game as a comma-separated string of
//! `label:percentage` entries, e.g. `"1st:70,2nd:30"`. Percentages must be
//! integers summing to 100; anything else is rejected at parse time so the
//! winner settlement can never mint or burn money.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::math::Cents;

/// Ledger math errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Malformed payout spec entry: {0:?}")]
    MalformedPayoutSpec(String),

    #[error("Payout percentages sum to {0}, expected 100")]
    PayoutPercentagesNot100(i64),
}

impl LedgerError {
    /// Stable machine-checkable identifier for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::MalformedPayoutSpec(_) => "malformed_payout_spec",
            LedgerError::PayoutPercentagesNot100(_) => "payout_percentages_not_100",
        }
    }
}

/// One position in a payout structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutTier {
    /// Position label, e.g. "1st"
    pub label: String,
    /// Share of the winners' prize, in percent
    pub percent: i64,
}

/// Parse a `label:percentage` payout structure string.
///
/// # Errors
///
/// * `MalformedPayoutSpec` - an entry lacks a colon, has an empty label, or
///   a percentage that is not a non-negative integer
/// * `PayoutPercentagesNot100` - percentages do not sum to exactly 100
pub fn parse_payout_structure(spec: &str) -> Result<Vec<PayoutTier>, LedgerError> {
    let mut tiers = Vec::new();

    for entry in spec.split(',') {
        let entry = entry.trim();
        let (label, pct) = entry
            .split_once(':')
            .ok_or_else(|| LedgerError::MalformedPayoutSpec(entry.to_string()))?;

        let label = label.trim();
        if label.is_empty() {
            return Err(LedgerError::MalformedPayoutSpec(entry.to_string()));
        }

        let percent: i64 = pct
            .trim()
            .parse()
            .map_err(|_| LedgerError::MalformedPayoutSpec(entry.to_string()))?;
        if percent < 0 {
            return Err(LedgerError::MalformedPayoutSpec(entry.to_string()));
        }

        tiers.push(PayoutTier {
            label: label.to_string(),
            percent,
        });
    }

    let total: i64 = tiers.iter().map(|t| t.percent).sum();
    if total != 100 {
        return Err(LedgerError::PayoutPercentagesNot100(total));
    }

    Ok(tiers)
}

/// Split the winners' prize across payout tiers.
///
/// Each tier gets its floored percentage; the remainder is folded into the
/// first tier so the splits sum exactly to `winners_prize`.
pub fn split_prize(winners_prize: Cents, tiers: &[PayoutTier]) -> Vec<Cents> {
    if tiers.is_empty() {
        return Vec::new();
    }

    let mut splits: Vec<Cents> = tiers
        .iter()
        .map(|t| winners_prize * t.percent / 100)
        .collect();

    let allocated: Cents = splits.iter().sum();
    splits[0] += winners_prize - allocated;
    splits
}
