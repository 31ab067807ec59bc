// Pre-submission checks. None of these touch the network.
use std::collections::HashMap;

use crate::domain::constants::FIAT_CURRENCY;
use crate::domain::enums::{Asset, TradeSide};
use crate::domain::errors::QuoteError;

/// Balances and same-day usage as last fetched; may be stale
#[derive(Clone, Debug, Default)]
pub struct AccountSnapshot {
    pub balances: HashMap<String, f64>,
    pub daily_usage_ngn: f64,
}

impl AccountSnapshot {
    /// Unknown currencies read as zero
    pub fn balance_of(&self, currency: &str) -> f64 {
        self.balances.get(currency).copied().unwrap_or_default()
    }
}

/// Parses the user's amount; must be a finite number above zero
pub fn parse_amount(raw: &str) -> Result<f64, QuoteError> {
    match raw.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        _ => Err(QuoteError::InvalidAmount(raw.to_string())),
    }
}

/// Runs every guard for a submission and returns the parsed amount.
///
/// Buy amounts are NGN and are checked against the NGN balance first, then
/// against the daily ceiling. Sell amounts are asset units checked against
/// that asset's balance. Sells do not count towards the daily limit.
pub fn validate_submission(
    side: TradeSide,
    asset: Asset,
    raw_amount: &str,
    snapshot: &AccountSnapshot,
    daily_limit_ngn: f64,
) -> Result<f64, QuoteError> {
    let amount = parse_amount(raw_amount)?;

    match side {
        TradeSide::Buy => {
            let available = snapshot.balance_of(FIAT_CURRENCY);
            if amount > available {
                return Err(QuoteError::InsufficientBalance {
                    asset: FIAT_CURRENCY.to_string(),
                    requested: amount,
                    available,
                });
            }

            let used = snapshot.daily_usage_ngn;
            if amount + used > daily_limit_ngn {
                return Err(QuoteError::DailyLimitExceeded {
                    requested: amount,
                    used,
                    limit: daily_limit_ngn,
                });
            }
        }
        TradeSide::Sell => {
            let available = snapshot.balance_of(asset.as_str());
            if amount > available {
                return Err(QuoteError::InsufficientBalance {
                    asset: asset.as_str().to_string(),
                    requested: amount,
                    available,
                });
            }
        }
    }

    Ok(amount)
}
