// Domain model for wallet balances, transactions and rates
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::constants::FIAT_CURRENCY;

/// Balance of one wallet currency
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WalletBalance {
    pub currency: String,
    pub balance: f64,
    pub locked: f64,
    pub converted_balance: f64,
}

impl WalletBalance {
    /// Zero balance, used when a currency could not be fetched
    pub fn empty(currency: &str) -> Self {
        Self {
            currency: currency.to_string(),
            balance: 0.0,
            locked: 0.0,
            converted_balance: 0.0,
        }
    }
}

/// A past trade as reported by the transaction history endpoint
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub side: Option<String>,
    pub quote_unit: String,
    pub total_amount: f64,
    pub volume_amount: f64,
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_fiat_market(&self) -> bool {
        self.quote_unit.eq_ignore_ascii_case(FIAT_CURRENCY)
    }
}

/// Sum of NGN totals over the given transactions; other markets are ignored
pub fn ngn_usage(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|tx| tx.is_fiat_market())
        .map(|tx| tx.total_amount)
        .sum()
}

/// Market rate for one `<asset>ngn` marker
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rate {
    pub marker: String,
    pub buy: f64,
    pub sell: f64,
    pub last: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(unit: &str, total: f64) -> Transaction {
        Transaction {
            id: "t".to_string(),
            side: Some("buy".to_string()),
            quote_unit: unit.to_string(),
            total_amount: total,
            volume_amount: 0.0,
            created_at: None,
        }
    }

    #[test]
    fn ngn_usage_ignores_other_markets() {
        let txs = vec![tx("ngn", 1_000.0), tx("NGN", 500.0), tx("usdt", 99.0)];
        assert_eq!(ngn_usage(&txs), 1_500.0);
        assert_eq!(ngn_usage(&[]), 0.0);
    }
}
