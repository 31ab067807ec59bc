use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::enums::{Asset, TradeSide};
use crate::domain::model::account::{Rate, Transaction, WalletBalance};
use crate::domain::model::quote::QuoteTerms;

/// Quote creation and refresh on the trading backend.
///
/// Creating a quote also executes the trade on the backend side; there is no
/// separate commit or cancel call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradeApi: Send + Sync {
    /// `amount` is the raw user input: NGN total for a buy, asset volume for a sell.
    async fn create_quote(&self, side: TradeSide, asset: Asset, amount: &str) -> Result<QuoteTerms>;
    async fn refresh_quote(&self, quote_id: &str) -> Result<QuoteTerms>;
}

/// Read-only account data: balances, trade history, market rates
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn get_balance(&self, currency: &str) -> Result<WalletBalance>;
    /// All transactions, or only those from `since` (inclusive) onwards
    async fn get_transactions(&self, since: Option<NaiveDate>) -> Result<Vec<Transaction>>;
    async fn get_rates(&self) -> Result<Vec<Rate>>;
}
