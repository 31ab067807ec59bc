use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use futures_util::future::join_all;
use log::{debug, info, warn};
use tokio::sync::{broadcast, RwLock};
use tokio::time::{Duration, Instant};

use crate::domain::constants::BALANCE_CURRENCIES;
use crate::domain::enums::{Asset, TradeSide};
use crate::domain::model::account::{ngn_usage, Rate, Transaction, WalletBalance};
use crate::domain::traits::AccountApi;

use super::guards::AccountSnapshot;

/// Caches balances, trade history and rates for the trade form
pub struct AccountDataManager {
    api: Arc<dyn AccountApi>,

    /// Latest balance per currency
    pub balances: RwLock<HashMap<String, WalletBalance>>,

    /// Full trade history
    pub transactions: RwLock<Vec<Transaction>>,

    /// Trades since the start of the current UTC day
    pub daily_transactions: RwLock<Vec<Transaction>>,

    pub rates: RwLock<Vec<Rate>>,
}

impl AccountDataManager {
    pub fn new(api: Arc<dyn AccountApi>) -> Self {
        Self {
            api,
            balances: RwLock::new(HashMap::new()),
            transactions: RwLock::new(Vec::new()),
            daily_transactions: RwLock::new(Vec::new()),
            rates: RwLock::new(Vec::new()),
        }
    }

    /// Fetch every wallet balance concurrently. A currency that fails to load reads as zero.
    pub async fn refresh_balances(&self) -> Result<()> {
        let fetches = BALANCE_CURRENCIES.iter().map(|&currency| async move {
            match self.api.get_balance(currency).await {
                Ok(balance) => balance,
                Err(e) => {
                    warn!("Failed to fetch {} balance: {}", currency, e);
                    WalletBalance::empty(currency)
                }
            }
        });
        let results = join_all(fetches).await;

        let mut guard = self.balances.write().await;
        for balance in results {
            debug!("Balance {}={}", balance.currency, balance.balance);
            guard.insert(balance.currency.clone(), balance);
        }
        Ok(())
    }

    /// Fetch the full history and today's trades; keeps whichever half succeeded
    pub async fn refresh_transactions(&self) -> Result<()> {
        let today = Utc::now().date_naive();
        let (all, daily) = tokio::join!(
            self.api.get_transactions(None),
            self.api.get_transactions(Some(today))
        );

        let mut failures = Vec::new();
        match all {
            Ok(txs) => *self.transactions.write().await = txs,
            Err(e) => failures.push(format!("history: {}", e)),
        }
        match daily {
            Ok(txs) => {
                debug!("{} transactions today", txs.len());
                *self.daily_transactions.write().await = txs;
            }
            Err(e) => failures.push(format!("daily: {}", e)),
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Failed to fetch transactions ({})", failures.join("; ")))
        }
    }

    pub async fn refresh_rates(&self) -> Result<()> {
        let rates = self.api.get_rates().await?;
        debug!("Loaded {} rates", rates.len());
        *self.rates.write().await = rates;
        Ok(())
    }

    /// Balances and history after a confirmed trade
    pub async fn refresh_after_trade(&self) -> Result<()> {
        let (balances, transactions) = tokio::join!(self.refresh_balances(), self.refresh_transactions());
        balances.and(transactions)
    }

    pub async fn refresh_all(&self) -> Result<()> {
        let (balances, transactions, rates) = tokio::join!(
            self.refresh_balances(),
            self.refresh_transactions(),
            self.refresh_rates()
        );
        balances.and(transactions).and(rates)
    }

    pub async fn set_balances(&self, balances: Vec<WalletBalance>) {
        let mut guard = self.balances.write().await;
        guard.clear();
        for balance in balances {
            guard.insert(balance.currency.clone(), balance);
        }
    }

    pub async fn balance_of(&self, currency: &str) -> f64 {
        self.balances
            .read()
            .await
            .get(currency)
            .map(|b| b.balance)
            .unwrap_or_default()
    }

    /// NGN spent on trades today
    pub async fn daily_usage_ngn(&self) -> f64 {
        ngn_usage(&self.daily_transactions.read().await)
    }

    /// Point-in-time view used by the submission guards
    pub async fn snapshot(&self) -> AccountSnapshot {
        let balances = self
            .balances
            .read()
            .await
            .iter()
            .map(|(currency, b)| (currency.clone(), b.balance))
            .collect();
        AccountSnapshot {
            balances,
            daily_usage_ngn: self.daily_usage_ngn().await,
        }
    }

    pub async fn rate_for(&self, asset: Asset) -> Option<Rate> {
        let market = asset.market();
        self.rates.read().await.iter().find(|r| r.marker == market).cloned()
    }

    /// Rough counter-amount from the cached rate, shown before a quote exists
    pub async fn estimate_counter_amount(&self, side: TradeSide, asset: Asset, amount: f64) -> Option<f64> {
        let rate = self.rate_for(asset).await?;
        match side {
            TradeSide::Buy if rate.buy > 0.0 => Some(amount / rate.buy),
            TradeSide::Sell if rate.sell > 0.0 => Some(amount * rate.sell),
            _ => None,
        }
    }

    /// Task to periodically refresh transactions and rates
    pub async fn poll_task(&self, period: Duration, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        info!("Account poll task started");
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.refresh_transactions().await {
                        warn!("Transaction poll failed: {}", e);
                    }
                    if let Err(e) = self.refresh_rates().await {
                        warn!("Rate poll failed: {}", e);
                    }
                }
                _ = shutdown.recv() => {
                    info!("Account poll task received shutdown signal");
                    return Ok(());
                }
            }
        }
    }
}
