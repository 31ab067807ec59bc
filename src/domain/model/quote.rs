// Domain model for trade quotes
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::domain::enums::{Asset, QuoteState, TradeSide};
use crate::domain::errors::QuoteError;

/// Normalized result of a create or refresh call.
///
/// The backend reports both legs of the order; which one is the
/// counter-amount depends on the side.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteTerms {
    pub id: String,
    /// NGN leg
    pub total: Option<f64>,
    /// Asset leg
    pub volume: Option<f64>,
    pub raw: Value,
}

impl QuoteTerms {
    pub fn counter_amount(&self, side: TradeSide) -> Result<f64, QuoteError> {
        let amount = match side {
            TradeSide::Buy => self.volume,
            TradeSide::Sell => self.total,
        };
        amount.ok_or_else(|| {
            QuoteError::TradeApi(format!("Quote {} has no {} amount", self.id, side.counter_field()))
        })
    }
}

/// A priced trade intent waiting for confirmation
#[derive(Clone, Debug, Serialize)]
pub struct Quote {
    pub id: String,
    pub side: TradeSide,
    pub asset: Asset,
    /// NGN for a buy, asset units for a sell
    pub input_amount: f64,
    /// Asset units for a buy, NGN for a sell
    pub output_amount: f64,
    pub expires_in_seconds: u32,
    pub countdown: u32,
    pub state: QuoteState,
    pub requotes: u32,
    pub created_at: DateTime<Utc>,
    pub refreshed_at: DateTime<Utc>,
    pub raw: Value,
}

impl Quote {
    pub fn new(
        side: TradeSide,
        asset: Asset,
        input_amount: f64,
        terms: QuoteTerms,
        window: u32,
    ) -> Result<Self, QuoteError> {
        let output_amount = terms.counter_amount(side)?;
        let now = Utc::now();
        Ok(Self {
            id: terms.id,
            side,
            asset,
            input_amount,
            output_amount,
            expires_in_seconds: window,
            countdown: window,
            state: QuoteState::Pending,
            requotes: 0,
            created_at: now,
            refreshed_at: now,
            raw: terms.raw,
        })
    }

    /// Apply refreshed terms. The id never changes, only the price.
    pub fn refresh(&mut self, terms: QuoteTerms) -> Result<(), QuoteError> {
        self.output_amount = terms.counter_amount(self.side)?;
        self.raw = terms.raw;
        self.countdown = self.expires_in_seconds;
        self.state = QuoteState::Pending;
        self.requotes += 1;
        self.refreshed_at = Utc::now();
        Ok(())
    }

    /// Currency the user pays with
    pub fn input_unit(&self) -> &'static str {
        match self.side {
            TradeSide::Buy => "ngn",
            TradeSide::Sell => self.asset.as_str(),
        }
    }

    /// Currency the user receives
    pub fn output_unit(&self) -> &'static str {
        match self.side {
            TradeSide::Buy => self.asset.as_str(),
            TradeSide::Sell => "ngn",
        }
    }
}
