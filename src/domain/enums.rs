use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::domain::errors::QuoteError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

// Always serialize as the lowercase string the trade endpoints expect
impl Serialize for TradeSide {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }

    /// Name of the request field carrying the user's amount: NGN `total` for
    /// a buy, asset `volume` for a sell.
    pub fn amount_field(&self) -> &'static str {
        match self {
            TradeSide::Buy => "total",
            TradeSide::Sell => "volume",
        }
    }

    /// Name of the response field carrying the computed counter-amount.
    pub fn counter_field(&self) -> &'static str {
        match self {
            TradeSide::Buy => "volume",
            TradeSide::Sell => "total",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSide {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TradeSide::Buy),
            "sell" => Ok(TradeSide::Sell),
            other => Err(anyhow::anyhow!("Unknown trade side: {}", other)),
        }
    }
}

/// Crypto assets tradable against NGN.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Btc,
    Eth,
    Usdt,
}

impl Serialize for Asset {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl Asset {
    pub const ALL: [Asset; 3] = [Asset::Btc, Asset::Eth, Asset::Usdt];

    pub fn as_str(&self) -> &'static str {
        match self {
            Asset::Btc => "btc",
            Asset::Eth => "eth",
            Asset::Usdt => "usdt",
        }
    }

    /// Rate marker for this asset's NGN market, e.g. `btcngn`.
    pub fn market(&self) -> String {
        format!("{}ngn", self.as_str())
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Asset {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "btc" => Ok(Asset::Btc),
            "eth" => Ok(Asset::Eth),
            "usdt" => Ok(Asset::Usdt),
            other => Err(QuoteError::UnsupportedAsset(other.to_string())),
        }
    }
}

/// Lifecycle of a trade quote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteState {
    None,
    Pending,
    Expiring,
    Confirmed,
    Cancelled,
    Failed,
}

impl Serialize for QuoteState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl QuoteState {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteState::None => "none",
            QuoteState::Pending => "pending",
            QuoteState::Expiring => "expiring",
            QuoteState::Confirmed => "confirmed",
            QuoteState::Cancelled => "cancelled",
            QuoteState::Failed => "failed",
        }
    }

    /// Pending or Expiring: the quote still occupies the slot.
    pub fn is_live(&self) -> bool {
        matches!(self, QuoteState::Pending | QuoteState::Expiring)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QuoteState::Confirmed | QuoteState::Cancelled)
    }
}
