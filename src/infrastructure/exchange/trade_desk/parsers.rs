use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::constants::FIAT_CURRENCY;
use crate::domain::model::account::{Rate, Transaction, WalletBalance};
use crate::domain::model::quote::QuoteTerms;

/// Normalizes trade desk JSON into domain types.
///
/// The backend is loose about shapes: amounts arrive as `{"amount": "1.5"}`,
/// `{"amount": 1.5}`, `"1.5"` or `1.5`, and payloads may or may not be wrapped
/// in a `data` envelope. Nothing past this parser sees those variations.
pub struct TradeDeskParser;

impl TradeDeskParser {
    /// Reads an amount in any of the shapes the backend uses
    pub fn amount_of(value: &Value) -> Option<f64> {
        let amount = match value {
            Value::Object(map) => return map.get("amount").and_then(Self::amount_of),
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            Value::Number(n) => n.as_f64()?,
            _ => return None,
        };
        amount.is_finite().then_some(amount)
    }

    /// Strips the optional `{"data": ...}` envelope
    pub fn unwrap_data(value: &Value) -> &Value {
        match value.get("data") {
            Some(inner) if inner.is_object() || inner.is_array() => inner,
            _ => value,
        }
    }

    /// Ids are strings on most endpoints and numbers on a few
    pub fn id_of(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Access token from a login (`accessToken`) or refresh (`access_token`) response
    pub fn parse_access_token(response: &Value) -> Result<String> {
        let data = Self::unwrap_data(response);
        ["accessToken", "access_token"]
            .iter()
            .find_map(|key| data[*key].as_str().filter(|t| !t.is_empty()))
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Session response missing access token"))
    }

    /// Parses a buy, sell or requote response.
    /// `fallback_id` covers requote responses that omit the order id.
    pub fn parse_quote_json(response: &Value, fallback_id: Option<&str>) -> Result<QuoteTerms> {
        let data = Self::unwrap_data(response);

        let id = Self::id_of(&data["id"])
            .or_else(|| fallback_id.map(str::to_string))
            .ok_or_else(|| anyhow!("Quote response missing id"))?;

        let total = Self::amount_of(&data["total"]);
        let volume = Self::amount_of(&data["volume"]);
        if total.is_none() && volume.is_none() {
            return Err(anyhow!("Quote response for {} missing total and volume", id));
        }

        Ok(QuoteTerms {
            id,
            total,
            volume,
            raw: data.clone(),
        })
    }

    /// Parses a single-currency balance response; missing fields read as zero
    pub fn parse_balance_json(currency: &str, response: &Value) -> WalletBalance {
        let data = Self::unwrap_data(response);
        WalletBalance {
            currency: currency.to_string(),
            balance: Self::amount_of(&data["balance"]).unwrap_or_default(),
            locked: Self::amount_of(&data["locked"]).unwrap_or_default(),
            converted_balance: Self::amount_of(&data["converted_balance"]).unwrap_or_default(),
        }
    }

    /// Parses the transaction history list
    pub fn parse_transactions_json(response: &Value) -> Result<Vec<Transaction>> {
        let items = Self::unwrap_data(response)
            .as_array()
            .ok_or_else(|| anyhow!("Transaction response is not a list"))?;

        Ok(items.iter().map(Self::parse_transaction).collect())
    }

    fn parse_transaction(tx: &Value) -> Transaction {
        // `market` is an object with a quote_unit on most payloads, a bare "btcngn" on older ones
        let quote_unit = match &tx["market"] {
            Value::Object(market) => market
                .get("quote_unit")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_ascii_lowercase(),
            Value::String(market) if market.to_ascii_lowercase().ends_with(FIAT_CURRENCY) => {
                FIAT_CURRENCY.to_string()
            }
            _ => String::new(),
        };

        let created_at = tx["created_at"]
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Transaction {
            id: Self::id_of(&tx["id"]).unwrap_or_default(),
            side: tx["side"].as_str().map(str::to_string),
            quote_unit,
            total_amount: Self::amount_of(&tx["total"]).unwrap_or_default(),
            volume_amount: Self::amount_of(&tx["volume"]).unwrap_or_default(),
            created_at,
        }
    }

    /// Parses the market rate list
    pub fn parse_rates_json(response: &Value) -> Result<Vec<Rate>> {
        let items = Self::unwrap_data(response)
            .as_array()
            .ok_or_else(|| anyhow!("Rates response is not a list"))?;

        Ok(items
            .iter()
            .filter_map(|rate| {
                let marker = rate["marker"].as_str()?.to_ascii_lowercase();
                Some(Rate {
                    marker,
                    buy: Self::amount_of(&rate["buy"]).unwrap_or_default(),
                    sell: Self::amount_of(&rate["sell"]).unwrap_or_default(),
                    last: Self::amount_of(&rate["last"]).unwrap_or_default(),
                })
            })
            .collect())
    }
}
