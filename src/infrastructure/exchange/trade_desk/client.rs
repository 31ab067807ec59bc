use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use log::{debug, error, info, warn};
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use url::Url;
use uuid::Uuid;

use crate::domain::enums::{Asset, TradeSide};
use crate::domain::model::account::{Rate, Transaction, WalletBalance};
use crate::domain::model::quote::QuoteTerms;
use crate::domain::traits::{AccountApi, TradeApi};

use super::models::{ApiErrorBody, LoginRequest, TokenClaims};
use super::parsers::TradeDeskParser;

pub const ACCESS_TOKEN_ENV: &str = "QUOTE_DESK_ACCESS_TOKEN";

#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub access_token: String,
}

impl ApiCredentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let token = std::env::var(ACCESS_TOKEN_ENV)
            .map_err(|_| anyhow!("Missing {}", ACCESS_TOKEN_ENV))?;
        Ok(Self::new(token.trim()))
    }

    /// Reads the token claims without checking the signature; the backend
    /// does that. Used to tell when the session needs refreshing.
    pub fn claims(&self) -> Result<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<TokenClaims>(&self.access_token, &DecodingKey::from_secret(&[]), &validation)
            .context("Failed to decode access token")?;
        Ok(data.claims)
    }

    /// A token that cannot be decoded counts as expired
    pub fn is_expired(&self) -> bool {
        match self.claims() {
            Ok(TokenClaims { exp: Some(exp), .. }) => exp <= Utc::now().timestamp(),
            Ok(_) => false,
            Err(e) => {
                debug!("Treating undecodable token as expired: {}", e);
                true
            }
        }
    }
}

/// HTTP client for the trade desk backend.
///
/// Holds the current session. An expired or missing access token is renewed
/// through `auth/refresh-token` before the next authenticated request; the
/// refresh cookie set at login travels in the client's cookie store.
pub struct TradeDeskClient {
    http: reqwest::Client,
    base_url: Url,
    session: RwLock<Option<ApiCredentials>>,
}

impl TradeDeskClient {
    pub fn new(base_url: &str, credentials: Option<ApiCredentials>, timeout: Duration) -> Result<Self> {
        // Url::join drops the last path segment unless the base ends with '/'
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).with_context(|| format!("Invalid API base URL '{}'", base_url))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            session: RwLock::new(credentials),
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Sign in with email and password and keep the returned token
    pub async fn login(&self, request: &LoginRequest) -> Result<ApiCredentials> {
        let body = serde_json::to_value(request)?;
        let response = self
            .execute(Method::POST, "auth/login", &[], Some(body), None, "Login failed")
            .await?;
        let credentials = ApiCredentials::new(TradeDeskParser::parse_access_token(&response)?);

        info!("Logged in as {}", request.email);
        *self.session.write().await = Some(credentials.clone());
        Ok(credentials)
    }

    /// End the session on the backend. The local token is dropped even if the call fails.
    pub async fn logout(&self) -> Result<()> {
        let result = self
            .execute(Method::POST, "auth/logout", &[], None, None, "Logout failed")
            .await;
        *self.session.write().await = None;
        info!("Logged out");
        result.map(|_| ())
    }

    /// Exchange the refresh cookie for a new access token
    pub async fn refresh_token(&self) -> Result<ApiCredentials> {
        let mut session = self.session.write().await;
        let credentials = self.request_refresh().await?;
        *session = Some(credentials.clone());
        Ok(credentials)
    }

    /// Claims of the current session, if it has not expired
    pub async fn current_user(&self) -> Option<TokenClaims> {
        let session = self.session.read().await;
        let credentials = session.as_ref().filter(|c| !c.is_expired())?;
        credentials.claims().ok()
    }

    async fn request_refresh(&self) -> Result<ApiCredentials> {
        let response = self
            .execute(Method::GET, "auth/refresh-token", &[], None, None, "Token refresh failed")
            .await?;
        let credentials = ApiCredentials::new(TradeDeskParser::parse_access_token(&response)?);
        debug!("Access token refreshed");
        Ok(credentials)
    }

    /// Current access token, refreshed first if missing or expired.
    /// Holding the write lock keeps concurrent requests to a single refresh.
    async fn access_token(&self) -> Result<String> {
        if let Some(credentials) = self.session.read().await.as_ref() {
            if !credentials.is_expired() {
                return Ok(credentials.access_token.clone());
            }
        }

        let mut session = self.session.write().await;
        if let Some(credentials) = session.as_ref().filter(|c| !c.is_expired()) {
            return Ok(credentials.access_token.clone());
        }

        info!("Access token missing or expired, refreshing session");
        match self.request_refresh().await {
            Ok(credentials) => {
                let token = credentials.access_token.clone();
                *session = Some(credentials);
                Ok(token)
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                *session = None;
                Err(anyhow!("Session expired"))
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        fallback_error: &str,
    ) -> Result<Value> {
        let token = self.access_token().await?;
        self.execute(method, path, query, body, Some(&token), fallback_error)
            .await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        bearer: Option<&str>,
        fallback_error: &str,
    ) -> Result<Value> {
        let url = self.endpoint(path)?;
        let request_id = Uuid::new_v4();
        // Login bodies carry the password
        if bearer.is_some() {
            debug!("{} {} request_id={} body={:?}", method, url, request_id, body);
        } else {
            debug!("{} {} request_id={}", method, url, request_id);
        }

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header("X-Request-Id", request_id.to_string());
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{} {} failed", method, url))?;

        let status = response.status();
        if !status.is_success() {
            let body: Option<ApiErrorBody> = response.json().await.ok();
            let message = body
                .and_then(|b| b.message_text())
                .unwrap_or_else(|| fallback_error.to_string());
            error!("{} {} -> {}: {}", method, url, status, message);
            return Err(anyhow!(message));
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response from {} {}", method, url))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let value: Value =
            serde_json::from_str(&text).with_context(|| format!("Invalid JSON from {} {}", method, url))?;
        debug!("{} {} -> {}", method, url, status);
        Ok(value)
    }
}

#[async_trait]
impl TradeApi for TradeDeskClient {
    async fn create_quote(&self, side: TradeSide, asset: Asset, amount: &str) -> Result<QuoteTerms> {
        let mut body = json!({ "ask": asset.as_str() });
        body[side.amount_field()] = json!(amount);

        let (path, fallback) = match side {
            TradeSide::Buy => ("trade/buy", "Failed to buy crypto"),
            TradeSide::Sell => ("trade/sell", "Failed to sell crypto"),
        };

        let response = self.send(Method::POST, path, &[], Some(body), fallback).await?;
        TradeDeskParser::parse_quote_json(&response, None)
    }

    async fn refresh_quote(&self, quote_id: &str) -> Result<QuoteTerms> {
        let path = format!("trade/requote/{}", quote_id);
        let response = self
            .send(Method::POST, &path, &[], None, "Failed to requote order")
            .await?;
        TradeDeskParser::parse_quote_json(&response, Some(quote_id))
    }
}

#[async_trait]
impl AccountApi for TradeDeskClient {
    async fn get_balance(&self, currency: &str) -> Result<WalletBalance> {
        let path = format!("wallet/{}/balance", currency);
        let response = self
            .send(Method::GET, &path, &[], None, "Failed to get wallet balance")
            .await?;
        Ok(TradeDeskParser::parse_balance_json(currency, &response))
    }

    async fn get_transactions(&self, since: Option<NaiveDate>) -> Result<Vec<Transaction>> {
        let query: Vec<(&str, String)> = since
            .map(|day| vec![("start_date", day.format("%Y-%m-%d").to_string())])
            .unwrap_or_default();
        let response = self
            .send(Method::GET, "trade", &query, None, "Failed to fetch transactions")
            .await?;
        TradeDeskParser::parse_transactions_json(&response)
    }

    async fn get_rates(&self) -> Result<Vec<Rate>> {
        let response = self
            .send(Method::GET, "trade/rates", &[], None, "Failed to get rates")
            .await?;
        TradeDeskParser::parse_rates_json(&response)
    }
}
