use thiserror::Error;

/// Failures surfaced to the user by the quote controller.
///
/// Guard variants (`InvalidAmount`, `UnsupportedAsset`, `InsufficientBalance`,
/// `DailyLimitExceeded`) are raised before any network call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuoteError {
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("unsupported asset: {0}")]
    UnsupportedAsset(String),

    #[error("insufficient {asset} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        asset: String,
        requested: f64,
        available: f64,
    },

    #[error("daily limit exceeded: requested {requested} with {used} already used, limit {limit}")]
    DailyLimitExceeded { requested: f64, used: f64, limit: f64 },

    #[error("trade api error: {0}")]
    TradeApi(String),

    #[error("requote failed: {0}")]
    RequoteFailed(String),

    #[error("no pending quote")]
    NoPendingQuote,

    #[error("another quote request is still outstanding")]
    Busy,

    #[error("controller has been shut down")]
    Detached,
}

impl QuoteError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            QuoteError::InvalidAmount(_) => "Please enter a valid amount".to_string(),
            QuoteError::UnsupportedAsset(asset) => format!("{} is not supported", asset.to_uppercase()),
            QuoteError::InsufficientBalance { asset, .. } => {
                format!("Insufficient {} balance", asset.to_uppercase())
            }
            QuoteError::DailyLimitExceeded { .. } => "Transaction exceeds daily trading limit".to_string(),
            QuoteError::TradeApi(message) => message.clone(),
            QuoteError::RequoteFailed(_) => "Failed to update order prices".to_string(),
            QuoteError::NoPendingQuote => "No pending order".to_string(),
            QuoteError::Busy => "Please wait for the current request to finish".to_string(),
            QuoteError::Detached => "Trading session closed".to_string(),
        }
    }

    /// True for failures raised by the local guards, before any network call.
    pub fn is_guard(&self) -> bool {
        matches!(
            self,
            QuoteError::InvalidAmount(_)
                | QuoteError::UnsupportedAsset(_)
                | QuoteError::InsufficientBalance { .. }
                | QuoteError::DailyLimitExceeded { .. }
        )
    }
}
