// Trading constants shared by the controller, the guards and the runner.
// These are the defaults; `TradingConfig` can override the timing and limit values.

/// Seconds a quote stays confirmable before it is refreshed.
pub const QUOTE_WINDOW_SECS: u32 = 15;

/// Daily NGN ceiling across all buy orders of the same (UTC) day.
pub const DAILY_LIMIT_NGN: f64 = 5_000_000.0;

/// How long a result notice stays visible once no quote is pending.
pub const NOTICE_DISPLAY_SECS: u64 = 5;

/// Background refresh cadence for transactions and rates.
pub const POLL_INTERVAL_SECS: u64 = 60;

/// Fiat leg of every market.
pub const FIAT_CURRENCY: &str = "ngn";

/// Currencies whose balances are fetched on every refresh.
pub const BALANCE_CURRENCIES: &[&str] = &["ngn", "btc", "eth", "usdt"];

/// Capacity of the quote event broadcast channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;
