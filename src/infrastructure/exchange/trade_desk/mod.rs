pub mod client;
pub mod models;
pub mod parsers;

pub use client::{ApiCredentials, TradeDeskClient};
pub use models::LoginRequest;
pub use parsers::TradeDeskParser;
