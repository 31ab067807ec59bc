pub mod config_loader;
pub mod domain;
pub mod infrastructure;
pub mod workflows;

pub use domain::constants::*;
pub use domain::enums::*;
pub use domain::errors::QuoteError;
pub use domain::events::QuoteEvent;
pub use domain::model::account::*;
pub use domain::model::quote::*;
pub use infrastructure::exchange::trade_desk::*;
pub use workflows::quote_confirmation::*;
