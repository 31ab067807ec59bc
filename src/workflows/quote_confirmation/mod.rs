//! Quote confirmation workflow
//!
//! A trade quote is requested after local balance and limit checks, held for a
//! short confirmation window, refreshed when the window runs out, and finally
//! confirmed or cancelled by the user.

mod account_data;
mod controller;
mod countdown;
pub mod guards;
mod notices;

#[cfg(test)]
mod controller_test;

pub use account_data::AccountDataManager;
pub use controller::{QuoteController, QuoteSnapshot};
pub use countdown::Countdown;
pub use guards::{validate_submission, AccountSnapshot};
pub use notices::{Notice, NoticeBoard, NoticeKind};
