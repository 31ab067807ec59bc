use serde::Serialize;

use crate::domain::model::quote::Quote;

/// Quote lifecycle events broadcast to whatever front end drives the controller
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuoteEvent {
    Created(Quote),
    Refreshed(Quote),
    /// Countdown ran out; an automatic requote is about to run
    Expiring { quote_id: String },
    Confirmed(Quote),
    Cancelled { quote_id: String },
    RequoteFailed { quote_id: String, reason: String },
    Rejected { reason: String },
}
