// Standard library imports
use std::sync::{Arc, Weak};

// External crate imports
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tokio::time::Duration;

// Internal crate imports
use crate::config_loader::TradingConfig;
use crate::domain::constants::EVENT_CHANNEL_CAPACITY;
use crate::domain::enums::{Asset, QuoteState, TradeSide};
use crate::domain::errors::QuoteError;
use crate::domain::events::QuoteEvent;
use crate::domain::model::quote::Quote;
use crate::domain::traits::TradeApi;

use super::account_data::AccountDataManager;
use super::countdown::Countdown;
use super::guards::validate_submission;
use super::notices::{Notice, NoticeBoard};

/// Read-only view of the controller for rendering
#[derive(Clone, Debug, Serialize)]
pub struct QuoteSnapshot {
    pub pending: Option<Quote>,
    pub last_outcome: QuoteState,
    pub busy: bool,
    pub detached: bool,
}

struct SlotState {
    /// The single Pending/Expiring quote, if any
    pending: Option<Quote>,
    last_outcome: QuoteState,
    /// A create or refresh call is outstanding
    in_flight: bool,
    /// Bumped whenever the slot is replaced or emptied; responses and ticks
    /// carrying an older generation are stale
    generation: u64,
    detached: bool,
    countdown: Countdown,
    notices: NoticeBoard,
}

/// Owns the single pending-quote slot and its confirmation countdown.
///
/// Creating a quote on the backend already executes the trade; `confirm` is a
/// client-side acknowledgement only and `cancel` never reaches the backend.
pub struct QuoteController {
    me: Weak<QuoteController>,
    trade_api: Arc<dyn TradeApi>,
    account: Arc<AccountDataManager>,
    config: TradingConfig,
    state: Mutex<SlotState>,
    events: broadcast::Sender<QuoteEvent>,
}

impl QuoteController {
    pub fn new(trade_api: Arc<dyn TradeApi>, account: Arc<AccountDataManager>, config: TradingConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let notices = NoticeBoard::new(Duration::from_secs(config.notice_display_secs));

        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            trade_api,
            account,
            config,
            state: Mutex::new(SlotState {
                pending: None,
                last_outcome: QuoteState::None,
                in_flight: false,
                generation: 0,
                detached: false,
                countdown: Countdown::idle(),
                notices,
            }),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QuoteEvent> {
        self.events.subscribe()
    }

    pub fn account(&self) -> &Arc<AccountDataManager> {
        &self.account
    }

    pub async fn snapshot(&self) -> QuoteSnapshot {
        let st = self.state.lock().await;
        QuoteSnapshot {
            pending: st.pending.clone(),
            last_outcome: st.last_outcome,
            busy: st.in_flight,
            detached: st.detached,
        }
    }

    /// Current result message, if it is still on display
    pub async fn notice(&self) -> Option<Notice> {
        let st = self.state.lock().await;
        st.notices.visible(st.pending.is_some())
    }

    /// Validate and request a new quote. A successful quote replaces any
    /// pending one and starts a fresh countdown.
    pub async fn submit(&self, side: TradeSide, asset: Asset, amount: &str) -> Result<Quote, QuoteError> {
        {
            let mut guard = self.state.lock().await;
            let st = &mut *guard;
            st.notices.clear();
            if st.detached {
                return Err(QuoteError::Detached);
            }
            if st.in_flight {
                return Err(self.reject(st, QuoteError::Busy));
            }
            st.in_flight = true;
        }

        let snapshot = self.account.snapshot().await;
        let input_amount = match validate_submission(side, asset, amount, &snapshot, self.config.daily_limit_ngn) {
            Ok(value) => value,
            Err(err) => {
                let mut guard = self.state.lock().await;
                let st = &mut *guard;
                st.in_flight = false;
                return Err(self.reject(st, err));
            }
        };

        info!("Requesting {} {} quote for {}", side, asset, amount);
        let result = self.trade_api.create_quote(side, asset, amount).await;

        let mut guard = self.state.lock().await;
        let st = &mut *guard;
        st.in_flight = false;
        if st.detached {
            warn!("Discarding {} {} quote response received after shutdown", side, asset);
            return Err(QuoteError::Detached);
        }

        let quote = result
            .map_err(|e| QuoteError::TradeApi(e.to_string()))
            .and_then(|terms| Quote::new(side, asset, input_amount, terms, self.config.quote_window_secs));

        let quote = match quote {
            Ok(quote) => quote,
            Err(err) => {
                error!("Quote request failed: {}", err);
                st.last_outcome = QuoteState::Failed;
                return Err(self.reject(st, err));
            }
        };

        if let Some(previous) = st.pending.take() {
            info!("Quote {} replaced by {}", previous.id, quote.id);
        }
        st.generation += 1;
        st.countdown.stop();
        st.countdown = self.start_countdown(st.generation);
        st.last_outcome = QuoteState::Pending;
        st.pending = Some(quote.clone());
        st.notices.post(Notice::success(format!(
            "Order created! You have {} seconds to confirm.",
            quote.expires_in_seconds
        )));

        info!(
            "Quote {} pending: {} {} {} -> {} {}",
            quote.id,
            side,
            quote.input_amount,
            quote.input_unit(),
            quote.output_amount,
            quote.output_unit()
        );
        let _ = self.events.send(QuoteEvent::Created(quote.clone()));
        Ok(quote)
    }

    /// One countdown step for the slot generation the countdown was started
    /// for. Only the countdown task calls this; returns whether it should keep
    /// running.
    async fn tick(&self, generation: u64) -> bool {
        let needs_requote = {
            let mut guard = self.state.lock().await;
            let st = &mut *guard;
            if st.detached || generation != st.generation {
                return false;
            }
            let in_flight = st.in_flight;
            let Some(quote) = st.pending.as_mut() else {
                return false;
            };

            match quote.state {
                QuoteState::Pending => {
                    quote.countdown = quote.countdown.saturating_sub(1);
                    if quote.countdown > 0 {
                        return true;
                    }
                    quote.state = QuoteState::Expiring;
                    info!("Quote {} expired, requoting", quote.id);
                    let _ = self.events.send(QuoteEvent::Expiring {
                        quote_id: quote.id.clone(),
                    });
                    // An outstanding call resolves this expiry on its own
                    !in_flight
                }
                // Only reached if the expiry coincided with another call
                QuoteState::Expiring => !in_flight,
                _ => return false,
            }
        };

        if needs_requote {
            if let Err(e) = self.refresh_pending(true).await {
                debug!("Automatic requote ended with: {}", e);
            }
        }

        // A successful requote hands the slot to a fresh countdown
        let st = self.state.lock().await;
        !st.detached && st.generation == generation && st.pending.is_some()
    }

    /// Refresh the pending quote's price. The id stays the same and a full
    /// confirmation window starts over; on failure the quote is dropped.
    pub async fn requote(&self) -> Result<Quote, QuoteError> {
        self.refresh_pending(false).await
    }

    /// Shared by manual and automatic requotes. Automatic ones do not post
    /// notices for requests that never reached the backend.
    async fn refresh_pending(&self, automatic: bool) -> Result<Quote, QuoteError> {
        let (quote_id, generation) = {
            let mut guard = self.state.lock().await;
            let st = &mut *guard;
            if st.detached {
                return Err(QuoteError::Detached);
            }
            let quote_id = match st.pending.as_ref() {
                Some(quote) => quote.id.clone(),
                None if automatic => return Err(QuoteError::NoPendingQuote),
                None => return Err(self.reject(st, QuoteError::NoPendingQuote)),
            };
            if st.in_flight {
                if automatic {
                    return Err(QuoteError::Busy);
                }
                return Err(self.reject(st, QuoteError::Busy));
            }
            st.in_flight = true;
            (quote_id, st.generation)
        };

        debug!("Requesting requote for {} (automatic: {})", quote_id, automatic);
        let result = self.trade_api.refresh_quote(&quote_id).await;

        let mut guard = self.state.lock().await;
        let st = &mut *guard;
        st.in_flight = false;
        if st.detached {
            warn!("Discarding requote for {} received after shutdown", quote_id);
            return Err(QuoteError::Detached);
        }
        if st.generation != generation {
            debug!("Discarding requote for {}, quote no longer pending", quote_id);
            return Err(QuoteError::NoPendingQuote);
        }

        let refreshed = match (result, st.pending.as_mut()) {
            (Ok(terms), Some(quote)) => quote.refresh(terms).map(|_| quote.clone()),
            (Err(e), Some(_)) => Err(QuoteError::TradeApi(e.to_string())),
            (_, None) => return Err(QuoteError::NoPendingQuote),
        };

        match refreshed {
            Ok(quote) => {
                info!("Quote {} refreshed: {} {}", quote.id, quote.output_amount, quote.output_unit());
                st.generation += 1;
                st.countdown.stop();
                st.countdown = self.start_countdown(st.generation);
                st.last_outcome = QuoteState::Pending;
                st.notices.post(Notice::success(format!(
                    "Order prices updated! You have {} seconds to confirm.",
                    quote.expires_in_seconds
                )));
                let _ = self.events.send(QuoteEvent::Refreshed(quote.clone()));
                Ok(quote)
            }
            Err(err) => {
                let reason = match err {
                    QuoteError::TradeApi(message) => message,
                    other => other.to_string(),
                };
                error!("Requote for {} failed: {}", quote_id, reason);
                st.pending = None;
                st.generation += 1;
                st.countdown.stop();
                st.last_outcome = QuoteState::Cancelled;
                let err = QuoteError::RequoteFailed(reason.clone());
                st.notices.post(Notice::failure(err.user_message()));
                let _ = self.events.send(QuoteEvent::RequoteFailed { quote_id, reason });
                Err(err)
            }
        }
    }

    /// Acknowledge the pending quote. Makes no trade call; balances and
    /// history are refetched afterwards. Without a pending quote this is a no-op.
    pub async fn confirm(&self) -> Option<Quote> {
        let quote = {
            let mut guard = self.state.lock().await;
            let st = &mut *guard;
            if st.detached {
                return None;
            }
            let mut quote = st.pending.take()?;
            st.notices.clear();
            st.generation += 1;
            st.countdown.stop();
            quote.state = QuoteState::Confirmed;
            st.last_outcome = QuoteState::Confirmed;
            st.notices.post(Notice::success("Order confirmed successfully!"));
            quote
        };

        info!("Quote {} confirmed", quote.id);
        let _ = self.events.send(QuoteEvent::Confirmed(quote.clone()));

        if let Err(e) = self.account.refresh_after_trade().await {
            warn!("Refresh after confirming {} failed: {}", quote.id, e);
        }
        Some(quote)
    }

    /// Drop the pending quote locally. Does not reverse the backend trade.
    pub async fn cancel(&self) -> Option<Quote> {
        let mut guard = self.state.lock().await;
        let st = &mut *guard;
        st.notices.clear();
        let mut quote = st.pending.take()?;
        st.generation += 1;
        st.countdown.stop();
        quote.state = QuoteState::Cancelled;
        st.last_outcome = QuoteState::Cancelled;

        info!("Quote {} cancelled", quote.id);
        let _ = self.events.send(QuoteEvent::Cancelled {
            quote_id: quote.id.clone(),
        });
        Some(quote)
    }

    /// Tear down: kill the countdown and ignore every response from now on
    pub async fn shutdown(&self) {
        let mut guard = self.state.lock().await;
        let st = &mut *guard;
        if st.detached {
            return;
        }
        st.detached = true;
        st.generation += 1;
        st.countdown.abort();
        if let Some(quote) = st.pending.take() {
            info!("Shutting down with quote {} still pending", quote.id);
        }
        info!("Quote controller shut down");
    }

    fn start_countdown(&self, generation: u64) -> Countdown {
        let me = self.me.clone();
        Countdown::start(Duration::from_secs(1), move || {
            let me = me.clone();
            async move {
                match me.upgrade() {
                    Some(controller) => controller.tick(generation).await,
                    None => false,
                }
            }
        })
    }

    fn reject(&self, st: &mut SlotState, err: QuoteError) -> QuoteError {
        if err.is_guard() {
            warn!("Submission rejected: {}", err);
        } else {
            debug!("Request rejected: {}", err);
        }
        let reason = err.user_message();
        st.notices.post(Notice::failure(reason.clone()));
        let _ = self.events.send(QuoteEvent::Rejected { reason });
        err
    }
}
