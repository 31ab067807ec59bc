use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;
use tokio::time::{sleep, Duration};

use super::*;
use crate::config_loader::TradingConfig;
use crate::domain::enums::{Asset, QuoteState, TradeSide};
use crate::domain::errors::QuoteError;
use crate::domain::events::QuoteEvent;
use crate::domain::model::account::{Rate, Transaction, WalletBalance};
use crate::domain::model::quote::QuoteTerms;
use crate::domain::traits::{MockAccountApi, MockTradeApi, TradeApi};

/// Trade API double that records calls and can hold responses until released
#[derive(Default)]
struct FakeTradeApi {
    creates: AtomicUsize,
    refreshes: AtomicUsize,
    refreshed_ids: std::sync::Mutex<Vec<String>>,
    create_error: Option<String>,
    /// Leading creates that succeed at once, ignoring the gate and the error
    passthrough_creates: usize,
    /// Counter-amounts (or failures) handed out by successive requotes
    refresh_script: std::sync::Mutex<VecDeque<Result<f64, String>>>,
    create_gate: Option<Arc<Notify>>,
    refresh_gate: Option<Arc<Notify>>,
}

impl FakeTradeApi {
    fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    fn with_refreshes(results: Vec<Result<f64, String>>) -> Self {
        Self {
            refresh_script: std::sync::Mutex::new(results.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl TradeApi for FakeTradeApi {
    async fn create_quote(&self, _side: TradeSide, _asset: Asset, amount: &str) -> anyhow::Result<QuoteTerms> {
        let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        if n > self.passthrough_creates {
            if let Some(gate) = &self.create_gate {
                gate.notified().await;
            }
            if let Some(message) = &self.create_error {
                return Err(anyhow!(message.clone()));
            }
        }
        Ok(QuoteTerms {
            id: format!("Q{}", n),
            total: amount.parse().ok(),
            volume: Some(0.0025),
            raw: json!({ "id": format!("Q{}", n), "volume": { "amount": "0.0025" } }),
        })
    }

    async fn refresh_quote(&self, quote_id: &str) -> anyhow::Result<QuoteTerms> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.refreshed_ids.lock().unwrap().push(quote_id.to_string());
        if let Some(gate) = &self.refresh_gate {
            gate.notified().await;
        }
        let next = self.refresh_script.lock().unwrap().pop_front().unwrap_or(Ok(0.00248));
        match next {
            Ok(amount) => Ok(QuoteTerms {
                id: quote_id.to_string(),
                total: Some(amount),
                volume: Some(amount),
                raw: json!({ "volume": { "amount": amount.to_string() } }),
            }),
            Err(message) => Err(anyhow!(message)),
        }
    }
}

struct Harness {
    controller: Arc<QuoteController>,
    api: Arc<FakeTradeApi>,
    balance_calls: Arc<AtomicUsize>,
}

fn daily_tx(total: f64) -> Transaction {
    Transaction {
        id: "T1".to_string(),
        side: Some("buy".to_string()),
        quote_unit: "ngn".to_string(),
        total_amount: total,
        volume_amount: 0.0,
        created_at: None,
    }
}

async fn account(ngn: f64, btc: f64, used_today: f64) -> (Arc<AccountDataManager>, Arc<AtomicUsize>) {
    let balance_calls = Arc::new(AtomicUsize::new(0));
    let calls = balance_calls.clone();

    let mut api = MockAccountApi::new();
    api.expect_get_balance().returning(move |currency| {
        calls.fetch_add(1, Ordering::SeqCst);
        let balance = match currency {
            "ngn" => ngn,
            "btc" => btc,
            _ => 0.0,
        };
        Ok(WalletBalance {
            balance,
            ..WalletBalance::empty(currency)
        })
    });
    api.expect_get_transactions().returning(move |since| match since {
        Some(_) if used_today > 0.0 => Ok(vec![daily_tx(used_today)]),
        _ => Ok(vec![]),
    });
    api.expect_get_rates().returning(|| -> anyhow::Result<Vec<Rate>> { Ok(vec![]) });

    let data = Arc::new(AccountDataManager::new(Arc::new(api)));
    data.refresh_all().await.unwrap();
    (data, balance_calls)
}

async fn harness_with(api: FakeTradeApi, ngn: f64, btc: f64) -> Harness {
    let (data, balance_calls) = account(ngn, btc, 0.0).await;
    let api = Arc::new(api);
    let controller = QuoteController::new(api.clone(), data, TradingConfig::default());
    Harness {
        controller,
        api,
        balance_calls,
    }
}

async fn harness() -> Harness {
    harness_with(FakeTradeApi::default(), 100_000.0, 1.0).await
}

async fn guarded_controller(ngn: f64, btc: f64, used_today: f64) -> Arc<QuoteController> {
    let mut api = MockTradeApi::new();
    api.expect_create_quote().never();
    api.expect_refresh_quote().never();
    let (data, _) = account(ngn, btc, used_today).await;
    QuoteController::new(Arc::new(api), data, TradingConfig::default())
}

async fn wait_until_busy(controller: &QuoteController) {
    while !controller.snapshot().await.busy {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn invalid_amounts_never_reach_the_api() {
    let controller = guarded_controller(100_000.0, 1.0, 0.0).await;

    for raw in ["", "abc", "0", "-1", "NaN"] {
        let err = controller.submit(TradeSide::Buy, Asset::Btc, raw).await.unwrap_err();
        assert_eq!(err, QuoteError::InvalidAmount(raw.to_string()));
    }

    let snap = controller.snapshot().await;
    assert!(snap.pending.is_none());
    assert!(!snap.busy, "guard failures must release the in-flight flag");
    assert_eq!(snap.last_outcome, QuoteState::None);
    assert_eq!(
        controller.notice().await.map(|n| n.message),
        Some("Please enter a valid amount".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn buy_above_ngn_balance_is_rejected_locally() {
    let controller = guarded_controller(100_000.0, 0.0, 0.0).await;

    let err = controller.submit(TradeSide::Buy, Asset::Btc, "100001").await.unwrap_err();

    assert!(matches!(err, QuoteError::InsufficientBalance { ref asset, .. } if asset == "ngn"));
    assert_eq!(
        controller.notice().await.map(|n| n.message),
        Some("Insufficient NGN balance".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn buy_over_daily_limit_is_rejected_locally() {
    let controller = guarded_controller(10_000_000.0, 0.0, 4_990_000.0).await;

    let err = controller.submit(TradeSide::Buy, Asset::Usdt, "20000").await.unwrap_err();

    assert_eq!(
        err,
        QuoteError::DailyLimitExceeded {
            requested: 20_000.0,
            used: 4_990_000.0,
            limit: 5_000_000.0,
        }
    );
    assert_eq!(
        controller.notice().await.map(|n| n.message),
        Some("Transaction exceeds daily trading limit".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn sell_above_asset_balance_is_rejected_locally() {
    let controller = guarded_controller(0.0, 0.1, 0.0).await;

    let err = controller.submit(TradeSide::Sell, Asset::Btc, "0.2").await.unwrap_err();

    assert!(matches!(err, QuoteError::InsufficientBalance { ref asset, .. } if asset == "btc"));
}

#[tokio::test(start_paused = true)]
async fn buy_is_requoted_on_expiry_then_confirmed() {
    let h = harness().await;
    let mut events = h.controller.subscribe();

    let quote = h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap();
    assert_eq!(quote.id, "Q1");
    assert_eq!(quote.state, QuoteState::Pending);
    assert_eq!(quote.countdown, 15);
    assert_eq!(quote.output_amount, 0.0025);
    assert!(matches!(events.recv().await.unwrap(), QuoteEvent::Created(q) if q.id == "Q1"));

    // Window runs out at t=15s and the quote is refreshed in place
    sleep(Duration::from_millis(15_500)).await;
    assert_eq!(h.api.refreshes(), 1);
    let pending = h.controller.snapshot().await.pending.unwrap();
    assert_eq!(pending.id, "Q1");
    assert_eq!(pending.state, QuoteState::Pending);
    assert_eq!(pending.countdown, 15);
    assert_eq!(pending.output_amount, 0.00248);
    assert_eq!(pending.requotes, 1);
    assert!(matches!(events.recv().await.unwrap(), QuoteEvent::Expiring { quote_id } if quote_id == "Q1"));
    assert!(matches!(events.recv().await.unwrap(), QuoteEvent::Refreshed(q) if q.id == "Q1"));

    // Confirm 5s into the second window
    sleep(Duration::from_secs(5)).await;
    assert_eq!(h.controller.snapshot().await.pending.unwrap().countdown, 10);
    let balance_calls_before = h.balance_calls.load(Ordering::SeqCst);

    let confirmed = h.controller.confirm().await.unwrap();

    assert_eq!(confirmed.id, "Q1");
    assert_eq!(confirmed.state, QuoteState::Confirmed);
    let snap = h.controller.snapshot().await;
    assert!(snap.pending.is_none());
    assert_eq!(snap.last_outcome, QuoteState::Confirmed);
    assert_eq!(h.balance_calls.load(Ordering::SeqCst), balance_calls_before + 4);
    assert_eq!(h.api.creates(), 1, "confirmation makes no trade call");
    assert_eq!(
        h.controller.notice().await.map(|n| n.message),
        Some("Order confirmed successfully!".to_string())
    );
    assert!(matches!(events.recv().await.unwrap(), QuoteEvent::Confirmed(q) if q.id == "Q1"));

    // The countdown is gone with the quote
    sleep(Duration::from_secs(60)).await;
    assert_eq!(h.api.refreshes(), 1);
}

#[tokio::test(start_paused = true)]
async fn countdown_decrements_once_per_second() {
    let h = harness().await;
    h.controller.submit(TradeSide::Sell, Asset::Btc, "0.5").await.unwrap();

    sleep(Duration::from_millis(3_500)).await;
    assert_eq!(h.controller.snapshot().await.pending.unwrap().countdown, 12);

    sleep(Duration::from_secs(11)).await;
    let pending = h.controller.snapshot().await.pending.unwrap();
    assert_eq!(pending.countdown, 1);
    assert_eq!(h.api.refreshes(), 0);
}

#[tokio::test(start_paused = true)]
async fn each_expiry_triggers_exactly_one_requote() {
    let h = harness().await;
    h.controller.submit(TradeSide::Buy, Asset::Eth, "1000").await.unwrap();

    sleep(Duration::from_millis(15_500)).await;
    assert_eq!(h.api.refreshes(), 1);

    sleep(Duration::from_secs(14)).await;
    assert_eq!(h.api.refreshes(), 1);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(h.api.refreshes(), 2);
    assert_eq!(*h.api.refreshed_ids.lock().unwrap(), vec!["Q1", "Q1"]);
}

#[tokio::test(start_paused = true)]
async fn failed_requote_drops_the_quote() {
    let h = harness_with(
        FakeTradeApi::with_refreshes(vec![Ok(0.0024), Err("Order not found".to_string())]),
        100_000.0,
        0.0,
    )
    .await;
    let mut events = h.controller.subscribe();
    h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap();

    sleep(Duration::from_millis(30_500)).await;

    assert_eq!(h.api.refreshes(), 2);
    let snap = h.controller.snapshot().await;
    assert!(snap.pending.is_none());
    assert_eq!(snap.last_outcome, QuoteState::Cancelled);
    assert_eq!(
        h.controller.notice().await.map(|n| n.message),
        Some("Failed to update order prices".to_string())
    );

    let mut saw_failure = false;
    while let Ok(event) = events.try_recv() {
        if let QuoteEvent::RequoteFailed { quote_id, reason } = event {
            assert_eq!(quote_id, "Q1");
            assert_eq!(reason, "Order not found");
            saw_failure = true;
        }
    }
    assert!(saw_failure);

    // Nothing left to refresh
    sleep(Duration::from_secs(60)).await;
    assert_eq!(h.api.refreshes(), 2);
    assert!(h.controller.confirm().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn manual_requote_keeps_id_and_restarts_window() {
    let h = harness().await;
    h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap();

    sleep(Duration::from_millis(5_500)).await;
    assert_eq!(h.controller.snapshot().await.pending.unwrap().countdown, 10);

    let refreshed = h.controller.requote().await.unwrap();

    assert_eq!(refreshed.id, "Q1");
    assert_eq!(refreshed.countdown, 15);
    assert_eq!(refreshed.state, QuoteState::Pending);
    assert_eq!(
        h.controller.notice().await.map(|n| n.message),
        Some("Order prices updated! You have 15 seconds to confirm.".to_string())
    );

    // Next automatic refresh is a full window after the manual one, at t=20.5s
    sleep(Duration::from_secs(14)).await;
    assert_eq!(h.api.refreshes(), 1);
    sleep(Duration::from_millis(1_200)).await;
    assert_eq!(h.api.refreshes(), 2);
}

#[tokio::test(start_paused = true)]
async fn manual_requote_between_ticks_gets_a_full_window() {
    let h = harness().await;
    h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap();

    // Just before the tick at t=6s
    sleep(Duration::from_millis(5_900)).await;
    h.controller.requote().await.unwrap();

    sleep(Duration::from_millis(200)).await;
    assert_eq!(h.controller.snapshot().await.pending.unwrap().countdown, 15);

    sleep(Duration::from_millis(900)).await;
    assert_eq!(h.controller.snapshot().await.pending.unwrap().countdown, 14);

    // Window restarted at t=5.9s, so it runs out at t=20.9s
    sleep(Duration::from_millis(13_800)).await;
    assert_eq!(h.api.refreshes(), 1);
    let pending = h.controller.snapshot().await.pending.unwrap();
    assert_eq!(pending.countdown, 1);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(h.api.refreshes(), 2);
}

#[tokio::test(start_paused = true)]
async fn expiry_during_failed_submit_is_requoted_on_next_tick() {
    let gate = Arc::new(Notify::new());
    let h = harness_with(
        FakeTradeApi {
            create_gate: Some(gate.clone()),
            create_error: Some("Market is closed".to_string()),
            passthrough_creates: 1,
            ..FakeTradeApi::default()
        },
        100_000.0,
        0.0,
    )
    .await;
    h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap();

    sleep(Duration::from_millis(14_500)).await;
    let second = tokio::spawn({
        let controller = h.controller.clone();
        async move { controller.submit(TradeSide::Buy, Asset::Btc, "20000").await }
    });
    wait_until_busy(&h.controller).await;

    // Countdown reaches zero at t=15s while the create is held
    sleep(Duration::from_secs(2)).await;
    assert_eq!(h.api.refreshes(), 0);
    let pending = h.controller.snapshot().await.pending.unwrap();
    assert_eq!(pending.id, "Q1");
    assert_eq!(pending.state, QuoteState::Expiring);

    gate.notify_one();
    assert_eq!(
        second.await.unwrap().unwrap_err(),
        QuoteError::TradeApi("Market is closed".to_string())
    );
    assert_eq!(h.api.refreshes(), 0);

    // Tick at t=17s finds nothing in flight
    sleep(Duration::from_secs(1)).await;
    assert_eq!(h.api.refreshes(), 1);
    let pending = h.controller.snapshot().await.pending.unwrap();
    assert_eq!(pending.id, "Q1");
    assert_eq!(pending.state, QuoteState::Pending);
    assert_eq!(pending.countdown, 15);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(h.api.refreshes(), 1);
}

#[tokio::test(start_paused = true)]
async fn requote_without_pending_quote_is_rejected() {
    let h = harness().await;
    assert_eq!(h.controller.requote().await.unwrap_err(), QuoteError::NoPendingQuote);
    assert_eq!(h.api.refreshes(), 0);
}

#[tokio::test(start_paused = true)]
async fn confirm_is_a_no_op_the_second_time() {
    let h = harness().await;
    assert!(h.controller.confirm().await.is_none());

    h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap();
    assert!(h.controller.confirm().await.is_some());
    let calls_after_first = h.balance_calls.load(Ordering::SeqCst);

    assert!(h.controller.confirm().await.is_none());
    assert_eq!(h.balance_calls.load(Ordering::SeqCst), calls_after_first);
    assert_eq!(h.controller.snapshot().await.last_outcome, QuoteState::Confirmed);
}

#[tokio::test(start_paused = true)]
async fn cancel_clears_slot_without_network_calls() {
    let h = harness().await;
    h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap();
    let balance_calls = h.balance_calls.load(Ordering::SeqCst);

    let cancelled = h.controller.cancel().await.unwrap();

    assert_eq!(cancelled.state, QuoteState::Cancelled);
    let snap = h.controller.snapshot().await;
    assert!(snap.pending.is_none());
    assert_eq!(snap.last_outcome, QuoteState::Cancelled);
    assert_eq!(h.controller.notice().await, None);

    sleep(Duration::from_secs(45)).await;
    assert_eq!(h.api.creates(), 1);
    assert_eq!(h.api.refreshes(), 0);
    assert_eq!(h.balance_calls.load(Ordering::SeqCst), balance_calls);
    assert!(h.controller.cancel().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn new_quote_after_terminal_state() {
    let h = harness().await;
    h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap();
    h.controller.cancel().await;

    let quote = h.controller.submit(TradeSide::Buy, Asset::Btc, "40000").await.unwrap();

    assert_eq!(quote.id, "Q2");
    assert_eq!(h.controller.snapshot().await.last_outcome, QuoteState::Pending);
}

#[tokio::test(start_paused = true)]
async fn second_submit_replaces_the_pending_quote() {
    let h = harness().await;
    h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap();

    sleep(Duration::from_millis(7_500)).await;
    let second = h.controller.submit(TradeSide::Buy, Asset::Eth, "20000").await.unwrap();

    assert_eq!(second.id, "Q2");
    let pending = h.controller.snapshot().await.pending.unwrap();
    assert_eq!(pending.id, "Q2");
    assert_eq!(pending.asset, Asset::Eth);

    // The first quote's countdown would have expired at t=15s; only Q2's fires, at t=22.5s
    sleep(Duration::from_secs(10)).await;
    assert_eq!(h.api.refreshes(), 0);
    sleep(Duration::from_millis(5_500)).await;
    assert_eq!(*h.api.refreshed_ids.lock().unwrap(), vec!["Q2"]);
}

#[tokio::test(start_paused = true)]
async fn submit_while_a_call_is_outstanding_is_busy() {
    let gate = Arc::new(Notify::new());
    let h = harness_with(
        FakeTradeApi {
            create_gate: Some(gate.clone()),
            ..FakeTradeApi::default()
        },
        100_000.0,
        0.0,
    )
    .await;

    let first = tokio::spawn({
        let controller = h.controller.clone();
        async move { controller.submit(TradeSide::Buy, Asset::Btc, "50000").await }
    });
    wait_until_busy(&h.controller).await;

    let err = h.controller.submit(TradeSide::Buy, Asset::Btc, "1000").await.unwrap_err();
    assert_eq!(err, QuoteError::Busy);
    assert_eq!(h.api.creates(), 1);

    gate.notify_one();
    let quote = first.await.unwrap().unwrap();
    assert_eq!(quote.id, "Q1");
    assert!(!h.controller.snapshot().await.busy);
}

#[tokio::test(start_paused = true)]
async fn expiry_during_manual_requote_does_not_double_call() {
    let gate = Arc::new(Notify::new());
    let h = harness_with(
        FakeTradeApi {
            refresh_gate: Some(gate.clone()),
            ..FakeTradeApi::default()
        },
        100_000.0,
        0.0,
    )
    .await;
    h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap();

    sleep(Duration::from_millis(14_500)).await;
    let manual = tokio::spawn({
        let controller = h.controller.clone();
        async move { controller.requote().await }
    });
    wait_until_busy(&h.controller).await;

    // Countdown reaches zero at t=15s while the manual call is outstanding
    sleep(Duration::from_secs(2)).await;
    assert_eq!(h.api.refreshes(), 1);
    assert_eq!(
        h.controller.snapshot().await.pending.unwrap().state,
        QuoteState::Expiring
    );

    gate.notify_one();
    let refreshed = manual.await.unwrap().unwrap();
    assert_eq!(refreshed.state, QuoteState::Pending);
    assert_eq!(refreshed.countdown, 15);
    assert_eq!(h.api.refreshes(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_create_retains_nothing() {
    let h = harness_with(
        FakeTradeApi {
            create_error: Some("Market is closed".to_string()),
            ..FakeTradeApi::default()
        },
        100_000.0,
        0.0,
    )
    .await;

    let err = h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap_err();

    assert_eq!(err, QuoteError::TradeApi("Market is closed".to_string()));
    let snap = h.controller.snapshot().await;
    assert!(snap.pending.is_none());
    assert_eq!(snap.last_outcome, QuoteState::Failed);
    assert_eq!(
        h.controller.notice().await.map(|n| n.message),
        Some("Market is closed".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn notices_expire_only_when_nothing_is_pending() {
    let h = harness().await;

    h.controller.submit(TradeSide::Buy, Asset::Btc, "oops").await.unwrap_err();
    sleep(Duration::from_millis(5_500)).await;
    assert_eq!(h.controller.notice().await, None);

    h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap();
    sleep(Duration::from_secs(10)).await;
    assert_eq!(
        h.controller.notice().await.map(|n| n.kind),
        Some(NoticeKind::Success)
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_countdown() {
    let h = harness().await;
    h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap();

    sleep(Duration::from_secs(3)).await;
    h.controller.shutdown().await;
    h.controller.shutdown().await;

    sleep(Duration::from_secs(60)).await;
    assert_eq!(h.api.refreshes(), 0);
    let snap = h.controller.snapshot().await;
    assert!(snap.detached);
    assert!(snap.pending.is_none());
    assert_eq!(
        h.controller.submit(TradeSide::Buy, Asset::Btc, "50000").await.unwrap_err(),
        QuoteError::Detached
    );
    assert!(h.controller.confirm().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn response_after_shutdown_is_discarded() {
    let gate = Arc::new(Notify::new());
    let h = harness_with(
        FakeTradeApi {
            create_gate: Some(gate.clone()),
            ..FakeTradeApi::default()
        },
        100_000.0,
        0.0,
    )
    .await;

    let submit = tokio::spawn({
        let controller = h.controller.clone();
        async move { controller.submit(TradeSide::Buy, Asset::Btc, "50000").await }
    });
    wait_until_busy(&h.controller).await;

    h.controller.shutdown().await;
    gate.notify_one();

    assert_eq!(submit.await.unwrap().unwrap_err(), QuoteError::Detached);
    assert!(h.controller.snapshot().await.pending.is_none());

    sleep(Duration::from_secs(30)).await;
    assert_eq!(h.api.refreshes(), 0);
}
