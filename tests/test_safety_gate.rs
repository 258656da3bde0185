//! Integration tests for the safety gate, risk limits and capability checks.
//!
//! Run with: `cargo test --test test_safety_gate`

mod common;

use common::{env, harness, harness_with, FakeExchange, FakeNotifier, EXCHANGE_ENV};
use mcp_crypto_bot::Action;
use serde_json::{json, Value};

const LIVE_CONFIRMED: [(&str, &str); 2] = [("LIVE", "true"), ("AM_I_SURE", "YES")];

fn order(notional: &str) -> Value {
    json!({"symbol": "BTCUSDT", "side": "buy", "amount": "0.001", "notional_usd": notional})
}

/// Test mode, confirmation "NO", 50 USD order under a 100 USD max.
#[tokio::test]
async fn test_order_in_test_mode_is_dry_run() {
    let pairs = env(&[&EXCHANGE_ENV, &[("AM_I_SURE", "NO"), ("MAX_ORDER_USD", "100")]]);
    let h = harness(&pairs);

    let envelope = h.dispatcher.dispatch("place_order", order("50")).await;

    assert!(envelope.success(), "unexpected failure: {:?}", envelope.error());
    let data = envelope.data().unwrap();
    assert_eq!(data["status"], "dry_run");
    assert_eq!(data["symbol"], "BTCUSDT");
    assert_eq!(h.collaborator_calls(), 0);
}

/// Live and confirmed, 150 USD order over a 100 USD max.
#[tokio::test]
async fn test_oversized_order_rejected_even_when_gate_open() {
    let pairs = env(&[&EXCHANGE_ENV, &LIVE_CONFIRMED, &[("MAX_ORDER_USD", "100")]]);
    let h = harness(&pairs);

    let envelope = h.dispatcher.dispatch("place_order", order("150")).await;

    assert!(!envelope.success());
    assert!(envelope.data().is_none());
    assert!(envelope.error().unwrap().starts_with("RiskLimitExceeded"));
    assert_eq!(h.exchange.log.count(), 0);
}

#[tokio::test]
async fn test_oversized_order_rejected_in_test_mode() {
    let h = harness(&env(&[&EXCHANGE_ENV, &[("MAX_ORDER_USD", "100")]]));

    let envelope = h.dispatcher.dispatch("place_order", order("100.01")).await;

    assert!(envelope.error().unwrap().starts_with("RiskLimitExceeded"));
}

#[tokio::test]
async fn test_order_at_limit_is_allowed() {
    let h = harness(&env(&[&EXCHANGE_ENV, &[("MAX_ORDER_USD", "100")]]));

    let envelope = h.dispatcher.dispatch("place_order", order("100")).await;

    assert_eq!(envelope.data().unwrap()["status"], "dry_run");
}

#[tokio::test]
async fn test_notional_derived_from_amount_and_price() {
    let h = harness(&env(&[&EXCHANGE_ENV, &[("MAX_ORDER_USD", "100")]]));
    let params = json!({
        "symbol": "BTC/USDT",
        "side": "sell",
        "order_type": "limit",
        "amount": "0.01",
        "price": "60000"
    });

    let envelope = h.dispatcher.dispatch("place_order", params).await;

    // 0.01 * 60000 = 600 > 100
    assert!(envelope.error().unwrap().starts_with("RiskLimitExceeded"));
}

/// Live and confirmed, a 10 @ 3000 limit order declaring a 1 USD notional.
#[tokio::test]
async fn test_declared_notional_cannot_understate_limit_order() {
    let pairs = env(&[&EXCHANGE_ENV, &LIVE_CONFIRMED, &[("MAX_ORDER_USD", "100")]]);
    let h = harness(&pairs);
    let params = json!({
        "symbol": "ETHUSDT",
        "side": "buy",
        "order_type": "limit",
        "amount": "10",
        "price": "3000",
        "notional_usd": "1"
    });

    let envelope = h.dispatcher.dispatch("place_order", params).await;

    assert!(!envelope.success());
    let error = envelope.error().unwrap();
    assert!(error.starts_with("RiskLimitExceeded"), "got {}", error);
    assert!(error.contains("30000"), "got {}", error);
    assert_eq!(h.exchange.log.count(), 0);
}

#[tokio::test]
async fn test_live_market_order_carries_checked_notional() {
    let pairs = env(&[&EXCHANGE_ENV, &LIVE_CONFIRMED, &[("MAX_ORDER_USD", "100")]]);
    let h = harness(&pairs);
    let params = json!({"symbol": "BTCUSDT", "side": "buy", "amount": "10", "notional_usd": "50"});

    let envelope = h.dispatcher.dispatch("place_order", params).await;

    assert!(envelope.success(), "unexpected failure: {:?}", envelope.error());
    assert_eq!(envelope.data().unwrap()["notional_usd"], "50");
    assert_eq!(h.exchange.log.calls(), vec!["place_order"]);
}

#[tokio::test]
async fn test_market_order_without_notional_is_invalid() {
    let h = harness(&EXCHANGE_ENV);
    let params = json!({"symbol": "BTCUSDT", "side": "buy", "amount": "1"});

    let envelope = h.dispatcher.dispatch("place_order", params).await;

    assert!(!envelope.success());
    assert!(envelope.error().unwrap().contains("notional_usd"));
    assert_eq!(h.collaborator_calls(), 0);
}

/// Live mode with near-miss confirmation tokens behaves exactly like test mode.
#[tokio::test]
async fn test_near_miss_confirmation_keeps_gate_closed() {
    for token in ["yes", "Yes", "YES ", " YES", "Y", "TRUE", ""] {
        let mut pairs = env(&[&EXCHANGE_ENV, &[("LIVE", "true")]]);
        pairs.push(("AM_I_SURE", token));
        let h = harness(&pairs);

        let placed = h.dispatcher.dispatch("place_order", order("50")).await;
        let cancelled = h
            .dispatcher
            .dispatch("cancel_order", json!({"symbol": "BTCUSDT", "order_id": "42"}))
            .await;

        assert_eq!(placed.data().unwrap()["status"], "dry_run", "token {:?}", token);
        assert_eq!(cancelled.data().unwrap()["status"], "dry_run", "token {:?}", token);
        assert_eq!(h.collaborator_calls(), 0, "token {:?} reached a collaborator", token);
    }
}

fn state_changing_params(action: Action) -> Value {
    match action {
        Action::PlaceOrder => order("50"),
        Action::CancelOrder => json!({"symbol": "BTCUSDT", "order_id": "42"}),
        other => panic!("no parameters for state-changing action {}", other),
    }
}

#[tokio::test]
async fn test_every_state_changing_action_is_gated() {
    let state_changing: Vec<Action> =
        Action::ALL.into_iter().filter(|a| a.is_state_changing()).collect();
    assert!(!state_changing.is_empty());

    for action in state_changing {
        let closed = harness(&env(&[&EXCHANGE_ENV, &[("LIVE", "true"), ("AM_I_SURE", "NO")]]));
        let params = state_changing_params(action);
        let envelope = closed.dispatcher.dispatch(action.name(), params).await;
        assert_eq!(envelope.data().unwrap()["status"], "dry_run", "{}", action);
        assert_eq!(closed.collaborator_calls(), 0, "{} reached a collaborator", action);

        let open = harness(&env(&[&EXCHANGE_ENV, &LIVE_CONFIRMED]));
        let params = state_changing_params(action);
        let envelope = open.dispatcher.dispatch(action.name(), params).await;
        assert!(envelope.success(), "{} failed: {:?}", action, envelope.error());
        assert_eq!(open.exchange.log.calls(), vec![action.name()], "{}", action);
    }
}

#[tokio::test]
async fn test_test_mode_with_confirmation_is_dry_run() {
    let h = harness(&env(&[&EXCHANGE_ENV, &[("LIVE", "false"), ("AM_I_SURE", "YES")]]));

    let envelope = h.dispatcher.dispatch("place_order", order("10")).await;

    assert_eq!(envelope.data().unwrap()["status"], "dry_run");
    assert_eq!(h.collaborator_calls(), 0);
}

#[tokio::test]
async fn test_live_order_reaches_exchange_and_notifies() {
    let pairs = env(&[
        &EXCHANGE_ENV,
        &LIVE_CONFIRMED,
        &[("TELEGRAM_BOT_TOKEN", "1:abc"), ("OWNER_TELEGRAM_ID", "42")],
    ]);
    let h = harness(&pairs);

    let envelope = h.dispatcher.dispatch("place_order", order("50")).await;

    assert!(envelope.success());
    assert_eq!(envelope.data().unwrap()["status"], "filled");
    assert_eq!(h.exchange.log.calls(), vec!["place_order"]);
    assert_eq!(h.notifier.log.count(), 1);
    assert!(h.notifier.log.calls()[0].contains("BTCUSDT"));
}

#[tokio::test]
async fn test_live_order_without_chat_notify_skips_notification() {
    let h = harness(&env(&[&EXCHANGE_ENV, &LIVE_CONFIRMED]));

    let envelope = h.dispatcher.dispatch("place_order", order("50")).await;

    assert!(envelope.success());
    assert_eq!(h.notifier.log.count(), 0);
}

#[tokio::test]
async fn test_notification_failure_does_not_change_envelope() {
    let pairs = env(&[
        &EXCHANGE_ENV,
        &LIVE_CONFIRMED,
        &[("TELEGRAM_BOT_TOKEN", "1:abc"), ("OWNER_TELEGRAM_ID", "42")],
    ]);
    let notifier = FakeNotifier { fail: true, ..Default::default() };
    let h = harness_with(&pairs, FakeExchange::default(), notifier);

    let params = json!({"symbol": "BTCUSDT", "order_id": "7"});
    let envelope = h.dispatcher.dispatch("cancel_order", params).await;

    assert!(envelope.success());
    assert_eq!(envelope.data().unwrap()["status"], "canceled");
    assert_eq!(h.notifier.log.count(), 1);
}

#[tokio::test]
async fn test_live_exchange_failure_is_wrapped() {
    let h = harness_with(
        &env(&[&EXCHANGE_ENV, &LIVE_CONFIRMED]),
        FakeExchange::failing(),
        FakeNotifier::default(),
    );

    let envelope = h.dispatcher.dispatch("place_order", order("50")).await;

    assert!(!envelope.success());
    let error = envelope.error().unwrap();
    assert!(error.starts_with("CollaboratorError: binance"), "got {}", error);
    assert!(error.contains("Too many requests"));
}

#[tokio::test]
async fn test_daily_loss_limit_blocks_orders() {
    let h = harness(&env(&[&EXCHANGE_ENV, &[("DAILY_LOSS_LIMIT_USD", "200")]]));

    let report = h.dispatcher.dispatch("record_pnl", json!({"pnl_usd": "-150"})).await;
    assert_eq!(report.data().unwrap()["remaining_loss_budget_usd"], "50");
    assert!(h.dispatcher.dispatch("place_order", order("10")).await.success());

    h.dispatcher.dispatch("record_pnl", json!({"pnl_usd": "-50"})).await;
    let blocked = h.dispatcher.dispatch("place_order", order("10")).await;

    assert!(blocked.error().unwrap().starts_with("RiskLimitExceeded"));
}

#[tokio::test]
async fn test_cancel_is_not_blocked_by_daily_loss() {
    let h = harness(&env(&[&EXCHANGE_ENV, &[("DAILY_LOSS_LIMIT_USD", "10")]]));
    h.dispatcher.dispatch("record_pnl", json!({"pnl_usd": "-500"})).await;

    let envelope = h
        .dispatcher
        .dispatch("cancel_order", json!({"symbol": "BTCUSDT", "order_id": "1"}))
        .await;

    assert_eq!(envelope.data().unwrap()["status"], "dry_run");
}

/// Exchange credentials absent, "get balance".
#[tokio::test]
async fn test_get_balance_without_credentials_is_not_configured() {
    let h = harness(&[]);

    let envelope = h.dispatcher.dispatch("get_balance", Value::Null).await;

    assert!(envelope.success());
    assert_eq!(envelope.data().unwrap()["status"], "not_configured");
    assert_eq!(envelope.data().unwrap()["capability"], "exchange-trading");
    assert_eq!(h.collaborator_calls(), 0);
}

#[tokio::test]
async fn test_unconfigured_capability_ignores_mode() {
    for pairs in [vec![], LIVE_CONFIRMED.to_vec()] {
        let h = harness(&pairs);
        let cases = [
            ("get_price", json!({"symbol": "BTCUSDT"})),
            ("place_order", order("500")),
            ("cancel_order", json!({"symbol": "BTCUSDT", "order_id": "1"})),
            ("get_eth_balance", json!({})),
            ("ai_query", json!({"provider": "openai", "prompt": "hi"})),
            ("send_notification", json!({"message": "hi"})),
        ];

        for (action, params) in cases {
            let envelope = h.dispatcher.dispatch(action, params).await;
            assert!(envelope.success(), "{} failed: {:?}", action, envelope.error());
            assert_eq!(envelope.data().unwrap()["status"], "not_configured", "{}", action);
        }
        assert_eq!(h.collaborator_calls(), 0);
    }
}

#[tokio::test]
async fn test_unknown_action() {
    let h = harness(&EXCHANGE_ENV);

    let envelope = h.dispatcher.dispatch("withdraw_everything", Value::Null).await;

    assert!(!envelope.success());
    assert!(envelope.error().unwrap().starts_with("UnknownAction"));
}
