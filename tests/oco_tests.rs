//! OCO composite order tests.
//!
//! The legs are two independent exchange orders, so the partial-failure
//! path is the correctness-critical one: a resting take-profit order must
//! never be swallowed by a generic error.

use std::sync::Arc;

use ordex::error::BotError;
use ordex::exchange::mocks::MockExchange;
use ordex::order_core::dispatcher::OrderDispatcher;
use ordex::strategies::oco::OcoOrder;
use ordex::{OrderSide, OrderType};

fn oco(
    dispatcher: Arc<OrderDispatcher>,
    stop_limit_price: Option<f64>,
) -> OcoOrder {
    OcoOrder::new(
        dispatcher,
        "BTCUSDT",
        "BUY",
        0.5,
        62000.0,
        58000.0,
        stop_limit_price,
    )
}

#[tokio::test]
async fn both_legs_use_the_opposite_side() {
    let exchange = Arc::new(MockExchange::new());
    let dispatcher = Arc::new(OrderDispatcher::new(exchange.clone(), "USDT"));

    let report = oco(dispatcher, None).place().await.unwrap();

    assert_eq!(report.close_side, OrderSide::Sell);

    let orders = exchange.recorded_orders();
    assert_eq!(orders.len(), 2);

    // Leg 1: take-profit limit at 62000.
    assert_eq!(orders[0].order_type, OrderType::Limit);
    assert_eq!(orders[0].side, OrderSide::Sell);
    assert_eq!(orders[0].price, Some(62000.0));

    // Leg 2: stop-limit, trigger defaulting to the stop-loss price.
    assert_eq!(orders[1].order_type, OrderType::StopLimit);
    assert_eq!(orders[1].side, OrderSide::Sell);
    assert_eq!(orders[1].price, Some(58000.0));
    assert_eq!(orders[1].stop_price, Some(58000.0));

    assert_eq!(report.take_profit_order.order_id, 1000);
    assert_eq!(report.stop_loss_order.order_id, 1001);
}

#[tokio::test]
async fn explicit_stop_limit_price_is_used_for_the_stop_leg() {
    let exchange = Arc::new(MockExchange::new());
    let dispatcher = Arc::new(OrderDispatcher::new(exchange.clone(), "USDT"));

    oco(dispatcher, Some(57900.0)).place().await.unwrap();

    let orders = exchange.recorded_orders();
    assert_eq!(orders[1].price, Some(57900.0));
    assert_eq!(orders[1].stop_price, Some(58000.0));
}

#[tokio::test]
async fn sell_position_closes_with_buy_legs() {
    let exchange = Arc::new(MockExchange::new());
    let dispatcher = Arc::new(OrderDispatcher::new(exchange.clone(), "USDT"));

    let report = OcoOrder::new(dispatcher, "ETHUSDT", "sell", 2.0, 1800.0, 2200.0, None)
        .place()
        .await
        .unwrap();

    assert_eq!(report.close_side, OrderSide::Buy);
    for order in exchange.recorded_orders() {
        assert_eq!(order.side, OrderSide::Buy);
    }
}

#[tokio::test]
async fn failed_stop_leg_reports_the_resting_take_profit_order() {
    // Leg 1 (call 0) succeeds, leg 2 (call 1) is rejected.
    let exchange = Arc::new(
        MockExchange::new().fail_create_order_at(1, -1102, "Mandatory parameter was not sent."),
    );
    let dispatcher = Arc::new(OrderDispatcher::new(exchange.clone(), "USDT"));

    let err = oco(dispatcher, None).place().await.unwrap_err();

    match err {
        BotError::OcoPartial {
            symbol,
            take_profit_order,
            reason,
        } => {
            assert_eq!(symbol, "BTCUSDT");
            assert_eq!(take_profit_order.order_id, 1000);
            assert_eq!(take_profit_order.status, "NEW");
            assert!(matches!(*reason, BotError::Exchange { code: -1102, .. }));
        }
        other => panic!("expected OcoPartial, got: {:?}", other),
    }

    // Both legs were attempted; nothing was retried or cancelled.
    assert_eq!(exchange.create_order_calls(), 2);
}

#[tokio::test]
async fn failed_take_profit_leg_is_a_plain_error() {
    let exchange = Arc::new(
        MockExchange::new().fail_create_order_at(0, -2019, "Margin is insufficient."),
    );
    let dispatcher = Arc::new(OrderDispatcher::new(exchange.clone(), "USDT"));

    let err = oco(dispatcher, None).place().await.unwrap_err();

    // Nothing is resting, so no partial state to report.
    assert!(matches!(err, BotError::Exchange { code: -2019, .. }));
    assert_eq!(exchange.create_order_calls(), 1);
}

#[tokio::test]
async fn invalid_parameters_fail_before_any_leg_is_placed() {
    let exchange = Arc::new(MockExchange::new());
    let dispatcher = Arc::new(OrderDispatcher::new(exchange.clone(), "USDT"));

    let err = OcoOrder::new(dispatcher, "BTCUSDT", "BUY", 0.5, -62000.0, 58000.0, None)
        .place()
        .await
        .unwrap_err();

    assert!(matches!(err, BotError::InvalidParameter(_)));
    assert_eq!(exchange.create_order_calls(), 0);
}
