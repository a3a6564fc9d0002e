//! Dispatcher integration tests against the recording mock exchange.

use std::sync::Arc;

use ordex::error::BotError;
use ordex::exchange::mocks::MockExchange;
use ordex::order_core::dispatcher::OrderDispatcher;
use ordex::{OrderSide, OrderType};

fn dispatcher_with_mock() -> (Arc<MockExchange>, OrderDispatcher) {
    let exchange = Arc::new(MockExchange::new());
    let dispatcher = OrderDispatcher::new(exchange.clone(), "USDT");
    (exchange, dispatcher)
}

#[tokio::test]
async fn invalid_quantity_never_reaches_the_exchange() {
    let (exchange, dispatcher) = dispatcher_with_mock();

    for quantity in [0.0, -1.0, f64::NAN] {
        let err = dispatcher
            .place_market_order("BTCUSDT", "BUY", quantity)
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::InvalidParameter(_)));
    }

    assert_eq!(exchange.create_order_calls(), 0);
}

#[tokio::test]
async fn invalid_price_never_reaches_the_exchange() {
    let (exchange, dispatcher) = dispatcher_with_mock();

    let err = dispatcher
        .place_limit_order("BTCUSDT", "BUY", 1.0, -50000.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::InvalidParameter(_)));
    assert_eq!(exchange.create_order_calls(), 0);
}

#[tokio::test]
async fn symbol_is_uppercased_before_dispatch() {
    let (exchange, dispatcher) = dispatcher_with_mock();

    dispatcher.place_market_order("btcusdt", "buy", 0.5).await.unwrap();

    let orders = exchange.recorded_orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].symbol, "BTCUSDT");
    assert_eq!(orders[0].side, OrderSide::Buy);
}

#[tokio::test]
async fn wrong_quote_asset_is_rejected_locally() {
    let (exchange, dispatcher) = dispatcher_with_mock();

    let err = dispatcher
        .place_market_order("BTCBUSD", "BUY", 0.5)
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::InvalidParameter(_)));
    assert_eq!(exchange.create_order_calls(), 0);
}

#[tokio::test]
async fn symbol_check_runs_before_side_and_quantity() {
    let (exchange, dispatcher) = dispatcher_with_mock();

    // Everything is wrong; the symbol failure must be the one reported.
    let err = dispatcher.place_market_order("", "HOLD", -1.0).await.unwrap_err();
    match err {
        BotError::InvalidParameter(msg) => assert!(msg.contains("symbol")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(exchange.create_order_calls(), 0);
}

#[tokio::test]
async fn limit_order_wire_fields() {
    let (exchange, dispatcher) = dispatcher_with_mock();

    dispatcher
        .place_limit_order("ETHUSDT", "sell", 1.5, 2000.0, None)
        .await
        .unwrap();

    let orders = exchange.recorded_orders();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.symbol, "ETHUSDT");
    assert_eq!(order.side, OrderSide::Sell);
    assert_eq!(order.order_type, OrderType::Limit);
    assert_eq!(order.quantity, 1.5);
    assert_eq!(order.price, Some(2000.0));
    assert_eq!(order.time_in_force.as_deref(), Some("GTC"));
    assert_eq!(exchange.create_order_calls(), 1);
}

#[tokio::test]
async fn stop_limit_order_carries_both_prices() {
    let (exchange, dispatcher) = dispatcher_with_mock();

    dispatcher
        .place_stop_limit_order("BTCUSDT", "SELL", 0.25, 58000.0, 59000.0)
        .await
        .unwrap();

    let orders = exchange.recorded_orders();
    let order = &orders[0];
    assert_eq!(order.order_type, OrderType::StopLimit);
    assert_eq!(order.price, Some(58000.0));
    assert_eq!(order.stop_price, Some(59000.0));
    assert_eq!(order.time_in_force.as_deref(), Some("GTC"));
}

#[tokio::test]
async fn exchange_rejection_surfaces_code_and_message() {
    let exchange = Arc::new(
        MockExchange::new().fail_create_order_at(0, -2019, "Margin is insufficient."),
    );
    let dispatcher = OrderDispatcher::new(exchange.clone(), "USDT");

    let err = dispatcher
        .place_market_order("BTCUSDT", "BUY", 0.5)
        .await
        .unwrap_err();

    match err {
        BotError::Exchange { code, message } => {
            assert_eq!(code, -2019);
            assert_eq!(message, "Margin is insufficient.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // Exactly one attempt: the dispatcher never retries.
    assert_eq!(exchange.create_order_calls(), 1);
}

#[tokio::test]
async fn passthroughs_validate_symbol_first() {
    let (exchange, dispatcher) = dispatcher_with_mock();

    let err = dispatcher.get_order_status("BTCBUSD", 1).await.unwrap_err();
    assert!(matches!(err, BotError::InvalidParameter(_)));

    let err = dispatcher.cancel_order("", 1).await.unwrap_err();
    assert!(matches!(err, BotError::InvalidParameter(_)));

    assert_eq!(exchange.create_order_calls(), 0);
}

#[tokio::test]
async fn cancel_round_trip_against_mock() {
    let (_, dispatcher) = dispatcher_with_mock();

    let placed = dispatcher
        .place_limit_order("BTCUSDT", "BUY", 0.1, 40000.0, None)
        .await
        .unwrap();
    assert_eq!(placed.status, "NEW");

    let receipt = dispatcher.cancel_order("BTCUSDT", placed.order_id).await.unwrap();
    assert_eq!(receipt.status, "CANCELED");

    let fetched = dispatcher
        .get_order_status("BTCUSDT", placed.order_id)
        .await
        .unwrap();
    assert_eq!(fetched.status, "CANCELED");
}
