use async_trait::async_trait;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::BotError;
use crate::exchange::traits::Exchange;
use crate::models::order::{AssetBalance, CancelReceipt, NewOrder, OrderResult, OrderType};

/// A mock implementation of the `Exchange` trait for testing and mock mode.
///
/// Records every `create_order` call so tests can assert what was (or was
/// not) sent, and supports scripted failures: the Nth create_order call can
/// be made to fail with a given exchange error, and ping can be made
/// unreachable. Market orders fill immediately at a jittered reference
/// price; limit and stop orders rest as NEW.
pub struct MockExchange {
    state: Mutex<MockState>,
    create_calls: AtomicUsize,
    fail_create_at: Option<usize>,
    fail_code: i64,
    fail_message: String,
    unreachable: bool,
    reference_price: f64,
}

struct MockState {
    orders: Vec<(NewOrder, OrderResult)>,
    next_order_id: i64,
}

impl MockExchange {
    pub fn new() -> Self {
        MockExchange {
            state: Mutex::new(MockState {
                orders: Vec::new(),
                next_order_id: 1000,
            }),
            create_calls: AtomicUsize::new(0),
            fail_create_at: None,
            fail_code: -2019,
            fail_message: "Margin is insufficient.".to_string(),
            unreachable: false,
            reference_price: 50000.0,
        }
    }

    /// Fail the `index`-th (0-based) create_order call with the given
    /// exchange error; all other calls succeed.
    pub fn fail_create_order_at(mut self, index: usize, code: i64, message: impl Into<String>) -> Self {
        self.fail_create_at = Some(index);
        self.fail_code = code;
        self.fail_message = message.into();
        self
    }

    /// Make `ping` fail as if the venue were unreachable.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn with_reference_price(mut self, price: f64) -> Self {
        self.reference_price = price;
        self
    }

    /// Number of create_order calls that reached the mock, including ones
    /// that were scripted to fail.
    pub fn create_order_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Every order the mock accepted or rejected, in arrival order.
    pub fn recorded_orders(&self) -> Vec<NewOrder> {
        let state = self.state.lock().expect("mock state poisoned");
        state.orders.iter().map(|(order, _)| order.clone()).collect()
    }

    fn fill(&self, order: &NewOrder, order_id: i64) -> OrderResult {
        let (status, executed_qty, price) = match order.order_type {
            OrderType::Market => {
                let jitter = rand::thread_rng().gen_range(-0.0005..0.0005);
                ("FILLED", order.quantity, self.reference_price * (1.0 + jitter))
            }
            OrderType::Limit | OrderType::StopLimit => ("NEW", 0.0, order.price.unwrap_or(0.0)),
        };
        let raw = serde_json::json!({
            "orderId": order_id,
            "symbol": order.symbol,
            "side": order.side.as_str(),
            "type": order.order_type.as_str(),
            "status": status,
            "origQty": format!("{}", order.quantity),
            "executedQty": format!("{}", executed_qty),
            "price": format!("{}", price),
            "timeInForce": order.time_in_force.clone().unwrap_or_else(|| "GTC".to_string()),
        });
        OrderResult {
            order_id,
            symbol: order.symbol.clone(),
            side: order.side,
            status: status.to_string(),
            executed_qty,
            price,
            raw,
        }
    }
}

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Exchange for MockExchange {
    async fn create_order(&self, order: &NewOrder) -> Result<OrderResult, BotError> {
        let call_index = self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_create_at == Some(call_index) {
            return Err(BotError::Exchange {
                code: self.fail_code,
                message: self.fail_message.clone(),
            });
        }

        let mut state = self.state.lock().expect("mock state poisoned");
        let order_id = state.next_order_id;
        state.next_order_id += 1;
        let result = self.fill(order, order_id);
        state.orders.push((order.clone(), result.clone()));
        Ok(result)
    }

    async fn get_order(&self, _symbol: &str, order_id: i64) -> Result<OrderResult, BotError> {
        let state = self.state.lock().expect("mock state poisoned");
        state
            .orders
            .iter()
            .find(|(_, result)| result.order_id == order_id)
            .map(|(_, result)| result.clone())
            .ok_or(BotError::Exchange {
                code: -2013,
                message: "Order does not exist.".to_string(),
            })
    }

    async fn cancel_order(&self, symbol: &str, order_id: i64) -> Result<CancelReceipt, BotError> {
        let mut state = self.state.lock().expect("mock state poisoned");
        let entry = state
            .orders
            .iter_mut()
            .find(|(_, result)| result.order_id == order_id)
            .ok_or(BotError::Exchange {
                code: -2011,
                message: "Unknown order sent.".to_string(),
            })?;
        entry.1.status = "CANCELED".to_string();
        Ok(CancelReceipt {
            order_id,
            symbol: symbol.to_string(),
            status: "CANCELED".to_string(),
            raw: entry.1.raw.clone(),
        })
    }

    async fn get_balances(&self) -> Result<Vec<AssetBalance>, BotError> {
        Ok(vec![
            AssetBalance {
                asset: "USDT".to_string(),
                balance: 10000.0,
                available_balance: 10000.0,
            },
            AssetBalance {
                asset: "BNB".to_string(),
                balance: 0.0,
                available_balance: 0.0,
            },
        ])
    }

    async fn ping(&self) -> Result<(), BotError> {
        if self.unreachable {
            return Err(BotError::Connectivity("mock exchange is unreachable".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderSide;

    #[tokio::test]
    async fn records_and_fills_market_orders() {
        let exchange = MockExchange::new();
        let order = NewOrder::new("BTCUSDT", OrderSide::Buy, OrderType::Market, 0.5);

        let result = exchange.create_order(&order).await.unwrap();
        assert_eq!(result.status, "FILLED");
        assert_eq!(result.executed_qty, 0.5);
        assert_eq!(exchange.create_order_calls(), 1);
        assert_eq!(exchange.recorded_orders().len(), 1);
    }

    #[tokio::test]
    async fn scripted_failure_counts_as_a_call() {
        let exchange = MockExchange::new().fail_create_order_at(0, -2019, "Margin is insufficient.");
        let order = NewOrder::new("BTCUSDT", OrderSide::Buy, OrderType::Market, 0.5);

        let err = exchange.create_order(&order).await.unwrap_err();
        assert!(matches!(err, BotError::Exchange { code: -2019, .. }));
        assert_eq!(exchange.create_order_calls(), 1);
        assert!(exchange.recorded_orders().is_empty());
    }
}
