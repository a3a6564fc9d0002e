//! Single-order dispatcher.
//!
//! Translates validated parameters into exactly one exchange call and
//! normalizes the result. Every operation logs the constructed request and
//! the raw exchange response; the log is the audit trail for manual
//! reconciliation and must not be removed.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::BotError;
use crate::exchange::traits::Exchange;
use crate::models::order::{
    AssetBalance, CancelReceipt, NewOrder, OrderResult, OrderType,
};
use crate::order_core::validator::{
    validate_price, validate_quantity, validate_side, validate_symbol,
};

/// Dispatches single orders over the shared exchange session.
///
/// Holds no request-scoped state; clone the `Arc` freely across handlers.
/// Calls are at-most-once: a failure is reported, never retried.
pub struct OrderDispatcher {
    exchange: Arc<dyn Exchange>,
    quote_asset: String,
}

impl OrderDispatcher {
    pub fn new(exchange: Arc<dyn Exchange>, quote_asset: impl Into<String>) -> Self {
        OrderDispatcher {
            exchange,
            quote_asset: quote_asset.into(),
        }
    }

    pub fn quote_asset(&self) -> &str {
        &self.quote_asset
    }

    /// Place a market order. Irreversible once the exchange accepts it.
    pub async fn place_market_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: f64,
    ) -> Result<OrderResult, BotError> {
        let symbol = validate_symbol(symbol, &self.quote_asset)?;
        let side = validate_side(side)?;
        let quantity = validate_quantity(quantity)?;

        let order = NewOrder::new(symbol, side, OrderType::Market, quantity)
            .with_client_order_id(Uuid::new_v4().to_string());
        self.submit(order).await
    }

    /// Place a resting limit order, GTC unless overridden.
    pub async fn place_limit_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: f64,
        price: f64,
        time_in_force: Option<&str>,
    ) -> Result<OrderResult, BotError> {
        let symbol = validate_symbol(symbol, &self.quote_asset)?;
        let side = validate_side(side)?;
        let quantity = validate_quantity(quantity)?;
        let price = validate_price(price)?;

        let order = NewOrder::new(symbol, side, OrderType::Limit, quantity)
            .with_price(price)
            .with_time_in_force(time_in_force.unwrap_or("GTC"))
            .with_client_order_id(Uuid::new_v4().to_string());
        self.submit(order).await
    }

    /// Place a stop-triggered limit order.
    pub async fn place_stop_limit_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: f64,
        price: f64,
        stop_price: f64,
    ) -> Result<OrderResult, BotError> {
        let symbol = validate_symbol(symbol, &self.quote_asset)?;
        let side = validate_side(side)?;
        let quantity = validate_quantity(quantity)?;
        let price = validate_price(price)?;
        let stop_price = validate_price(stop_price)?;

        let order = NewOrder::new(symbol, side, OrderType::StopLimit, quantity)
            .with_price(price)
            .with_stop_price(stop_price)
            .with_time_in_force("GTC")
            .with_client_order_id(Uuid::new_v4().to_string());
        self.submit(order).await
    }

    async fn submit(&self, order: NewOrder) -> Result<OrderResult, BotError> {
        log::info!(
            "placing {} order: {} {} {} price={:?} stop_price={:?} timeInForce={:?}",
            order.order_type,
            order.side,
            order.quantity,
            order.symbol,
            order.price,
            order.stop_price,
            order.time_in_force,
        );

        match self.exchange.create_order(&order).await {
            Ok(result) => {
                log::info!("exchange response: {}", result.raw);
                log::info!(
                    "order placed: id={} status={} executedQty={}",
                    result.order_id,
                    result.status,
                    result.executed_qty
                );
                Ok(result)
            }
            Err(err) => {
                if let BotError::Exchange { code, message } = &err {
                    log::error!(
                        "exchange rejected {} {} {} {}: code={} msg={}",
                        order.order_type,
                        order.side,
                        order.quantity,
                        order.symbol,
                        code,
                        message
                    );
                } else {
                    log::error!("order submission failed for {}: {}", order.symbol, err);
                }
                Err(err)
            }
        }
    }

    /// Fetch the futures account balances.
    pub async fn get_balances(&self) -> Result<Vec<AssetBalance>, BotError> {
        log::info!("fetching account balances");
        let balances = self.exchange.get_balances().await?;
        log::info!("fetched {} balance rows", balances.len());
        Ok(balances)
    }

    /// Look up the current state of an order.
    pub async fn get_order_status(
        &self,
        symbol: &str,
        order_id: i64,
    ) -> Result<OrderResult, BotError> {
        let symbol = validate_symbol(symbol, &self.quote_asset)?;
        log::info!("fetching order status: {} id={}", symbol, order_id);
        let result = self.exchange.get_order(&symbol, order_id).await?;
        log::info!("order {} status={}", result.order_id, result.status);
        Ok(result)
    }

    /// Cancel a resting order.
    pub async fn cancel_order(
        &self,
        symbol: &str,
        order_id: i64,
    ) -> Result<CancelReceipt, BotError> {
        let symbol = validate_symbol(symbol, &self.quote_asset)?;
        log::info!("cancelling order: {} id={}", symbol, order_id);
        let receipt = self.exchange.cancel_order(&symbol, order_id).await?;
        log::info!("order {} cancelled: {}", receipt.order_id, receipt.raw);
        Ok(receipt)
    }

    /// Connectivity check against the venue.
    pub async fn ping(&self) -> Result<(), BotError> {
        self.exchange.ping().await
    }
}
