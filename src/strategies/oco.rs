//! OCO composite order.
//!
//! Places a take-profit limit order and a stop-loss stop-limit order as
//! two independent exchange orders on the side opposite the initiating
//! position. No exchange-native OCO linkage is created: if one leg fills,
//! the other is NOT cancelled automatically. This is a known limitation
//! carried over deliberately; the partial-failure reporting below is what
//! lets an operator reconcile the resulting state by hand.

use std::sync::Arc;

use crate::error::BotError;
use crate::models::report::OcoReport;
use crate::order_core::dispatcher::OrderDispatcher;
use crate::order_core::validator::{
    validate_price, validate_quantity, validate_side, validate_symbol,
};

/// One OCO placement: a take-profit leg and a protective stop-loss leg.
pub struct OcoOrder {
    dispatcher: Arc<OrderDispatcher>,
    symbol: String,
    side: String,
    quantity: f64,
    take_profit_price: f64,
    stop_loss_price: f64,
    stop_limit_price: Option<f64>,
}

impl OcoOrder {
    /// `side` is the side of the position being protected; both legs are
    /// placed on the opposite side. `stop_limit_price` is the limit price
    /// of the stop leg and defaults to `stop_loss_price`.
    pub fn new(
        dispatcher: Arc<OrderDispatcher>,
        symbol: impl Into<String>,
        side: impl Into<String>,
        quantity: f64,
        take_profit_price: f64,
        stop_loss_price: f64,
        stop_limit_price: Option<f64>,
    ) -> Self {
        OcoOrder {
            dispatcher,
            symbol: symbol.into(),
            side: side.into(),
            quantity,
            take_profit_price,
            stop_loss_price,
            stop_limit_price,
        }
    }

    /// Place both legs in sequence.
    ///
    /// If the take-profit leg fails nothing is resting and the error is
    /// returned as-is. If the take-profit leg succeeds and the stop-loss
    /// leg fails, the result is `BotError::OcoPartial` carrying the resting
    /// take-profit order so the caller can cancel it or retry the missing
    /// protective leg. No automatic compensation is performed.
    pub async fn place(&self) -> Result<OcoReport, BotError> {
        let symbol = validate_symbol(&self.symbol, self.dispatcher.quote_asset())?;
        let side = validate_side(&self.side)?;
        let quantity = validate_quantity(self.quantity)?;
        let take_profit_price = validate_price(self.take_profit_price)?;
        let stop_loss_price = validate_price(self.stop_loss_price)?;
        let stop_limit_price = match self.stop_limit_price {
            Some(price) => validate_price(price)?,
            None => stop_loss_price,
        };

        let close_side = side.opposite();
        log::info!(
            "placing OCO on {}: {} {} TP={} SL={} (trigger {})",
            symbol,
            close_side,
            quantity,
            take_profit_price,
            stop_limit_price,
            stop_loss_price
        );

        let take_profit_order = self
            .dispatcher
            .place_limit_order(&symbol, close_side.as_str(), quantity, take_profit_price, None)
            .await?;

        let stop_loss_order = match self
            .dispatcher
            .place_stop_limit_order(
                &symbol,
                close_side.as_str(),
                quantity,
                stop_limit_price,
                stop_loss_price,
            )
            .await
        {
            Ok(order) => order,
            Err(reason) => {
                log::error!(
                    "OCO stop-loss leg failed on {}; take-profit order {} is still resting: {}",
                    symbol,
                    take_profit_order.order_id,
                    reason
                );
                return Err(BotError::OcoPartial {
                    symbol,
                    take_profit_order: Box::new(take_profit_order),
                    reason: Box::new(reason),
                });
            }
        };

        log::info!(
            "OCO placed on {}: take-profit id={} stop-loss id={}",
            symbol,
            take_profit_order.order_id,
            stop_loss_order.order_id
        );

        Ok(OcoReport {
            symbol,
            close_side,
            quantity,
            take_profit_order,
            stop_loss_order,
        })
    }
}
