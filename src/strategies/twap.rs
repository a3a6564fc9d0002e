//! TWAP execution strategy.
//!
//! Splits one large order into equal market-order slices spread evenly
//! over a time window. One run occupies its calling context exclusively;
//! concurrent runs for the same symbol are not coordinated and may
//! interleave at the exchange.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{sleep, Duration};

use crate::error::BotError;
use crate::models::order::{OrderResult, OrderSide};
use crate::models::report::{TwapOutcome, TwapReport};
use crate::order_core::dispatcher::OrderDispatcher;
use crate::order_core::validator::{validate_quantity, validate_side, validate_symbol};

/// Slicing arithmetic for one TWAP run, computed up front.
#[derive(Debug, Clone)]
pub struct TwapPlan {
    pub total_quantity: f64,
    pub num_slices: usize,
    pub slice_quantity: f64,
    pub interval: Duration,
}

impl TwapPlan {
    /// Requires at least two slices; a single-slice run is just a market
    /// order and is rejected as an invalid parameter.
    pub fn new(total_quantity: f64, num_slices: usize, duration: Duration) -> Result<Self, BotError> {
        let total_quantity = validate_quantity(total_quantity)?;
        if num_slices < 2 {
            return Err(BotError::InvalidParameter(format!(
                "number of orders must be at least 2, got: {}",
                num_slices
            )));
        }
        // Duration division takes a u32; a count that does not fit would
        // truncate and divide by zero.
        let divisor = u32::try_from(num_slices).map_err(|_| {
            BotError::InvalidParameter(format!("number of orders is too large: {}", num_slices))
        })?;

        Ok(TwapPlan {
            total_quantity,
            num_slices,
            slice_quantity: total_quantity / num_slices as f64,
            interval: duration / divisor,
        })
    }
}

/// Cancellation hook for a running TWAP. Cloneable; cancelling stops the
/// schedule at the next suspension point or slice boundary.
/// Already-dispatched orders cannot be unwound.
#[derive(Clone)]
pub struct TwapCancelHandle {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl TwapCancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // notify_one stores a permit, so a cancel that lands while a slice
        // is still dispatching wakes the next inter-slice wait immediately.
        self.notify.notify_one();
    }
}

/// One TWAP run over the shared dispatcher.
///
/// State machine: Pending -> Executing(i) -> Waiting(i) -> Executing(i+1)
/// ... -> Completed, with Failed reachable from any Executing step. The
/// only suspension point is the inter-slice wait; dropping the future
/// (e.g. an aborted HTTP request) also stops scheduling further slices.
pub struct TwapExecution {
    dispatcher: Arc<OrderDispatcher>,
    symbol: String,
    side: String,
    plan: TwapPlan,
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl TwapExecution {
    pub fn new(
        dispatcher: Arc<OrderDispatcher>,
        symbol: impl Into<String>,
        side: impl Into<String>,
        plan: TwapPlan,
    ) -> Self {
        TwapExecution {
            dispatcher,
            symbol: symbol.into(),
            side: side.into(),
            plan,
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn plan(&self) -> &TwapPlan {
        &self.plan
    }

    pub fn cancel_handle(&self) -> TwapCancelHandle {
        TwapCancelHandle {
            cancelled: self.cancelled.clone(),
            notify: self.notify.clone(),
        }
    }

    /// Dispatch every slice in order, suspending for the plan interval
    /// between consecutive slices (not after the last).
    ///
    /// A slice failure aborts the remaining schedule with no catch-up and
    /// no retry: the error is `BotError::TwapPartial` whose report lists
    /// every completed slice in order and marks the failed index.
    /// Cancellation is not a failure; it returns the partial report with a
    /// `Cancelled` outcome.
    pub async fn run(&self) -> Result<TwapReport, BotError> {
        let symbol = validate_symbol(&self.symbol, self.dispatcher.quote_asset())?;
        let side = validate_side(&self.side)?;

        log::info!(
            "executing TWAP: {} {} {} in {} slices of {} every {:?}",
            side,
            self.plan.total_quantity,
            symbol,
            self.plan.num_slices,
            self.plan.slice_quantity,
            self.plan.interval
        );

        let mut orders = Vec::with_capacity(self.plan.num_slices);

        for i in 0..self.plan.num_slices {
            if self.cancelled.load(Ordering::SeqCst) {
                log::warn!("TWAP cancelled on {} after {} slices", symbol, i);
                return Ok(self.report(symbol, side, orders, TwapOutcome::Cancelled { after_slice: i }));
            }

            log::info!("TWAP slice {}/{} on {}", i + 1, self.plan.num_slices, symbol);
            match self
                .dispatcher
                .place_market_order(&symbol, side.as_str(), self.plan.slice_quantity)
                .await
            {
                Ok(order) => orders.push(order),
                Err(err) => {
                    log::error!(
                        "TWAP slice {}/{} failed on {}, abandoning remaining schedule: {}",
                        i + 1,
                        self.plan.num_slices,
                        symbol,
                        err
                    );
                    let outcome = TwapOutcome::Failed {
                        slice_index: i,
                        error: err.to_string(),
                    };
                    return Err(BotError::TwapPartial {
                        report: Box::new(self.report(symbol, side, orders, outcome)),
                    });
                }
            }

            if i < self.plan.num_slices - 1 {
                tokio::select! {
                    _ = sleep(self.plan.interval) => {}
                    _ = self.notify.notified() => {}
                }
            }
        }

        log::info!("TWAP completed on {}: {} slices", symbol, self.plan.num_slices);
        Ok(self.report(symbol, side, orders, TwapOutcome::Completed))
    }

    fn report(
        &self,
        symbol: String,
        side: OrderSide,
        orders: Vec<OrderResult>,
        outcome: TwapOutcome,
    ) -> TwapReport {
        TwapReport {
            symbol,
            side,
            total_quantity: self.plan.total_quantity,
            slice_quantity: self.plan.slice_quantity,
            interval_ms: self.plan.interval.as_millis() as u64,
            requested_slices: self.plan.num_slices,
            executed_slices: orders.len(),
            orders,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_splits_quantity_evenly() {
        let plan = TwapPlan::new(100.0, 10, Duration::from_secs(3600)).unwrap();
        assert_eq!(plan.slice_quantity, 10.0);
        assert_eq!(plan.interval, Duration::from_secs(360));
    }

    #[test]
    fn plan_interval_for_sixty_minute_window() {
        // 60 minutes over 10 orders: 6 minutes between dispatches.
        let plan = TwapPlan::new(5.0, 10, Duration::from_secs(60 * 60)).unwrap();
        assert_eq!(plan.interval, Duration::from_secs(6 * 60));
    }

    #[test]
    fn plan_rejects_single_slice() {
        let err = TwapPlan::new(100.0, 1, Duration::from_secs(60)).unwrap_err();
        assert!(matches!(err, BotError::InvalidParameter(_)));
    }

    #[test]
    fn plan_rejects_non_positive_quantity() {
        let err = TwapPlan::new(0.0, 10, Duration::from_secs(60)).unwrap_err();
        assert!(matches!(err, BotError::InvalidParameter(_)));
    }

    #[test]
    fn plan_rejects_slice_counts_beyond_u32() {
        let err =
            TwapPlan::new(100.0, u32::MAX as usize + 1, Duration::from_secs(60)).unwrap_err();
        assert!(matches!(err, BotError::InvalidParameter(_)));
    }
}
