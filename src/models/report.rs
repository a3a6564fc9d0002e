use serde::{Deserialize, Serialize};

use crate::models::order::{OrderResult, OrderSide};

/// Result of an OCO placement where both legs were accepted.
///
/// The legs are two independent exchange orders. No exchange-side linkage
/// exists: if one leg fills, the other is NOT cancelled automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcoReport {
    pub symbol: String,
    /// Side of both legs, i.e. the opposite of the initiating side.
    pub close_side: OrderSide,
    pub quantity: f64,
    pub take_profit_order: OrderResult,
    pub stop_loss_order: OrderResult,
}

/// Terminal state of one TWAP run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TwapOutcome {
    Completed,
    /// Cancelled through the cancel handle before all slices were sent.
    Cancelled { after_slice: usize },
    /// A slice was rejected; the remaining schedule was abandoned.
    Failed { slice_index: usize, error: String },
}

/// Ordered record of a TWAP run: one `OrderResult` per dispatched slice
/// plus the counts needed to reconcile a partial run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwapReport {
    pub symbol: String,
    pub side: OrderSide,
    pub total_quantity: f64,
    pub slice_quantity: f64,
    pub interval_ms: u64,
    pub requested_slices: usize,
    pub executed_slices: usize,
    pub orders: Vec<OrderResult>,
    pub outcome: TwapOutcome,
}
