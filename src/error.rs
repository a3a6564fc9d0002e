use thiserror::Error;

use crate::models::order::OrderResult;
use crate::models::report::TwapReport;

/// Error taxonomy for the whole crate.
///
/// `InvalidParameter` is always local and raised before any network call.
/// `Exchange` carries the venue's numeric error code and message and is
/// never retried automatically. The two partial variants exist so that a
/// composite operation can report exactly which steps completed; the
/// exchange-side state they describe must be reconciled manually.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("exchange error {code}: {message}")]
    Exchange { code: i64, message: String },

    #[error("cannot reach exchange: {0}")]
    Connectivity(String),

    #[error(
        "OCO partially placed on {symbol}: take-profit order {} is resting, stop-loss leg failed: {reason}",
        .take_profit_order.order_id
    )]
    OcoPartial {
        symbol: String,
        take_profit_order: Box<OrderResult>,
        reason: Box<BotError>,
    },

    #[error(
        "TWAP aborted on {} after {} of {} slices",
        .report.symbol,
        .report.executed_slices,
        .report.requested_slices
    )]
    TwapPartial { report: Box<TwapReport> },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
