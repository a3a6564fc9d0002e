//! Thin order front end for Binance USDT-M futures.
//!
//! Validates order parameters, forwards them over a shared authenticated
//! session, and layers two composite execution strategies (OCO, TWAP) on
//! top of the single-order dispatcher. An HTTP API and an interactive CLI
//! menu expose the same operations.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod exchange;
pub mod models;
pub mod order_core;
pub mod strategies;
pub mod utils;

// Core type re-exports
pub use crate::error::BotError;
pub use crate::exchange::traits::Exchange;
pub use crate::models::order::{AssetBalance, NewOrder, OrderResult, OrderSide, OrderType};
pub use crate::models::report::{OcoReport, TwapOutcome, TwapReport};
pub use crate::order_core::dispatcher::OrderDispatcher;
pub use crate::strategies::{OcoOrder, TwapExecution, TwapPlan};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias
pub type Result<T> = std::result::Result<T, BotError>;
