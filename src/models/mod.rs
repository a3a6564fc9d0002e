pub mod order;
pub mod report;

pub use order::{AssetBalance, CancelReceipt, NewOrder, OrderResult, OrderSide, OrderType};
pub use report::{OcoReport, TwapOutcome, TwapReport};
