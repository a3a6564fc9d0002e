pub mod oco;
pub mod twap;

pub use oco::OcoOrder;
pub use twap::{TwapCancelHandle, TwapExecution, TwapPlan};
