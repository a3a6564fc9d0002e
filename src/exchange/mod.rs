pub mod binance_futures;
pub mod mocks;
pub mod traits;

pub use binance_futures::BinanceFuturesSession;
pub use mocks::MockExchange;
pub use traits::Exchange;
