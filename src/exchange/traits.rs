use async_trait::async_trait;

use crate::error::BotError;
use crate::models::order::{AssetBalance, CancelReceipt, NewOrder, OrderResult};

/// The `Exchange` trait is the narrow request/response contract with the
/// trading venue. Implemented by the real connector and the mock.
///
/// Methods take `&self`: one long-lived session is shared by every
/// concurrent request, so implementations must not keep request-scoped
/// mutable state. Each call is at-most-once; no implementation retries.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Submit a new order and return the venue's normalized response.
    async fn create_order(&self, order: &NewOrder) -> Result<OrderResult, BotError>;

    /// Fetch the current state of an order.
    async fn get_order(&self, symbol: &str, order_id: i64) -> Result<OrderResult, BotError>;

    /// Cancel a resting order.
    async fn cancel_order(&self, symbol: &str, order_id: i64) -> Result<CancelReceipt, BotError>;

    /// Fetch the futures account balances.
    async fn get_balances(&self) -> Result<Vec<AssetBalance>, BotError>;

    /// Connectivity check.
    async fn ping(&self) -> Result<(), BotError>;
}
