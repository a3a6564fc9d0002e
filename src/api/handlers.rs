//! HTTP handlers.
//!
//! Thin shells: parameters pass straight through to the dispatcher and
//! strategies, which own all validation. The only job here is translating
//! results and typed failures into status codes and JSON bodies.

use serde::Deserialize;
use std::sync::Arc;
use tokio::time::Duration;
use warp::http::StatusCode;
use warp::reply::{json, with_status, Reply};

use crate::error::BotError;
use crate::order_core::dispatcher::OrderDispatcher;
use crate::strategies::oco::OcoOrder;
use crate::strategies::twap::{TwapExecution, TwapPlan};

/// Map a typed failure onto a status code and body. Partial failures keep
/// their payload: the caller needs the resting leg / completed slices to
/// reconcile exchange-side state.
fn error_reply(err: &BotError) -> (StatusCode, serde_json::Value) {
    match err {
        BotError::InvalidParameter(_) => {
            (StatusCode::BAD_REQUEST, serde_json::json!({"error": err.to_string()}))
        }
        BotError::Exchange { code, .. } => (
            StatusCode::BAD_GATEWAY,
            serde_json::json!({"error": err.to_string(), "exchange_code": code}),
        ),
        BotError::Connectivity(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({"error": err.to_string()}),
        ),
        BotError::OcoPartial { take_profit_order, .. } => (
            StatusCode::BAD_GATEWAY,
            serde_json::json!({
                "error": err.to_string(),
                "take_profit_order": take_profit_order,
            }),
        ),
        BotError::TwapPartial { report } => (
            StatusCode::BAD_GATEWAY,
            serde_json::json!({
                "error": err.to_string(),
                "report": report,
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({"error": err.to_string()}),
        ),
    }
}

pub async fn health() -> Result<impl Reply, warp::Rejection> {
    Ok(json(&serde_json::json!({"status": "ok"})))
}

#[derive(Debug, Deserialize)]
pub struct MarketOrderRequest {
    pub symbol: String,
    pub side: String,
    pub quantity: f64,
}

pub async fn market_order(
    req: MarketOrderRequest,
    dispatcher: Arc<OrderDispatcher>,
) -> Result<impl Reply, warp::Rejection> {
    match dispatcher.place_market_order(&req.symbol, &req.side, req.quantity).await {
        Ok(order) => Ok(with_status(
            json(&serde_json::json!({"status": "success", "order": order})),
            StatusCode::CREATED,
        )),
        Err(e) => {
            let (status, body) = error_reply(&e);
            Ok(with_status(json(&body), status))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LimitOrderRequest {
    pub symbol: String,
    pub side: String,
    pub quantity: f64,
    pub price: f64,
    pub time_in_force: Option<String>,
}

pub async fn limit_order(
    req: LimitOrderRequest,
    dispatcher: Arc<OrderDispatcher>,
) -> Result<impl Reply, warp::Rejection> {
    match dispatcher
        .place_limit_order(
            &req.symbol,
            &req.side,
            req.quantity,
            req.price,
            req.time_in_force.as_deref(),
        )
        .await
    {
        Ok(order) => Ok(with_status(
            json(&serde_json::json!({"status": "success", "order": order})),
            StatusCode::CREATED,
        )),
        Err(e) => {
            let (status, body) = error_reply(&e);
            Ok(with_status(json(&body), status))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StopLimitOrderRequest {
    pub symbol: String,
    pub side: String,
    pub quantity: f64,
    pub price: f64,
    pub stop_price: f64,
}

pub async fn stop_limit_order(
    req: StopLimitOrderRequest,
    dispatcher: Arc<OrderDispatcher>,
) -> Result<impl Reply, warp::Rejection> {
    match dispatcher
        .place_stop_limit_order(&req.symbol, &req.side, req.quantity, req.price, req.stop_price)
        .await
    {
        Ok(order) => Ok(with_status(
            json(&serde_json::json!({"status": "success", "order": order})),
            StatusCode::CREATED,
        )),
        Err(e) => {
            let (status, body) = error_reply(&e);
            Ok(with_status(json(&body), status))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OcoOrderRequest {
    pub symbol: String,
    pub side: String,
    pub quantity: f64,
    pub take_profit_price: f64,
    pub stop_loss_price: f64,
    pub stop_limit_price: Option<f64>,
}

pub async fn oco_order(
    req: OcoOrderRequest,
    dispatcher: Arc<OrderDispatcher>,
) -> Result<impl Reply, warp::Rejection> {
    let oco = OcoOrder::new(
        dispatcher,
        req.symbol,
        req.side,
        req.quantity,
        req.take_profit_price,
        req.stop_loss_price,
        req.stop_limit_price,
    );

    match oco.place().await {
        Ok(report) => Ok(with_status(
            json(&serde_json::json!({"status": "success", "oco": report})),
            StatusCode::CREATED,
        )),
        Err(e) => {
            let (status, body) = error_reply(&e);
            Ok(with_status(json(&body), status))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TwapRequest {
    pub symbol: String,
    pub side: String,
    pub total_quantity: f64,
    pub duration_minutes: u64,
    pub num_orders: Option<usize>,
}

/// Runs the whole TWAP schedule within this request. Aborting the request
/// drops the future at its suspension point and stops scheduling further
/// slices; already-dispatched orders stand.
pub async fn twap(
    req: TwapRequest,
    dispatcher: Arc<OrderDispatcher>,
) -> Result<impl Reply, warp::Rejection> {
    let num_orders = req.num_orders.unwrap_or(10);
    let plan = match TwapPlan::new(
        req.total_quantity,
        num_orders,
        Duration::from_secs(req.duration_minutes.saturating_mul(60)),
    ) {
        Ok(plan) => plan,
        Err(e) => {
            let (status, body) = error_reply(&e);
            return Ok(with_status(json(&body), status));
        }
    };

    let execution = TwapExecution::new(dispatcher, req.symbol, req.side, plan);
    match execution.run().await {
        Ok(report) => Ok(with_status(
            json(&serde_json::json!({"status": "success", "report": report})),
            StatusCode::OK,
        )),
        Err(e) => {
            let (status, body) = error_reply(&e);
            Ok(with_status(json(&body), status))
        }
    }
}

pub async fn balance(dispatcher: Arc<OrderDispatcher>) -> Result<impl Reply, warp::Rejection> {
    match dispatcher.get_balances().await {
        Ok(balances) => Ok(with_status(
            json(&serde_json::json!({"status": "success", "balances": balances})),
            StatusCode::OK,
        )),
        Err(e) => {
            let (status, body) = error_reply(&e);
            Ok(with_status(json(&body), status))
        }
    }
}

pub async fn order_status(
    symbol: String,
    order_id: i64,
    dispatcher: Arc<OrderDispatcher>,
) -> Result<impl Reply, warp::Rejection> {
    match dispatcher.get_order_status(&symbol, order_id).await {
        Ok(order) => Ok(with_status(
            json(&serde_json::json!({"status": "success", "order": order})),
            StatusCode::OK,
        )),
        Err(e) => {
            let (status, body) = error_reply(&e);
            Ok(with_status(json(&body), status))
        }
    }
}

pub async fn cancel_order(
    symbol: String,
    order_id: i64,
    dispatcher: Arc<OrderDispatcher>,
) -> Result<impl Reply, warp::Rejection> {
    match dispatcher.cancel_order(&symbol, order_id).await {
        Ok(receipt) => Ok(with_status(
            json(&serde_json::json!({"status": "success", "cancelled": receipt})),
            StatusCode::OK,
        )),
        Err(e) => {
            let (status, body) = error_reply(&e);
            Ok(with_status(json(&body), status))
        }
    }
}
