use std::sync::Arc;
use warp::Filter;

use crate::api::handlers;
use crate::order_core::dispatcher::OrderDispatcher;

/// Build the API route tree around the shared dispatcher.
pub fn create_routes(
    dispatcher: Arc<OrderDispatcher>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let dispatcher_filter = warp::any().map(move || dispatcher.clone());

    let health = warp::path("health").and(warp::get()).and_then(handlers::health);

    let market = warp::path!("orders" / "market")
        .and(warp::post())
        .and(warp::body::json())
        .and(dispatcher_filter.clone())
        .and_then(handlers::market_order);

    let limit = warp::path!("orders" / "limit")
        .and(warp::post())
        .and(warp::body::json())
        .and(dispatcher_filter.clone())
        .and_then(handlers::limit_order);

    let stop_limit = warp::path!("orders" / "stop-limit")
        .and(warp::post())
        .and(warp::body::json())
        .and(dispatcher_filter.clone())
        .and_then(handlers::stop_limit_order);

    let oco = warp::path!("orders" / "oco")
        .and(warp::post())
        .and(warp::body::json())
        .and(dispatcher_filter.clone())
        .and_then(handlers::oco_order);

    let twap = warp::path!("twap")
        .and(warp::post())
        .and(warp::body::json())
        .and(dispatcher_filter.clone())
        .and_then(handlers::twap);

    let balance = warp::path!("balance")
        .and(warp::get())
        .and(dispatcher_filter.clone())
        .and_then(handlers::balance);

    let order_status = warp::path!("orders" / String / i64)
        .and(warp::get())
        .and(dispatcher_filter.clone())
        .and_then(handlers::order_status);

    let cancel = warp::path!("orders" / String / i64)
        .and(warp::delete())
        .and(dispatcher_filter)
        .and_then(handlers::cancel_order);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST", "DELETE"]);

    health
        .or(market)
        .or(limit)
        .or(stop_limit)
        .or(oco)
        .or(twap)
        .or(balance)
        .or(order_status)
        .or(cancel)
        .with(cors)
}
