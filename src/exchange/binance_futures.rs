use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::{Method, StatusCode};
use sha2::Sha256;
use std::time::Duration;

use crate::error::BotError;
use crate::exchange::traits::Exchange;
use crate::models::order::{AssetBalance, CancelReceipt, NewOrder, OrderResult, OrderSide};
use crate::utils::current_timestamp_ms;

type HmacSha256 = Hmac<Sha256>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Binance USDT-M Futures REST session.
///
/// Credentials and connection parameters only; no request-scoped state, so
/// one session is safely shared by concurrent requests. Signed endpoints
/// use an HMAC-SHA256 signature over the query string. The only timeout is
/// the HTTP client's own request timeout; there is no retry layer.
pub struct BinanceFuturesSession {
    base_url: String,
    api_key: String,
    api_secret: String,
    http: reqwest::Client,
}

impl BinanceFuturesSession {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self, BotError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BotError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(BinanceFuturesSession {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            http,
        })
    }

    fn sign(&self, query: &str) -> String {
        // HMAC-SHA256 accepts keys of any length, so this cannot fail.
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes()).unwrap();
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Send a signed request and return the parsed JSON body.
    async fn signed_request(
        &self,
        method: Method,
        path: &str,
        mut params: Vec<String>,
    ) -> Result<serde_json::Value, BotError> {
        params.push(format!("timestamp={}", current_timestamp_ms()));
        let query = params.join("&");
        let signature = self.sign(&query);
        let url = format!("{}{}?{}&signature={}", self.base_url, path, query, signature);

        let res = self
            .http
            .request(method, url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| BotError::Exchange {
                code: 0,
                message: format!("{} http error: {}", path, e),
            })?;

        let status = res.status();
        let body = res.json::<serde_json::Value>().await.map_err(|e| BotError::Exchange {
            code: 0,
            message: format!("{} returned unparseable body: {}", path, e),
        })?;

        if !status.is_success() {
            return Err(rejection_error(status, &body));
        }
        Ok(body)
    }

    fn order_params(order: &NewOrder) -> Vec<String> {
        let mut params = vec![
            format!("symbol={}", order.symbol),
            format!("side={}", order.side),
            format!("type={}", order.order_type),
            format!("quantity={}", order.quantity),
        ];
        if let Some(price) = order.price {
            params.push(format!("price={}", price));
        }
        if let Some(stop_price) = order.stop_price {
            params.push(format!("stopPrice={}", stop_price));
        }
        if let Some(tif) = &order.time_in_force {
            params.push(format!("timeInForce={}", tif));
        }
        if let Some(id) = &order.client_order_id {
            params.push(format!("newClientOrderId={}", id));
        }
        params
    }
}

/// Map a non-2xx exchange response to the typed error, pulling the venue's
/// `{code, msg}` body when present.
fn rejection_error(status: StatusCode, body: &serde_json::Value) -> BotError {
    let code = body.get("code").and_then(|v| v.as_i64()).unwrap_or(0);
    let message = body
        .get("msg")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status));
    BotError::Exchange { code, message }
}

fn f64_field(value: &serde_json::Value, key: &str) -> f64 {
    // Binance encodes decimals as strings.
    value
        .get(key)
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| value.get(key).and_then(|v| v.as_f64()))
        .unwrap_or(0.0)
}

/// Normalize a raw order record, keeping the untouched payload alongside.
fn parse_order(raw: serde_json::Value) -> OrderResult {
    let side = match raw.get("side").and_then(|v| v.as_str()) {
        Some("SELL") => OrderSide::Sell,
        _ => OrderSide::Buy,
    };
    OrderResult {
        order_id: raw.get("orderId").and_then(|v| v.as_i64()).unwrap_or(0),
        symbol: raw
            .get("symbol")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        side,
        status: raw
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        executed_qty: f64_field(&raw, "executedQty"),
        price: f64_field(&raw, "price"),
        raw,
    }
}

#[async_trait]
impl Exchange for BinanceFuturesSession {
    async fn create_order(&self, order: &NewOrder) -> Result<OrderResult, BotError> {
        let params = Self::order_params(order);
        let body = self.signed_request(Method::POST, "/fapi/v1/order", params).await?;
        Ok(parse_order(body))
    }

    async fn get_order(&self, symbol: &str, order_id: i64) -> Result<OrderResult, BotError> {
        let params = vec![format!("symbol={}", symbol), format!("orderId={}", order_id)];
        let body = self.signed_request(Method::GET, "/fapi/v1/order", params).await?;
        Ok(parse_order(body))
    }

    async fn cancel_order(&self, symbol: &str, order_id: i64) -> Result<CancelReceipt, BotError> {
        let params = vec![format!("symbol={}", symbol), format!("orderId={}", order_id)];
        let body = self.signed_request(Method::DELETE, "/fapi/v1/order", params).await?;
        Ok(CancelReceipt {
            order_id: body.get("orderId").and_then(|v| v.as_i64()).unwrap_or(order_id),
            symbol: symbol.to_string(),
            status: body
                .get("status")
                .and_then(|v| v.as_str())
                .unwrap_or("CANCELED")
                .to_string(),
            raw: body,
        })
    }

    async fn get_balances(&self) -> Result<Vec<AssetBalance>, BotError> {
        let body = self.signed_request(Method::GET, "/fapi/v2/balance", Vec::new()).await?;
        let rows = body.as_array().cloned().unwrap_or_default();
        Ok(rows
            .iter()
            .map(|row| AssetBalance {
                asset: row
                    .get("asset")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                balance: f64_field(row, "balance"),
                available_balance: f64_field(row, "availableBalance"),
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), BotError> {
        let url = format!("{}/fapi/v1/ping", self.base_url);
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| BotError::Connectivity(format!("ping failed: {}", e)))?;
        if !res.status().is_success() {
            return Err(BotError::Connectivity(format!("ping failed: HTTP {}", res.status())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderType;

    #[test]
    fn order_params_include_optional_fields() {
        let order = NewOrder::new("BTCUSDT", OrderSide::Sell, OrderType::StopLimit, 0.5)
            .with_price(60000.0)
            .with_stop_price(61000.0)
            .with_time_in_force("GTC");

        let params = BinanceFuturesSession::order_params(&order);
        assert!(params.contains(&"symbol=BTCUSDT".to_string()));
        assert!(params.contains(&"side=SELL".to_string()));
        assert!(params.contains(&"type=STOP".to_string()));
        assert!(params.contains(&"price=60000".to_string()));
        assert!(params.contains(&"stopPrice=61000".to_string()));
        assert!(params.contains(&"timeInForce=GTC".to_string()));
    }

    #[test]
    fn parse_order_reads_string_decimals() {
        let raw = serde_json::json!({
            "orderId": 4207,
            "symbol": "ETHUSDT",
            "side": "SELL",
            "status": "NEW",
            "executedQty": "0.000",
            "price": "2000.00"
        });
        let result = parse_order(raw);
        assert_eq!(result.order_id, 4207);
        assert_eq!(result.side, OrderSide::Sell);
        assert_eq!(result.executed_qty, 0.0);
        assert_eq!(result.price, 2000.0);
    }

    #[test]
    fn rejection_error_prefers_exchange_body() {
        let body = serde_json::json!({"code": -2019, "msg": "Margin is insufficient."});
        match rejection_error(StatusCode::BAD_REQUEST, &body) {
            BotError::Exchange { code, message } => {
                assert_eq!(code, -2019);
                assert_eq!(message, "Margin is insufficient.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
