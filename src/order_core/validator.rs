//! Order parameter validation.
//!
//! Pure functions, no I/O. Every order-placing operation runs these before
//! any network call, in the order symbol, side, quantity, price, stop
//! price; the first failing check determines the reported error.

use crate::error::BotError;
use crate::models::order::OrderSide;

/// Uppercase the symbol and require the configured quote-asset suffix.
pub fn validate_symbol(symbol: &str, quote_asset: &str) -> Result<String, BotError> {
    if symbol.trim().is_empty() {
        return Err(BotError::InvalidParameter("symbol cannot be empty".to_string()));
    }

    let symbol = symbol.trim().to_uppercase();

    if !symbol.ends_with(&quote_asset.to_uppercase()) {
        return Err(BotError::InvalidParameter(format!(
            "symbol must end with '{}', got: {}",
            quote_asset, symbol
        )));
    }

    Ok(symbol)
}

/// Accept BUY or SELL, case-insensitively.
pub fn validate_side(side: &str) -> Result<OrderSide, BotError> {
    match side.trim().to_uppercase().as_str() {
        "BUY" => Ok(OrderSide::Buy),
        "SELL" => Ok(OrderSide::Sell),
        other => Err(BotError::InvalidParameter(format!(
            "side must be 'BUY' or 'SELL', got: {}",
            other
        ))),
    }
}

/// Require a finite, strictly positive quantity.
pub fn validate_quantity(quantity: f64) -> Result<f64, BotError> {
    if !quantity.is_finite() {
        return Err(BotError::InvalidParameter(format!(
            "quantity must be a number, got: {}",
            quantity
        )));
    }
    if quantity <= 0.0 {
        return Err(BotError::InvalidParameter(format!(
            "quantity must be positive, got: {}",
            quantity
        )));
    }
    Ok(quantity)
}

/// Require a finite, strictly positive price.
pub fn validate_price(price: f64) -> Result<f64, BotError> {
    if !price.is_finite() {
        return Err(BotError::InvalidParameter(format!(
            "price must be a number, got: {}",
            price
        )));
    }
    if price <= 0.0 {
        return Err(BotError::InvalidParameter(format!(
            "price must be positive, got: {}",
            price
        )));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn symbol_is_uppercased() {
        assert_eq!(validate_symbol("btcusdt", "USDT").unwrap(), "BTCUSDT");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("BTCBUSD")]
    #[case("BTC")]
    fn bad_symbols_are_rejected(#[case] symbol: &str) {
        assert!(matches!(
            validate_symbol(symbol, "USDT"),
            Err(BotError::InvalidParameter(_))
        ));
    }

    #[rstest]
    #[case("buy", OrderSide::Buy)]
    #[case("BUY", OrderSide::Buy)]
    #[case("Sell", OrderSide::Sell)]
    #[case(" sell ", OrderSide::Sell)]
    fn sides_are_canonicalized(#[case] input: &str, #[case] expected: OrderSide) {
        assert_eq!(validate_side(input).unwrap(), expected);
    }

    #[test]
    fn hold_is_not_a_side() {
        assert!(matches!(validate_side("HOLD"), Err(BotError::InvalidParameter(_))));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.5)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn non_positive_quantities_are_rejected(#[case] quantity: f64) {
        assert!(matches!(
            validate_quantity(quantity),
            Err(BotError::InvalidParameter(_))
        ));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-50000.0)]
    #[case(f64::NAN)]
    fn non_positive_prices_are_rejected(#[case] price: f64) {
        assert!(matches!(validate_price(price), Err(BotError::InvalidParameter(_))));
    }

    #[test]
    fn positive_values_pass_through() {
        assert_eq!(validate_quantity(1.5).unwrap(), 1.5);
        assert_eq!(validate_price(2000.0).unwrap(), 2000.0);
    }
}
