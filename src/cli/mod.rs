//! Interactive command-line menu.
//!
//! A thin shell over the dispatcher and strategies: it parses input,
//! confirms, and prints results. All parameter validation lives in
//! `order_core::validator`, reached through the operations themselves.

use std::io::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::Duration;

use crate::error::BotError;
use crate::order_core::dispatcher::OrderDispatcher;
use crate::strategies::oco::OcoOrder;
use crate::strategies::twap::{TwapExecution, TwapPlan};

type Input = Lines<BufReader<Stdin>>;

fn print_menu() {
    println!();
    println!("{}", "-".repeat(60));
    println!("SELECT ORDER TYPE:");
    println!("{}", "-".repeat(60));
    println!("  [1] Market order");
    println!("  [2] Limit order");
    println!("  [3] Stop-limit order");
    println!("  [4] OCO order (one-cancels-the-other)");
    println!("  [5] TWAP strategy");
    println!("  [6] Account balance");
    println!("  [7] Order status");
    println!("  [0] Exit");
    println!("{}", "-".repeat(60));
}

async fn read_line(input: &mut Input, prompt: &str) -> Result<String, BotError> {
    print!("{}: ", prompt);
    std::io::stdout().flush()?;
    Ok(input.next_line().await?.unwrap_or_default().trim().to_string())
}

async fn read_f64(input: &mut Input, prompt: &str) -> Result<f64, BotError> {
    loop {
        let line = read_line(input, prompt).await?;
        match line.parse::<f64>() {
            Ok(v) => return Ok(v),
            Err(_) => println!("Invalid number, try again."),
        }
    }
}

async fn read_u64(input: &mut Input, prompt: &str, default: Option<u64>) -> Result<u64, BotError> {
    loop {
        let line = read_line(input, prompt).await?;
        if line.is_empty() {
            if let Some(d) = default {
                return Ok(d);
            }
        }
        match line.parse::<u64>() {
            Ok(v) => return Ok(v),
            Err(_) => println!("Invalid number, try again."),
        }
    }
}

async fn confirm(input: &mut Input, summary: &str) -> Result<bool, BotError> {
    let answer = read_line(input, &format!("\nConfirm {}? (yes/no)", summary)).await?;
    Ok(answer.eq_ignore_ascii_case("yes"))
}

/// Run the menu loop until the user exits or stdin closes.
pub async fn run(dispatcher: Arc<OrderDispatcher>) -> Result<(), BotError> {
    println!("{}", "=".repeat(60));
    println!("           FUTURES ORDER FRONT END");
    println!("{}", "=".repeat(60));

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_menu();
        let choice = read_line(&mut input, "\nEnter your choice (0-7)").await?;

        match choice.as_str() {
            "1" => market_order(&mut input, &dispatcher).await?,
            "2" => limit_order(&mut input, &dispatcher).await?,
            "3" => stop_limit_order(&mut input, &dispatcher).await?,
            "4" => oco_order(&mut input, &dispatcher).await?,
            "5" => twap(&mut input, &dispatcher).await?,
            "6" => balance(&dispatcher).await,
            "7" => order_status(&mut input, &dispatcher).await?,
            "0" | "" => {
                println!("\nGoodbye!");
                return Ok(());
            }
            _ => println!("\nInvalid choice, select 0-7."),
        }
    }
}

async fn market_order(input: &mut Input, dispatcher: &OrderDispatcher) -> Result<(), BotError> {
    let symbol = read_line(input, "Symbol (e.g. BTCUSDT)").await?;
    let side = read_line(input, "Side (BUY/SELL)").await?;
    let quantity = read_f64(input, "Quantity").await?;

    if !confirm(input, &format!("MARKET {} {} {}", side, quantity, symbol)).await? {
        println!("\nOrder cancelled by user");
        return Ok(());
    }

    match dispatcher.place_market_order(&symbol, &side, quantity).await {
        Ok(order) => {
            println!("\nORDER PLACED");
            println!("Order ID: {}", order.order_id);
            println!("Status: {}", order.status);
            println!("Executed qty: {}", order.executed_qty);
        }
        Err(e) => println!("\nOrder failed: {}", e),
    }
    Ok(())
}

async fn limit_order(input: &mut Input, dispatcher: &OrderDispatcher) -> Result<(), BotError> {
    let symbol = read_line(input, "Symbol (e.g. BTCUSDT)").await?;
    let side = read_line(input, "Side (BUY/SELL)").await?;
    let quantity = read_f64(input, "Quantity").await?;
    let price = read_f64(input, "Limit price").await?;

    if !confirm(input, &format!("LIMIT {} {} {} @ {}", side, quantity, symbol, price)).await? {
        println!("\nOrder cancelled by user");
        return Ok(());
    }

    match dispatcher.place_limit_order(&symbol, &side, quantity, price, None).await {
        Ok(order) => {
            println!("\nORDER PLACED");
            println!("Order ID: {}", order.order_id);
            println!("Status: {}", order.status);
            println!("Price: {}", order.price);
        }
        Err(e) => println!("\nOrder failed: {}", e),
    }
    Ok(())
}

async fn stop_limit_order(input: &mut Input, dispatcher: &OrderDispatcher) -> Result<(), BotError> {
    let symbol = read_line(input, "Symbol (e.g. BTCUSDT)").await?;
    let side = read_line(input, "Side (BUY/SELL)").await?;
    let quantity = read_f64(input, "Quantity").await?;
    let price = read_f64(input, "Limit price").await?;
    let stop_price = read_f64(input, "Stop price (trigger)").await?;

    let summary = format!(
        "STOP-LIMIT {} {} {} @ {} (stop: {})",
        side, quantity, symbol, price, stop_price
    );
    if !confirm(input, &summary).await? {
        println!("\nOrder cancelled by user");
        return Ok(());
    }

    match dispatcher
        .place_stop_limit_order(&symbol, &side, quantity, price, stop_price)
        .await
    {
        Ok(order) => {
            println!("\nORDER PLACED");
            println!("Order ID: {}", order.order_id);
            println!("Status: {}", order.status);
        }
        Err(e) => println!("\nOrder failed: {}", e),
    }
    Ok(())
}

async fn oco_order(input: &mut Input, dispatcher: &Arc<OrderDispatcher>) -> Result<(), BotError> {
    let symbol = read_line(input, "Symbol (e.g. BTCUSDT)").await?;
    let side = read_line(input, "Side of the position to protect (BUY/SELL)").await?;
    let quantity = read_f64(input, "Quantity").await?;
    let tp_price = read_f64(input, "Take-profit price").await?;
    let sl_price = read_f64(input, "Stop-loss price").await?;

    let summary = format!("OCO {} {} (TP: {}, SL: {})", quantity, symbol, tp_price, sl_price);
    if !confirm(input, &summary).await? {
        println!("\nOrder cancelled by user");
        return Ok(());
    }

    let oco = OcoOrder::new(dispatcher.clone(), symbol, side, quantity, tp_price, sl_price, None);
    match oco.place().await {
        Ok(report) => {
            println!("\nOCO ORDERS PLACED");
            println!("Take-profit order ID: {}", report.take_profit_order.order_id);
            println!("Stop-loss order ID: {}", report.stop_loss_order.order_id);
        }
        Err(BotError::OcoPartial {
            take_profit_order,
            reason,
            ..
        }) => {
            println!("\nOCO PARTIALLY PLACED");
            println!(
                "Take-profit order {} is resting WITHOUT a protective stop-loss.",
                take_profit_order.order_id
            );
            println!("Stop-loss leg failed: {}", reason);
            println!("Cancel the resting order or retry the stop-loss manually.");
        }
        Err(e) => println!("\nOCO order failed: {}", e),
    }
    Ok(())
}

async fn twap(input: &mut Input, dispatcher: &Arc<OrderDispatcher>) -> Result<(), BotError> {
    let symbol = read_line(input, "Symbol (e.g. BTCUSDT)").await?;
    let side = read_line(input, "Side (BUY/SELL)").await?;
    let total_quantity = read_f64(input, "Total quantity").await?;
    let duration_minutes = read_u64(input, "Duration in minutes", None).await?;
    let num_orders = read_u64(input, "Number of orders (default: 10)", Some(10)).await? as usize;

    let summary = format!(
        "TWAP {} {} {} over {}min ({} orders)",
        side, total_quantity, symbol, duration_minutes, num_orders
    );
    if !confirm(input, &summary).await? {
        println!("\nStrategy cancelled by user");
        return Ok(());
    }

    let plan = match TwapPlan::new(
        total_quantity,
        num_orders,
        Duration::from_secs(duration_minutes.saturating_mul(60)),
    ) {
        Ok(plan) => plan,
        Err(e) => {
            println!("\nTWAP rejected: {}", e);
            return Ok(());
        }
    };

    println!("\nExecuting TWAP strategy...");
    let execution = TwapExecution::new(dispatcher.clone(), symbol, side, plan);
    match execution.run().await {
        Ok(report) => {
            println!("\nTWAP COMPLETED");
            println!("Requested slices: {}", report.requested_slices);
            println!("Executed slices: {}", report.executed_slices);
        }
        Err(BotError::TwapPartial { report }) => {
            println!("\nTWAP ABORTED");
            println!(
                "Executed {} of {} slices before the failure.",
                report.executed_slices, report.requested_slices
            );
            for order in &report.orders {
                println!("  slice order ID {} status {}", order.order_id, order.status);
            }
        }
        Err(e) => println!("\nTWAP failed: {}", e),
    }
    Ok(())
}

async fn balance(dispatcher: &OrderDispatcher) {
    match dispatcher.get_balances().await {
        Ok(balances) => {
            println!("\n{:<10} {:>18} {:>18}", "Asset", "Available", "Balance");
            println!("{}", "-".repeat(48));
            for b in balances.iter().filter(|b| b.balance > 0.0) {
                println!("{:<10} {:>18} {:>18}", b.asset, b.available_balance, b.balance);
            }
        }
        Err(e) => println!("\nFailed to get balance: {}", e),
    }
}

async fn order_status(input: &mut Input, dispatcher: &OrderDispatcher) -> Result<(), BotError> {
    let symbol = read_line(input, "Symbol (e.g. BTCUSDT)").await?;
    let order_id = read_u64(input, "Order ID", None).await? as i64;

    match dispatcher.get_order_status(&symbol, order_id).await {
        Ok(order) => {
            println!("\nOrder ID: {}", order.order_id);
            println!("Symbol: {}", order.symbol);
            println!("Side: {}", order.side);
            println!("Status: {}", order.status);
            println!("Executed: {}", order.executed_qty);
            println!("Price: {}", order.price);
        }
        Err(e) => println!("\nFailed to get order status: {}", e),
    }
    Ok(())
}
