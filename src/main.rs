use std::net::SocketAddr;
use std::sync::Arc;

use ordex::api::routes;
use ordex::cli;
use ordex::config::Config;
use ordex::error::BotError;
use ordex::exchange::binance_futures::BinanceFuturesSession;
use ordex::exchange::mocks::MockExchange;
use ordex::exchange::traits::Exchange;
use ordex::order_core::dispatcher::OrderDispatcher;
use ordex::utils::logging;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::load()?;
    logging::init(&config.logging.level)?;
    log::info!("order front end starting (v{})", ordex::VERSION);

    // One session per process, shared by every request.
    let dispatcher = Arc::new(build_dispatcher(&config)?);

    // Connectivity check before accepting any work.
    dispatcher.ping().await?;
    log::info!("exchange reachable");

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "cli" {
        cli::run(dispatcher).await?;
    } else {
        serve(dispatcher, &config).await?;
    }

    Ok(())
}

fn build_dispatcher(config: &Config) -> Result<OrderDispatcher, BotError> {
    let exchange: Arc<dyn Exchange> = if config.exchange.use_mock {
        log::warn!("using mock exchange; no real orders will be placed");
        Arc::new(MockExchange::new())
    } else {
        let api_key = config
            .exchange
            .api_key
            .clone()
            .ok_or_else(|| BotError::Config("API_KEY is not set".to_string()))?;
        let api_secret = config
            .exchange
            .api_secret
            .clone()
            .ok_or_else(|| BotError::Config("API_SECRET is not set".to_string()))?;
        let base_url = config.exchange_base_url();
        if config.exchange.testnet {
            log::info!("using futures testnet: {}", base_url);
        } else {
            log::warn!("using PRODUCTION futures environment: {}", base_url);
        }
        Arc::new(BinanceFuturesSession::new(base_url, api_key, api_secret)?)
    };

    Ok(OrderDispatcher::new(exchange, config.exchange.quote_asset.clone()))
}

async fn serve(dispatcher: Arc<OrderDispatcher>, config: &Config) -> Result<(), anyhow::Error> {
    let routes = routes::create_routes(dispatcher);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| BotError::Config(format!("invalid server address: {}", e)))?;

    log::info!("serving API on http://{}/", addr);
    warp::serve(routes).run(addr).await;

    Ok(())
}
