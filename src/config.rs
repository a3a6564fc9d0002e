use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::BotError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub exchange: ExchangeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Defaults to the futures testnet when unset and `testnet` is true.
    pub base_url: Option<String>,
    /// Quote asset every traded symbol must end with.
    pub quote_asset: String,
    pub testnet: bool,
    pub use_mock: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Load configuration from `config.json` when present, falling back to
    /// defaults, then apply environment overrides.
    pub fn load() -> Result<Self, BotError> {
        let config_path = Path::new("config.json");

        let mut cfg = if config_path.exists() {
            let mut file = File::open(config_path)
                .map_err(|e| BotError::Config(format!("failed to open config file: {}", e)))?;

            let mut contents = String::new();
            file.read_to_string(&mut contents)
                .map_err(|e| BotError::Config(format!("failed to read config file: {}", e)))?;

            serde_json::from_str::<Config>(&contents)
                .map_err(|e| BotError::Config(format!("failed to parse config file: {}", e)))?
        } else {
            Config::default()
        };

        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Resolved exchange base URL, honoring the testnet flag.
    pub fn exchange_base_url(&self) -> String {
        if let Some(url) = &self.exchange.base_url {
            return url.clone();
        }
        if self.exchange.testnet {
            "https://testnet.binancefuture.com".to_string()
        } else {
            "https://fapi.binance.com".to_string()
        }
    }

    /// Environment overrides for credentials and runtime switches.
    fn apply_env_overrides(&mut self) {
        use std::env;
        if let Ok(v) = env::var("API_KEY") {
            if !v.is_empty() {
                self.exchange.api_key = Some(v);
            }
        }
        if let Ok(v) = env::var("API_SECRET") {
            if !v.is_empty() {
                self.exchange.api_secret = Some(v);
            }
        }
        if let Ok(v) = env::var("EXCHANGE_BASE_URL") {
            if !v.is_empty() {
                self.exchange.base_url = Some(v);
            }
        }
        if let Ok(v) = env::var("USE_MOCK") {
            let lower = v.to_lowercase();
            if ["1", "true", "yes"].contains(&lower.as_str()) {
                self.exchange.use_mock = true;
            }
            if ["0", "false", "no"].contains(&lower.as_str()) {
                self.exchange.use_mock = false;
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3030,
            },
            exchange: ExchangeConfig {
                api_key: None,
                api_secret: None,
                base_url: None,
                quote_asset: "USDT".to_string(),
                testnet: true,
                use_mock: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_url_points_at_testnet() {
        let cfg = Config::default();
        assert!(cfg.exchange_base_url().contains("testnet"));
    }

    #[test]
    fn explicit_base_url_wins_over_testnet_flag() {
        let mut cfg = Config::default();
        cfg.exchange.base_url = Some("https://example.invalid".to_string());
        assert_eq!(cfg.exchange_base_url(), "https://example.invalid");
    }
}
