use crate::error::ConfigError;
use serde::Deserialize;
use std::net::SocketAddr;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerSettings,
    pub market_data: MarketDataSettings,
}

/// Contains parameters for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// The interface to bind (e.g., "0.0.0.0").
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
}

impl ServerSettings {
    /// The bind address as a `SocketAddr`.
    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| {
                ConfigError::ValidationError(format!(
                    "'{}:{}' is not a valid socket address",
                    self.host, self.port
                ))
            })
    }
}

/// Contains parameters for the upstream market-data source.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataSettings {
    /// Base URL of the chart API (e.g., "https://query1.finance.yahoo.com/v8/finance/chart").
    pub base_url: String,
    /// The symbol to quote (e.g., "^GSPC").
    pub symbol: String,
    /// Bar interval requested from the source (e.g., "1d").
    pub interval: String,
    /// Trailing window used to locate the latest completed trading day.
    pub quote_range: String,
    /// Trailing window requested for the chart's historical series.
    pub history_range: String,
    /// User-Agent header sent upstream; the source rejects anonymous clients.
    pub user_agent: String,
}
