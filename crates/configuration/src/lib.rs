use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, MarketDataSettings, ServerSettings};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the configuration file,
/// deserializes it into our strongly-typed `Config` struct, and returns it.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml"))
        // Optionally, one could add environment variables here as well.
        // .add_source(config::Environment::with_prefix("APP"));
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const SAMPLE: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 3000

        [market_data]
        base_url = "https://query1.finance.yahoo.com/v8/finance/chart"
        symbol = "^GSPC"
        interval = "1d"
        quote_range = "5d"
        history_range = "3mo"
        user_agent = "Mozilla/5.0"
    "#;

    #[test]
    fn deserializes_a_full_config() {
        let config = config::Config::builder()
            .add_source(config::File::from_str(SAMPLE, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize::<Config>()
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.market_data.symbol, "^GSPC");
        assert_eq!(config.server.addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn rejects_an_unparseable_bind_address() {
        let server = ServerSettings {
            host: "not a host".to_string(),
            port: 3000,
        };
        assert!(matches!(
            server.addr(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
