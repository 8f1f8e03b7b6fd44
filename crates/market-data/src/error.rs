use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Failed to reach the market data source: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The market data source answered with HTTP status {0}")]
    UpstreamStatus(u16),

    #[error("Failed to deserialize the market data response: {0}")]
    Deserialization(String),

    #[error("The market data source returned no usable data: {0}")]
    NoData(String),
}
