use crate::responses::{ChartResponse, ChartResult};
use async_trait::async_trait;
use chrono::TimeZone;
use chrono::Utc;
use configuration::MarketDataSettings;
use core_types::{DailyBar, MarketSnapshot};
use rust_decimal::prelude::*;

pub mod error;
pub mod responses;

// --- Public API ---
pub use error::MarketDataError;

/// The generic, abstract interface to the market-quote source.
/// This trait is the contract the web layer and CLI use, allowing the
/// underlying implementation (live or mock) to be swapped out.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Fetches the most recent completed trading day, with the percent
    /// change against the previous session's close.
    async fn latest_snapshot(&self) -> Result<MarketSnapshot, MarketDataError>;

    /// Fetches the trailing daily series used by the price chart,
    /// oldest bar first.
    async fn daily_history(&self) -> Result<Vec<DailyBar>, MarketDataError>;
}

/// A concrete implementation of `MarketDataClient` for the Yahoo Finance
/// v8 chart API.
#[derive(Debug, Clone)]
pub struct YahooChartClient {
    client: reqwest::Client,
    base_url: String,
    symbol: String,
    interval: String,
    quote_range: String,
    history_range: String,
}

impl YahooChartClient {
    pub fn new(settings: &MarketDataSettings) -> Result<Self, MarketDataError> {
        // The source rejects requests without a browser-looking User-Agent.
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            symbol: settings.symbol.clone(),
            interval: settings.interval.clone(),
            quote_range: settings.quote_range.clone(),
            history_range: settings.history_range.clone(),
        })
    }

    /// Performs one chart request for the given trailing range and unwraps
    /// the envelope down to the single result block.
    async fn fetch_chart(&self, range: &str) -> Result<ChartResult, MarketDataError> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(&self.symbol));

        let response = self
            .client
            .get(&url)
            .query(&[("interval", self.interval.as_str()), ("range", range)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::UpstreamStatus(status.as_u16()));
        }

        let text = response.text().await?;
        let payload: ChartResponse = serde_json::from_str(&text)
            .map_err(|e| MarketDataError::Deserialization(e.to_string()))?;

        if let Some(error) = payload.chart.error {
            if !error.is_null() {
                return Err(MarketDataError::NoData(error.to_string()));
            }
        }

        let mut results = payload
            .chart
            .result
            .ok_or_else(|| MarketDataError::NoData("chart response contained no result".to_string()))?;
        if results.is_empty() {
            return Err(MarketDataError::NoData(
                "chart response contained an empty result".to_string(),
            ));
        }
        Ok(results.remove(0))
    }
}

#[async_trait]
impl MarketDataClient for YahooChartClient {
    async fn latest_snapshot(&self) -> Result<MarketSnapshot, MarketDataError> {
        let result = self.fetch_chart(&self.quote_range).await?;
        latest_snapshot_from(&result)
    }

    async fn daily_history(&self) -> Result<Vec<DailyBar>, MarketDataError> {
        let result = self.fetch_chart(&self.history_range).await?;
        Ok(history_from(&result))
    }
}

/// Reads a possibly-missing value out of one of the parallel quote arrays.
fn value_at(values: &[Option<f64>], idx: usize) -> Option<f64> {
    values.get(idx).copied().flatten()
}

/// Prices are rounded to cents before they leave this crate.
fn round2(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(2)
}

fn whole(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(0)
}

/// Extracts the most recent completed trading day from a chart result.
///
/// The source pads the trailing window with `null` entries for days that have
/// not closed yet, so we walk backwards to the last day with real figures.
/// The previous day's close (or, failing that, the response metadata) anchors
/// the percent-change calculation.
fn latest_snapshot_from(result: &ChartResult) -> Result<MarketSnapshot, MarketDataError> {
    let quotes = result
        .indicators
        .quote
        .first()
        .ok_or_else(|| MarketDataError::NoData("no quote arrays in chart result".to_string()))?;

    let mut idx = quotes.close.len();
    let idx = loop {
        if idx == 0 {
            return Err(MarketDataError::NoData(
                "no completed trading day in the window".to_string(),
            ));
        }
        idx -= 1;
        if value_at(&quotes.open, idx).is_some() && value_at(&quotes.close, idx).is_some() {
            break idx;
        }
    };

    let open = value_at(&quotes.open, idx);
    let high = value_at(&quotes.high, idx);
    let low = value_at(&quotes.low, idx);
    let close = value_at(&quotes.close, idx);
    let (open, high, low, close) = match (open, high, low, close) {
        (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
        _ => {
            return Err(MarketDataError::NoData(
                "latest trading day is missing price figures".to_string(),
            ))
        }
    };
    let volume = value_at(&quotes.volume, idx).unwrap_or(0.0);

    let previous_close = if idx > 0 {
        value_at(&quotes.close, idx - 1)
    } else {
        None
    }
    .or(result.meta.previous_close)
    .ok_or_else(|| MarketDataError::NoData("no previous close available".to_string()))?;

    let close = round2(close);
    let previous_close = round2(previous_close);
    if previous_close.is_zero() {
        return Err(MarketDataError::NoData(
            "previous close of zero cannot anchor a change percentage".to_string(),
        ));
    }
    let price_change = ((close - previous_close) / previous_close * Decimal::ONE_HUNDRED).round_dp(2);

    Ok(MarketSnapshot {
        open: round2(open),
        high: round2(high),
        low: round2(low),
        close,
        volume: whole(volume),
        price_change,
        previous_close,
    })
}

/// Extracts the chronological daily series from a chart result, skipping
/// days without complete price figures.
fn history_from(result: &ChartResult) -> Vec<DailyBar> {
    let quotes = match result.indicators.quote.first() {
        Some(quotes) => quotes,
        None => return Vec::new(),
    };

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let row = (
            value_at(&quotes.open, i),
            value_at(&quotes.high, i),
            value_at(&quotes.low, i),
            value_at(&quotes.close, i),
        );
        let (open, high, low, close) = match row {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => continue,
        };
        let date = match Utc.timestamp_opt(*ts, 0).single() {
            Some(dt) => dt.date_naive(),
            None => continue,
        };

        bars.push(DailyBar {
            date,
            open: round2(open),
            high: round2(high),
            low: round2(low),
            close: round2(close),
            volume: whole(value_at(&quotes.volume, i).unwrap_or(0.0)),
        });
    }

    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // Three trading days; the last one has not closed yet and is all null.
    const FIXTURE: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "previousClose": 5950.0 },
                "timestamp": [1733356800, 1733443200, 1733529600],
                "indicators": {
                    "quote": [{
                        "open":   [5990.0, 6010.25, null],
                        "high":   [6020.0, 6055.75, null],
                        "low":    [5980.5, 6005.0,  null],
                        "close":  [6000.0, 6050.5,  null],
                        "volume": [4100000000.0, 4944560000.0, null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    fn fixture_result() -> ChartResult {
        let payload: ChartResponse = serde_json::from_str(FIXTURE).unwrap();
        payload.chart.result.unwrap().remove(0)
    }

    #[test]
    fn latest_snapshot_skips_the_unfinished_day() {
        let snapshot = latest_snapshot_from(&fixture_result()).unwrap();

        assert_eq!(snapshot.open, dec!(6010.25));
        assert_eq!(snapshot.close, dec!(6050.5));
        assert_eq!(snapshot.volume, dec!(4944560000));
        assert_eq!(snapshot.previous_close, dec!(6000.0));
        // (6050.5 - 6000) / 6000 * 100 = 0.8416..., rounded to cents of a percent.
        assert_eq!(snapshot.price_change, dec!(0.84));
    }

    #[test]
    fn latest_snapshot_falls_back_to_meta_previous_close() {
        let single_day: &str = r#"{
            "chart": {
                "result": [{
                    "meta": { "previousClose": 5950.0 },
                    "timestamp": [1733356800],
                    "indicators": {
                        "quote": [{
                            "open": [5990.0], "high": [6020.0], "low": [5980.5],
                            "close": [6000.0], "volume": [4100000000.0]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let payload: ChartResponse = serde_json::from_str(single_day).unwrap();
        let result = payload.chart.result.unwrap().remove(0);

        let snapshot = latest_snapshot_from(&result).unwrap();
        assert_eq!(snapshot.previous_close, dec!(5950.0));
        // (6000 - 5950) / 5950 * 100 = 0.8403...
        assert_eq!(snapshot.price_change, dec!(0.84));
    }

    #[test]
    fn all_null_window_is_reported_as_no_data() {
        let empty: &str = r#"{
            "chart": {
                "result": [{
                    "meta": {},
                    "timestamp": [1733356800],
                    "indicators": { "quote": [{ "open": [null], "close": [null] }] }
                }],
                "error": null
            }
        }"#;
        let payload: ChartResponse = serde_json::from_str(empty).unwrap();
        let result = payload.chart.result.unwrap().remove(0);

        assert!(matches!(
            latest_snapshot_from(&result),
            Err(MarketDataError::NoData(_))
        ));
    }

    #[test]
    fn history_keeps_only_completed_days_in_order() {
        let bars = history_from(&fixture_result());

        assert_eq!(bars.len(), 2);
        assert!(bars[0].date < bars[1].date);
        assert_eq!(bars[0].close, dec!(6000.0));
        assert_eq!(bars[1].close, dec!(6050.5));
        assert_eq!(bars[1].volume, dec!(4944560000));
    }
}
