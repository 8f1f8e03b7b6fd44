use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use core_types::{CoreError, DailyBar, Direction, MarketSnapshot, Quote};
use database::{AccuracyStats, ForecastRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// The payload of a forecast submission: one day's OHLCV figures.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl PredictRequest {
    /// Turns the payload into a validated engine input, or a 400 listing
    /// every non-positive field.
    fn into_quote(self) -> Result<Quote, AppError> {
        let quote = Quote {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        };
        quote.validate().map_err(|err| match err {
            CoreError::InvalidQuote(fields) => AppError::InvalidInput(fields),
            other => AppError::InvalidInput(vec![other.to_string()]),
        })?;
        Ok(quote)
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub id: Uuid,
    pub direction: Direction,
    pub confidence: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// One row of the dashboard's history table. The originating quote stays in
/// the ledger; the listing only carries what the table shows.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub date: String,
    pub direction: String,
    pub confidence: Decimal,
    pub actual: Option<String>,
}

impl From<ForecastRecord> for HistoryEntry {
    fn from(record: ForecastRecord) -> Self {
        Self {
            id: record.id,
            date: record.forecast_date,
            direction: record.direction,
            confidence: record.confidence,
            actual: record.actual,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AmendRequest {
    pub actual: String,
}

/// # GET /api/market-data
/// The latest completed trading day from the upstream source.
pub async fn get_market_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MarketSnapshot>, AppError> {
    let snapshot = state.market.latest_snapshot().await?;
    Ok(Json(snapshot))
}

/// # GET /api/historical-data
/// The trailing daily series backing the price chart.
pub async fn get_historical_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DailyBar>>, AppError> {
    let bars = state.market.daily_history().await?;
    Ok(Json(bars))
}

/// # POST /api/predict
/// Validates the submitted quote, runs the engine, and appends the forecast
/// to the ledger.
pub async fn submit_prediction(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    let quote = request.into_quote()?;
    let forecast = state.forecaster.predict(&quote);

    let record = state
        .ledger
        .create_forecast(forecast.direction, forecast.confidence, &quote)
        .await?;

    tracing::info!(id = %record.id, direction = %forecast.direction, "forecast recorded");

    Ok(Json(PredictResponse {
        id: record.id,
        direction: forecast.direction,
        confidence: forecast.confidence,
        timestamp: record.created_at,
    }))
}

/// # GET /api/predictions
/// The most recent forecasts, newest first; `limit` defaults to 20.
pub async fn get_predictions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let records = state.ledger.list_forecasts(query.limit).await?;
    Ok(Json(records.into_iter().map(HistoryEntry::from).collect()))
}

/// # PATCH /api/predictions/:id
/// Records the realized direction for one forecast.
pub async fn amend_prediction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<AmendRequest>,
) -> Result<Json<ForecastRecord>, AppError> {
    let actual = Direction::from_str(&request.actual)
        .map_err(|_| AppError::InvalidInput(vec!["actual".to_string()]))?;

    let record = state.ledger.amend_forecast(id, actual).await?;
    Ok(Json(record))
}

/// # GET /api/model-stats
/// The ledger's aggregate hit-rate, for the dashboard's model card.
pub async fn get_model_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AccuracyStats>, AppError> {
    let stats = state.ledger.accuracy_stats().await?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn a_valid_submission_becomes_a_quote() {
        let request = PredictRequest {
            open: dec!(6866.32),
            high: dec!(6895.78),
            low: dec!(6858.29),
            close: dec!(6870.40),
            volume: dec!(4944560000),
        };
        let quote = request.into_quote().unwrap();
        assert_eq!(quote.close, dec!(6870.40));
    }

    #[test]
    fn non_positive_fields_are_listed_in_the_rejection() {
        let request = PredictRequest {
            open: dec!(6866.32),
            high: dec!(0),
            low: dec!(-1),
            close: dec!(6870.40),
            volume: dec!(4944560000),
        };
        match request.into_quote() {
            Err(AppError::InvalidInput(fields)) => {
                assert_eq!(fields, vec!["high".to_string(), "low".to_string()]);
            }
            other => panic!("expected an invalid-input rejection, got {other:?}"),
        }
    }

    #[test]
    fn history_entries_drop_the_originating_quote() {
        let record = ForecastRecord {
            id: Uuid::new_v4(),
            forecast_date: "7 Aug 2026".to_string(),
            direction: "up".to_string(),
            confidence: dec!(66.0),
            open: dec!(6866.32),
            high: dec!(6895.78),
            low: dec!(6858.29),
            close: dec!(6870.40),
            volume: dec!(4944560000),
            actual: None,
            created_at: Utc::now(),
        };

        let entry = HistoryEntry::from(record.clone());
        assert_eq!(entry.id, record.id);
        assert_eq!(entry.direction, "up");
        assert_eq!(entry.actual, None);

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("open").is_none());
        assert!(json.get("volume").is_none());
    }
}
