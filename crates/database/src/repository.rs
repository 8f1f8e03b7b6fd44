use crate::DbError;
use chrono::{DateTime, Utc};
use core_types::{Direction, Quote};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

/// How many records `list_forecasts` returns when the caller does not say.
const DEFAULT_LIST_LIMIT: i64 = 20;

const RETURNING_COLUMNS: &str =
    "id, forecast_date, direction, confidence, open, high, low, close, volume, actual, created_at";

/// The `ForecastRepository` provides a high-level, application-specific
/// interface to the forecast ledger. It encapsulates all SQL queries and
/// data access logic.
#[derive(Debug, Clone)]
pub struct ForecastRepository {
    pool: PgPool,
}

/// A row from the `forecasts` table.
///
/// `direction` and `actual` are stored as lowercase text; `actual` stays
/// `NULL` until the realized outcome is recorded.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub id: Uuid,
    pub forecast_date: String,
    pub direction: String,
    pub confidence: Decimal,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub actual: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate hit-rate of the ledger, for the dashboard's model card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyStats {
    /// All forecasts ever recorded.
    pub total: i64,
    /// Forecasts whose realized outcome has been recorded.
    pub evaluated: i64,
    /// Evaluated forecasts whose call matched the outcome.
    pub hits: i64,
    /// `hits / evaluated` as a percentage, absent until something is evaluated.
    pub accuracy_pct: Option<Decimal>,
}

#[derive(Debug, FromRow)]
struct AccuracyCounts {
    total: i64,
    evaluated: i64,
    hits: i64,
}

impl ForecastRepository {
    /// Creates a new `ForecastRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends one forecast to the ledger and returns the stored row.
    ///
    /// The id and `created_at` are assigned by the database; `actual` starts
    /// out unknown.
    pub async fn create_forecast(
        &self,
        direction: Direction,
        confidence: Decimal,
        quote: &Quote,
    ) -> Result<ForecastRecord, DbError> {
        let forecast_date = Utc::now().format("%-d %b %Y").to_string();

        let sql = format!(
            "INSERT INTO forecasts \
                 (forecast_date, direction, confidence, open, high, low, close, volume) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {RETURNING_COLUMNS}"
        );
        let record = sqlx::query_as::<_, ForecastRecord>(&sql)
            .bind(&forecast_date)
            .bind(direction.as_str())
            .bind(confidence)
            .bind(quote.open)
            .bind(quote.high)
            .bind(quote.low)
            .bind(quote.close)
            .bind(quote.volume)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    /// Fetches the most recent forecasts, newest first.
    ///
    /// A missing or non-positive limit falls back to the default of 20.
    pub async fn list_forecasts(&self, limit: Option<i64>) -> Result<Vec<ForecastRecord>, DbError> {
        let limit = normalize_limit(limit);

        let sql = format!(
            "SELECT {RETURNING_COLUMNS} FROM forecasts ORDER BY created_at DESC LIMIT $1"
        );
        let records = sqlx::query_as::<_, ForecastRecord>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Records the realized outcome for one forecast and returns the updated
    /// row, or `DbError::NotFound` when the id is unknown.
    ///
    /// A plain last-writer-wins update: concurrent amends to the same row do
    /// not conflict, the final write stands.
    pub async fn amend_forecast(
        &self,
        id: Uuid,
        actual: Direction,
    ) -> Result<ForecastRecord, DbError> {
        let sql = format!(
            "UPDATE forecasts SET actual = $1 WHERE id = $2 RETURNING {RETURNING_COLUMNS}"
        );
        let record = sqlx::query_as::<_, ForecastRecord>(&sql)
            .bind(actual.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match record {
            Some(record) => Ok(record),
            None => {
                tracing::debug!(%id, "amend targeted an unknown forecast");
                Err(DbError::NotFound)
            }
        }
    }

    /// Computes the ledger's aggregate hit-rate in a single round trip.
    pub async fn accuracy_stats(&self) -> Result<AccuracyStats, DbError> {
        let counts = sqlx::query_as::<_, AccuracyCounts>(
            "SELECT \
                 COUNT(*) AS total, \
                 COUNT(actual) AS evaluated, \
                 COUNT(*) FILTER (WHERE actual = direction) AS hits \
             FROM forecasts",
        )
        .fetch_one(&self.pool)
        .await?;

        let accuracy_pct = if counts.evaluated > 0 {
            Some(
                (Decimal::from(counts.hits) / Decimal::from(counts.evaluated)
                    * Decimal::ONE_HUNDRED)
                    .round_dp(1),
            )
        } else {
            None
        };

        Ok(AccuracyStats {
            total: counts.total,
            evaluated: counts.evaluated,
            hits: counts.hits,
            accuracy_pct,
        })
    }
}

fn normalize_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(n) if n > 0 => n,
        _ => DEFAULT_LIST_LIMIT,
    }
}
