use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use database::DbError;
use market_data::MarketDataError;
use serde_json::json;
use thiserror::Error;
use tracing;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0:?}")]
    InvalidInput(Vec<String>),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// The mapping follows the error taxonomy of the API: malformed payloads are
/// the caller's fault (400), unknown forecast ids are 404, an unreachable
/// market-data source degrades to 503, and anything wrong with the ledger
/// itself is an internal error.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidInput(fields) => {
                let body = Json(json!({
                    "error": "Invalid request data",
                    "fields": fields,
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            AppError::Database(DbError::NotFound) => {
                let body = Json(json!({ "error": "Prediction not found" }));
                (StatusCode::NOT_FOUND, body).into_response()
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                let body = Json(json!({ "error": "An internal database error occurred" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
            AppError::MarketData(md_err) => {
                tracing::warn!(error = ?md_err, "Market data source unavailable.");
                let body = Json(json!({
                    "error": "Unable to fetch market data",
                    "message": "The market data source is temporarily unavailable",
                }));
                (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
            }
        }
    }
}
