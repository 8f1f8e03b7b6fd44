//! Round-trip tests for the forecast ledger.
//!
//! These need a live PostgreSQL reachable through `DATABASE_URL`, so they are
//! ignored by default:
//!
//! ```text
//! DATABASE_URL=postgres://... cargo test -p database -- --ignored --test-threads=1
//! ```
//!
//! Single-threaded, because the assertions read back what they just wrote
//! from a shared table.

use core_types::{Direction, Quote};
use database::{connect, run_migrations, ForecastRepository};
use rust_decimal_macros::dec;
use uuid::Uuid;

async fn ledger() -> ForecastRepository {
    let pool = connect().await.expect("DATABASE_URL must point at a live database");
    run_migrations(&pool).await.expect("migrations must apply");
    ForecastRepository::new(pool)
}

fn sample_quote() -> Quote {
    Quote {
        open: dec!(6866.32),
        high: dec!(6895.78),
        low: dec!(6858.29),
        close: dec!(6870.40),
        volume: dec!(4944560000),
    }
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn created_forecast_is_first_in_the_listing() {
    let ledger = ledger().await;

    let created = ledger
        .create_forecast(Direction::Up, dec!(66.0), &sample_quote())
        .await
        .unwrap();

    let listed = ledger.list_forecasts(Some(1)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
    assert_eq!(listed[0].direction, "up");
    assert_eq!(listed[0].actual, None);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn amend_changes_only_the_actual_field() {
    let ledger = ledger().await;

    let created = ledger
        .create_forecast(Direction::Down, dec!(58.3), &sample_quote())
        .await
        .unwrap();

    let amended = ledger
        .amend_forecast(created.id, Direction::Up)
        .await
        .unwrap();

    assert_eq!(amended.id, created.id);
    assert_eq!(amended.actual.as_deref(), Some("up"));
    assert_eq!(amended.direction, created.direction);
    assert_eq!(amended.confidence, created.confidence);
    assert_eq!(amended.close, created.close);
    assert_eq!(amended.created_at, created.created_at);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn amending_an_unknown_id_is_not_found_and_writes_nothing() {
    let ledger = ledger().await;

    let before = ledger.accuracy_stats().await.unwrap().total;
    let outcome = ledger.amend_forecast(Uuid::new_v4(), Direction::Up).await;

    assert!(matches!(outcome, Err(database::DbError::NotFound)));
    assert_eq!(ledger.accuracy_stats().await.unwrap().total, before);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn listing_respects_the_limit_and_is_newest_first() {
    let ledger = ledger().await;

    for _ in 0..3 {
        ledger
            .create_forecast(Direction::Up, dec!(55.0), &sample_quote())
            .await
            .unwrap();
    }

    let listed = ledger.list_forecasts(Some(2)).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].created_at >= listed[1].created_at);
}
