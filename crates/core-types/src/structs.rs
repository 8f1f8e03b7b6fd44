use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::Direction;
use crate::error::CoreError;

/// One trading day's open/high/low/close/volume figures.
///
/// The engine assumes `low <= open,close <= high` but does not enforce it;
/// only strict positivity of every field is validated at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Quote {
    /// Checks that every field is strictly positive.
    ///
    /// On failure the error carries the names of all offending fields, so the
    /// caller can report them together instead of one at a time.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut bad_fields = Vec::new();
        for (name, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ] {
            if value <= Decimal::ZERO {
                bad_fields.push(name.to_string());
            }
        }

        if bad_fields.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidQuote(bad_fields))
        }
    }
}

/// The engine's answer for a single quote: a directional call and the
/// self-reported certainty in it, as a percentage rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub direction: Direction,
    pub confidence: Decimal,
}

/// The most recent completed trading day, plus the percent change against
/// the previous session's close. Produced by the market-data collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub price_change: Decimal,
    pub previous_close: Decimal,
}

impl MarketSnapshot {
    /// The snapshot's OHLCV figures as an engine-ready quote.
    pub fn quote(&self) -> Quote {
        Quote {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}

/// One element of the historical daily series backing the price chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_quote() -> Quote {
        Quote {
            open: dec!(6866.32),
            high: dec!(6895.78),
            low: dec!(6858.29),
            close: dec!(6870.40),
            volume: dec!(4944560000),
        }
    }

    #[test]
    fn accepts_a_valid_quote() {
        assert!(valid_quote().validate().is_ok());
    }

    #[test]
    fn reports_every_offending_field() {
        let quote = Quote {
            open: dec!(0),
            volume: dec!(-1),
            ..valid_quote()
        };
        let err = quote.validate().unwrap_err();
        match err {
            CoreError::InvalidQuote(fields) => {
                assert_eq!(fields, vec!["open".to_string(), "volume".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn snapshot_exposes_its_quote() {
        let snapshot = MarketSnapshot {
            open: dec!(100),
            high: dec!(101),
            low: dec!(99),
            close: dec!(100.5),
            volume: dec!(1000),
            price_change: dec!(0.5),
            previous_close: dec!(100),
        };
        let quote = snapshot.quote();
        assert_eq!(quote.open, dec!(100));
        assert_eq!(quote.close, dec!(100.5));
        assert_eq!(quote.volume, dec!(1000));
        assert!(quote.validate().is_ok());
    }

    #[test]
    fn snapshot_serializes_with_camel_case_keys() {
        let snapshot = MarketSnapshot {
            open: dec!(100),
            high: dec!(101),
            low: dec!(99),
            close: dec!(100.5),
            volume: dec!(1000),
            price_change: dec!(0.5),
            previous_close: dec!(100),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("priceChange").is_some());
        assert!(json.get("previousClose").is_some());
    }
}
