use crate::noise::UniformNoise;
use crate::NoiseSource;
use core_types::{Direction, Forecast, Quote};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---===[ Scoring Rule Table ]===---
// Additive adjustments applied on top of the 0.5 base probability.
const BULLISH_CLOSE: Decimal = dec!(0.08);
const STRONG_CLOSE: Decimal = dec!(0.06);
const LOW_VOLATILITY: Decimal = dec!(0.04);
const STRONG_RETURN: Decimal = dec!(0.05);
const WEAK_RETURN: Decimal = dec!(0.08);
const HEAVY_VOLUME_BULLISH: Decimal = dec!(0.04);
const HEAVY_VOLUME_BEARISH: Decimal = dec!(0.03);

// Thresholds the features are measured against.
const STRONG_CLOSE_POSITION: Decimal = dec!(0.6);
const LOW_VOLATILITY_RANGE_PCT: Decimal = dec!(1.5);
const STRONG_RETURN_PCT: Decimal = dec!(0.2);
const WEAK_RETURN_PCT: Decimal = dec!(-0.5);
const HEAVY_VOLUME_BULLISH_FLOOR: Decimal = dec!(4_000_000_000);
const HEAVY_VOLUME_BEARISH_FLOOR: Decimal = dec!(5_000_000_000);

// The final score is always clamped into this band, which bounds every
// confidence to [50.0, 75.0].
const SCORE_FLOOR: Decimal = dec!(0.35);
const SCORE_CEILING: Decimal = dec!(0.75);

/// The directional forecast engine.
///
/// Stateless apart from the noise capability handed in at construction;
/// a single instance can serve any number of concurrent `predict` calls.
pub struct Forecaster {
    noise: Box<dyn NoiseSource>,
}

impl Forecaster {
    /// Creates an engine with the production noise source.
    pub fn new() -> Self {
        Self::with_noise(Box::new(UniformNoise))
    }

    /// Creates an engine with a caller-supplied noise source.
    pub fn with_noise(noise: Box<dyn NoiseSource>) -> Self {
        Self { noise }
    }

    /// Maps one day's quote to a directional call and a confidence percentage.
    ///
    /// The quote is assumed to be validated by the caller; this function never
    /// fails and never produces a non-finite value. A zero high-low range is
    /// treated as a neutral close position rather than dividing by zero.
    pub fn predict(&self, quote: &Quote) -> Forecast {
        let range = quote.high - quote.low;

        // Daily volatility, as a percentage of the open.
        let daily_range = range / quote.open * dec!(100);
        // Daily return, as a percentage of the open.
        let daily_return = (quote.close - quote.open) / quote.open * dec!(100);
        // Where the close falls within the day's range: 1 at the high, 0 at
        // the low, neutral when the session never left a single price.
        let close_position = if range.is_zero() {
            dec!(0.5)
        } else {
            (quote.close - quote.low) / range
        };

        let bullish = quote.close > quote.open;

        let mut score = dec!(0.5);
        if bullish {
            score += BULLISH_CLOSE;
        }
        if close_position > STRONG_CLOSE_POSITION {
            score += STRONG_CLOSE;
        }
        if daily_range < LOW_VOLATILITY_RANGE_PCT {
            score += LOW_VOLATILITY;
        }
        if daily_return > STRONG_RETURN_PCT {
            score += STRONG_RETURN;
        }
        if daily_return < WEAK_RETURN_PCT {
            score -= WEAK_RETURN;
        }
        if quote.volume > HEAVY_VOLUME_BULLISH_FLOOR && bullish {
            score += HEAVY_VOLUME_BULLISH;
        }
        if quote.volume > HEAVY_VOLUME_BEARISH_FLOOR && !bullish {
            score -= HEAVY_VOLUME_BEARISH;
        }

        score += self.noise.jitter();
        score = score.clamp(SCORE_FLOOR, SCORE_CEILING);

        let direction = if score >= dec!(0.5) {
            Direction::Up
        } else {
            Direction::Down
        };
        let confidence = match direction {
            Direction::Up => score * dec!(100),
            Direction::Down => (dec!(1) - score) * dec!(100),
        }
        .round_dp(1);

        tracing::debug!(
            %direction,
            %confidence,
            %daily_range,
            %daily_return,
            %close_position,
            "forecast computed"
        );

        Forecast {
            direction,
            confidence,
        }
    }
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new()
    }
}
