use crate::NoiseSource;
use rand::Rng;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// Half-width of the perturbation band.
pub const NOISE_BOUND: Decimal = dec!(0.04);

/// The production noise source: uniform over `[-0.04, 0.04]`, sampled from
/// the thread-local RNG on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformNoise;

impl NoiseSource for UniformNoise {
    fn jitter(&self) -> Decimal {
        let sample = rand::thread_rng().gen_range(-0.04f64..=0.04f64);
        // The sample is always finite, so the conversion cannot fail in
        // practice; fall back to zero rather than poison a forecast.
        Decimal::from_f64(sample).unwrap_or_default().round_dp(6)
    }
}

/// A noise source that always returns the same value.
///
/// Used by tests to pin the perturbation term, and by anyone who needs a
/// reproducible forecast for a given quote.
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise(pub Decimal);

impl NoiseSource for FixedNoise {
    fn jitter(&self) -> Decimal {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_noise_stays_within_band() {
        let source = UniformNoise;
        for _ in 0..1_000 {
            let n = source.jitter();
            assert!(n >= -NOISE_BOUND && n <= NOISE_BOUND, "out of band: {n}");
        }
    }

    #[test]
    fn fixed_noise_returns_its_value() {
        let source = FixedNoise(dec!(0.025));
        assert_eq!(source.jitter(), dec!(0.025));
        assert_eq!(source.jitter(), dec!(0.025));
    }
}
