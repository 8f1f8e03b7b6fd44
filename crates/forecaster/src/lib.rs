//! # Foresight Forecast Engine
//!
//! This crate contains the directional scoring logic for the system. Given one
//! day's OHLCV quote it produces an `up`/`down` call together with a
//! confidence percentage.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   databases, HTTP, or the upstream data source. It depends only on
//!   `core-types`.
//! - **Explainable Scoring:** The score is a fixed additive rule table over a
//!   handful of price-action features, not a trained model. Every adjustment
//!   is a named constant in `engine.rs`.
//! - **Injectable Uncertainty:** The only non-determinism is a uniform
//!   perturbation drawn from a `NoiseSource` supplied at construction, so
//!   tests can pin the term and assert exact output.
//!
//! ## Public API
//!
//! - `Forecaster`: the engine itself; `predict` maps a `Quote` to a `Forecast`.
//! - `NoiseSource`: the capability that produces the perturbation term.
//! - `UniformNoise` / `FixedNoise`: the production and deterministic sources.

pub mod engine;
pub mod noise;

// Re-export the key components to create a clean, public-facing API.
pub use engine::Forecaster;
pub use noise::{FixedNoise, UniformNoise};

use rust_decimal::Decimal;

/// The capability that supplies the perturbation added to every score.
///
/// Implementations must return a value within `[-0.04, 0.04]`; the engine
/// clamps the final score regardless, so a misbehaving source cannot push a
/// confidence outside its contractual bounds.
///
/// The `Send + Sync` bounds allow a single `Forecaster` to be shared across
/// concurrently-served requests.
pub trait NoiseSource: Send + Sync {
    /// Draws one perturbation term.
    fn jitter(&self) -> Decimal;
}
