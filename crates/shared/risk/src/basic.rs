use aegis_core::Price;
use aegis_ports::RangeProvider;
use log::trace;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Relative band configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Fraction of the price the market may fall (0.1 = 10%)
    pub max_move_down: Decimal,
    /// Fraction of the price the market may rise
    pub max_move_up: Decimal,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            max_move_down: dec!(0.05),
            max_move_up: dec!(0.05),
        }
    }
}

/// Fixed-band range provider
///
/// Ignores horizon and probability: every trigger gets the same relative band
/// around the reference price.
pub struct SimpleRangeProvider {
    config: RangeConfig,
}

impl SimpleRangeProvider {
    /// Create a new provider with default (±5%) bands
    pub fn new() -> Self {
        Self {
            config: RangeConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(config: RangeConfig) -> Self {
        Self { config }
    }

    /// Get the band configuration
    pub fn config(&self) -> &RangeConfig {
        &self.config
    }
}

impl Default for SimpleRangeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeProvider for SimpleRangeProvider {
    fn price_range(
        &self,
        price: Price,
        year_fraction: Decimal,
        probability: Decimal,
    ) -> (Price, Price) {
        let min = price * (Decimal::ONE - self.config.max_move_down);
        let max = price * (Decimal::ONE + self.config.max_move_up);

        trace!(
            "Price range: price={}, tau={}, p={} -> [{}, {}]",
            price, year_fraction, probability, min, max
        );

        (min.max(Decimal::ZERO), max)
    }
}
