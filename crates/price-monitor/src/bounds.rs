//! Triggers and the price bands derived from them

use aegis_core::{AuctionDuration, Price, PriceMonitoringTrigger, SECONDS_PER_YEAR};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};

/// A configured trigger with its decimal inputs to the risk model precomputed
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Trigger {
    pub config: PriceMonitoringTrigger,
    pub horizon: i64,
    pub probability: Decimal,
    pub year_fraction: Decimal,
    pub auction_extension: AuctionDuration,
}

impl Trigger {
    pub fn from_config(index: usize, config: &PriceMonitoringTrigger) -> Result<Self> {
        let probability =
            Decimal::from_f64(config.probability).ok_or_else(|| MonitorError::InvalidTrigger {
                index,
                reason: format!("probability {} is not representable", config.probability),
            })?;

        Ok(Self {
            config: *config,
            horizon: config.horizon,
            probability,
            year_fraction: horizon_year_fraction(config.horizon),
            auction_extension: AuctionDuration::seconds(config.auction_extension),
        })
    }
}

/// Horizon in seconds expressed as a fraction of a 365.25-day year
pub fn horizon_year_fraction(horizon: i64) -> Decimal {
    Decimal::from(horizon) / SECONDS_PER_YEAR
}

/// Sort triggers by ascending horizon, then descending probability
///
/// Reference prices are cached per horizon, so triggers sharing a horizon
/// must be adjacent.
pub(crate) fn sort_triggers(triggers: &mut [Trigger]) {
    triggers.sort_by(|a, b| {
        a.horizon
            .cmp(&b.horizon)
            .then_with(|| b.probability.cmp(&a.probability))
    });
}

/// Allowed deviation from the reference price for one trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bound {
    /// Cleared when the bound is breached; it stays quiet until the next reset
    pub active: bool,
    pub max_move_up: Decimal,
    /// Negative (or zero) offset below the reference price
    pub min_move_down: Decimal,
}

impl Default for Bound {
    fn default() -> Self {
        Self {
            active: true,
            max_move_up: Decimal::ZERO,
            min_move_down: Decimal::ZERO,
        }
    }
}

/// Absolute valid range for one trigger at the current time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Price,
    pub max: Price,
    pub reference: Price,
}

impl PriceRange {
    pub fn new(reference: Price, bound: &Bound) -> Self {
        Self {
            min: reference + bound.min_move_down,
            max: reference + bound.max_move_up,
            reference,
        }
    }

    /// Check if a price falls outside the range (the ends are valid)
    pub fn is_breached_by(&self, price: Price) -> bool {
        price < self.min || price > self.max
    }
}
