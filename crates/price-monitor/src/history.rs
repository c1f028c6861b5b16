//! Observed prices: the open period and the averages of closed ones

use aegis_core::{Price, Timestamp, Volume};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A sample observed during the current (open) period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPrice {
    pub price: Price,
    pub volume: Volume,
}

/// Average of all samples of one closed period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastPrice {
    /// Time the period was observed at
    pub time: Timestamp,
    pub average_price: Price,
}

/// Plain arithmetic mean of the samples, volume is not used as a weight
pub fn average_price(prices: &[CurrentPrice]) -> Option<Price> {
    if prices.is_empty() {
        return None;
    }
    let total: Decimal = prices.iter().map(|p| p.price).sum();
    Some(total / Decimal::from(prices.len()))
}
