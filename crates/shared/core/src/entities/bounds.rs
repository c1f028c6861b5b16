use serde::{Deserialize, Serialize};

use super::PriceMonitoringTrigger;
use crate::values::Price;

/// Valid price range currently enforced by one trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceMonitoringBounds {
    pub min_valid_price: Price,
    pub max_valid_price: Price,
    pub trigger: PriceMonitoringTrigger,
    /// Price the range is centred on (see the trigger horizon)
    pub reference_price: Price,
}

impl PriceMonitoringBounds {
    /// Check if a price lies inside the range (inclusive on both ends)
    pub fn contains(&self, price: Price) -> bool {
        price >= self.min_valid_price && price <= self.max_valid_price
    }
}
