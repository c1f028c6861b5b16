use serde::{Deserialize, Serialize};

use crate::values::{Price, Timestamp, Volume};

/// A trade print as seen by price monitoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub price: Price,
    pub size: Volume,
    pub timestamp: Timestamp,
}

impl Trade {
    /// Create a new trade with explicit timestamp
    pub fn new_with_time(price: Price, size: Volume, timestamp: Timestamp) -> Self {
        Self {
            price,
            size,
            timestamp,
        }
    }
}
