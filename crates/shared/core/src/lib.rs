//! Aegis Core Domain
//!
//! Pure domain types for the Aegis price-monitoring system.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Auction types
    AuctionDuration,
    // Monitoring configuration
    PriceMonitoringBounds,
    PriceMonitoringParameters,
    PriceMonitoringSettings,
    PriceMonitoringTrigger,
    // Trades feeding the monitor
    Trade,
    TradingMode,
};
pub use values::{Price, SECONDS_PER_YEAR, Timestamp, Volume};
