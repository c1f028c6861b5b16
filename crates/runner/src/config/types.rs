use std::path::PathBuf;

use aegis_core::{PriceMonitoringSettings, PriceMonitoringTrigger, Timestamp, TradingMode};
use aegis_risk::RangeConfig;
use chrono::DateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Full simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Triggers and bound update cadence of the monitored market
    pub price_monitoring: PriceMonitoringSettings,
    /// Band of the stand-in risk model
    pub risk: RangeConfig,
    pub feed: FeedConfig,
    pub market: MarketConfig,
    /// Shortest price monitoring auction, in seconds
    pub min_auction_duration: i64,
    /// Where to write the final engine snapshot, if anywhere
    pub snapshot_path: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            price_monitoring: PriceMonitoringSettings::new(
                vec![
                    PriceMonitoringTrigger::new(3600, 0.99, 300),
                    PriceMonitoringTrigger::new(7200, 0.95, 600),
                ],
                60,
            ),
            risk: RangeConfig::default(),
            feed: FeedConfig::default(),
            market: MarketConfig::default(),
            min_auction_duration: 60,
            snapshot_path: None,
        }
    }
}

/// Trade feed (random walk) parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Seed for reproducible runs
    pub seed: u64,
    /// Time of the first tick
    pub start_time: Timestamp,
    pub start_price: Decimal,
    /// Largest relative move per tick (0.002 = 0.2%)
    pub volatility: Decimal,
    /// Seconds between ticks
    pub tick_seconds: i64,
    /// Number of ticks to generate
    pub ticks: usize,
    /// Chance a tick carries a trade, otherwise only time moves
    pub trade_probability: f64,
    pub max_volume: u64,
    /// One-off jump in price
    pub shock: Option<ShockConfig>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start_time: DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default(),
            start_price: dec!(100),
            volatility: dec!(0.002),
            tick_seconds: 5,
            ticks: 2000,
            trade_probability: 0.8,
            max_volume: 10,
            shock: Some(ShockConfig {
                tick: 1000,
                factor: dec!(1.15),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShockConfig {
    /// Tick at which the price jumps
    pub tick: usize,
    /// Price multiplier applied at that tick
    pub factor: Decimal,
}

/// Auction state of the market when the simulation starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Continuous, OpeningAuction or BatchAuction
    pub initial_mode: TradingMode,
    /// Ticks before the opening auction uncrosses
    pub opening_auction_ticks: usize,
    /// Length of each frequent batch auction, in seconds
    pub batch_seconds: i64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            initial_mode: TradingMode::OpeningAuction,
            opening_auction_ticks: 20,
            batch_seconds: 30,
        }
    }
}
