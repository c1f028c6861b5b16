use std::path::Path;

use aegis_core::TradingMode;
use aegis_price_monitor::{MAX_AUCTION_EXTENSION, validate_settings};

use super::types::SimulationConfig;
use crate::error::{Result, RunnerError};

/// Load simulation configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<SimulationConfig> {
    let config: SimulationConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<SimulationConfig> {
    let default_config = include_str!("default_simulation.json");
    load_config_from_str(default_config)
}

impl SimulationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_settings(&self.price_monitoring)?;

        let feed = &self.feed;
        if feed.tick_seconds <= 0 {
            return Err(RunnerError::InvalidConfig(format!(
                "tick_seconds must be positive, got {}",
                feed.tick_seconds
            )));
        }
        if !(0.0..=1.0).contains(&feed.trade_probability) {
            return Err(RunnerError::InvalidConfig(format!(
                "trade_probability must lie in [0, 1], got {}",
                feed.trade_probability
            )));
        }
        if feed.max_volume == 0 {
            return Err(RunnerError::InvalidConfig("max_volume must be at least 1".to_string()));
        }
        if feed.start_price <= rust_decimal::Decimal::ZERO {
            return Err(RunnerError::InvalidConfig(format!(
                "start_price must be positive, got {}",
                feed.start_price
            )));
        }

        match self.market.initial_mode {
            TradingMode::Continuous | TradingMode::OpeningAuction => {}
            TradingMode::BatchAuction if self.market.batch_seconds > 0 => {}
            TradingMode::BatchAuction => {
                return Err(RunnerError::InvalidConfig(
                    "batch_seconds must be positive for batch auctions".to_string(),
                ));
            }
            mode => {
                return Err(RunnerError::InvalidConfig(format!(
                    "market cannot start in {:?}",
                    mode
                )));
            }
        }

        if self.min_auction_duration < 0 {
            return Err(RunnerError::InvalidConfig(format!(
                "min_auction_duration must not be negative, got {}",
                self.min_auction_duration
            )));
        }
        if self.min_auction_duration > MAX_AUCTION_EXTENSION {
            return Err(RunnerError::InvalidConfig(format!(
                "min_auction_duration must not exceed {}s, got {}",
                MAX_AUCTION_EXTENSION, self.min_auction_duration
            )));
        }
        Ok(())
    }
}
