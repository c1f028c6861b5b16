//! Settings loading and validation

use std::path::Path;

use aegis_core::PriceMonitoringSettings;
use log::warn;

use crate::error::{MonitorError, Result};

/// Shortest allowed bound update cadence, in seconds
pub const MIN_UPDATE_FREQUENCY: i64 = 1;

/// Longest allowed bound update cadence, one year in seconds
pub const MAX_UPDATE_FREQUENCY: i64 = 31_557_600;

/// Longest allowed trigger horizon, ten years in seconds
pub const MAX_HORIZON: i64 = 10 * 31_557_600;

/// Longest allowed auction extension of a single trigger, one week in seconds
pub const MAX_AUCTION_EXTENSION: i64 = 7 * 24 * 3600;

/// Load price monitoring settings from a JSON file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<PriceMonitoringSettings> {
    let content = std::fs::read_to_string(path)?;
    load_settings_from_str(&content)
}

/// Load price monitoring settings from a JSON string
pub fn load_settings_from_str(json: &str) -> Result<PriceMonitoringSettings> {
    let settings: PriceMonitoringSettings = serde_json::from_str(json)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Validate the settings
///
/// An update frequency below [`MIN_UPDATE_FREQUENCY`] is accepted and
/// clamped by [`effective_update_frequency`], one above
/// [`MAX_UPDATE_FREQUENCY`] is rejected.
pub fn validate_settings(settings: &PriceMonitoringSettings) -> Result<()> {
    let parameters = settings
        .parameters
        .as_ref()
        .ok_or(MonitorError::MissingParameters)?;

    if settings.update_frequency > MAX_UPDATE_FREQUENCY {
        return Err(MonitorError::InvalidSettings(format!(
            "update frequency must not exceed {}s, got {}s",
            MAX_UPDATE_FREQUENCY, settings.update_frequency
        )));
    }

    for (index, trigger) in parameters.triggers.iter().enumerate() {
        let reason = if trigger.horizon <= 0 {
            Some(format!("horizon must be positive, got {}", trigger.horizon))
        } else if trigger.horizon > MAX_HORIZON {
            Some(format!(
                "horizon must not exceed {}s, got {}",
                MAX_HORIZON, trigger.horizon
            ))
        } else if !(trigger.probability > 0.0 && trigger.probability < 1.0) {
            Some(format!(
                "probability must lie in (0, 1), got {}",
                trigger.probability
            ))
        } else if trigger.auction_extension < 0 {
            Some(format!(
                "auction extension must not be negative, got {}",
                trigger.auction_extension
            ))
        } else if trigger.auction_extension > MAX_AUCTION_EXTENSION {
            Some(format!(
                "auction extension must not exceed {}s, got {}",
                MAX_AUCTION_EXTENSION, trigger.auction_extension
            ))
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(MonitorError::InvalidTrigger { index, reason });
        }
    }

    Ok(())
}

/// Update cadence actually used by the engine, in seconds
pub fn effective_update_frequency(settings: &PriceMonitoringSettings) -> i64 {
    if settings.update_frequency < MIN_UPDATE_FREQUENCY {
        warn!(
            "Update frequency {}s is below the minimum, using {}s",
            settings.update_frequency, MIN_UPDATE_FREQUENCY
        );
        return MIN_UPDATE_FREQUENCY;
    }
    settings.update_frequency
}
