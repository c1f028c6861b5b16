use serde::{Deserialize, Serialize};

/// One price-monitoring rule: how far back to look, how confident the valid
/// range must be, and how long to halt trading when it is breached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceMonitoringTrigger {
    /// Lookback window in seconds
    pub horizon: i64,
    /// Confidence level in (0, 1) handed to the risk model
    pub probability: f64,
    /// Seconds added to the auction when this trigger fires
    pub auction_extension: i64,
}

impl PriceMonitoringTrigger {
    pub fn new(horizon: i64, probability: f64, auction_extension: i64) -> Self {
        Self {
            horizon,
            probability,
            auction_extension,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceMonitoringParameters {
    #[serde(default)]
    pub triggers: Vec<PriceMonitoringTrigger>,
}

/// Price monitoring configuration of a single market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceMonitoringSettings {
    /// Absent parameters are a configuration error, not "no triggers"
    pub parameters: Option<PriceMonitoringParameters>,
    /// Seconds between two recomputations of the bounds
    #[serde(default = "default_update_frequency")]
    pub update_frequency: i64,
}

fn default_update_frequency() -> i64 {
    60
}

impl PriceMonitoringSettings {
    pub fn new(triggers: Vec<PriceMonitoringTrigger>, update_frequency: i64) -> Self {
        Self {
            parameters: Some(PriceMonitoringParameters { triggers }),
            update_frequency,
        }
    }

    /// Configured triggers, in configuration order
    pub fn triggers(&self) -> &[PriceMonitoringTrigger] {
        self.parameters
            .as_ref()
            .map(|p| p.triggers.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for PriceMonitoringSettings {
    fn default() -> Self {
        Self::new(Vec::new(), default_update_frequency())
    }
}
