mod auction;
mod bounds;
mod trade;
mod trigger;

pub use auction::{AuctionDuration, TradingMode};
pub use bounds::PriceMonitoringBounds;
pub use trade::Trade;
pub use trigger::{PriceMonitoringParameters, PriceMonitoringSettings, PriceMonitoringTrigger};
