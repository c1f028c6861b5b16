//! Aegis Ports
//!
//! Port definitions (traits) for the Aegis price-monitoring system.
//! These define the boundaries between the monitoring engine and the
//! collaborators it drives or consults: the market's auction state machine
//! and the risk model.

mod auction;
mod range_provider;

pub use auction::AuctionState;
pub use range_provider::RangeProvider;
