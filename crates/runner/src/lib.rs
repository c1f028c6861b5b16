//! Aegis Runner - Price Monitoring Market Simulation
//!
//! Runs one simulated market under price monitoring:
//!
//! - **Config**: JSON simulation configuration (triggers, risk band, feed, market)
//! - **Trade Feed**: Seeded random walk of trades with an optional price shock
//! - **Auction**: In-memory auction state driven by the engine
//! - **Simulation**: Market loop owning the engine, plus the final snapshot
//!
//! ## Architecture
//!
//! ```text
//!          ┌─────────────────┐
//!          │   Trade Feed    │
//!          │  (random walk)  │
//!          └────────┬────────┘
//!                   │ events (mpsc)
//!                   ▼
//! ┌───────────────────────────────────────────────┐
//! │                  MARKET LOOP                  │
//! │                                               │
//! │  ┌──────────────────┐  commands  ┌─────────┐  │
//! │  │ Price Monitoring │ ─────────► │ Auction │  │
//! │  │ Engine           │ ◄───────── │ State   │  │
//! │  └────────┬─────────┘  queries   └─────────┘  │
//! │           │ price ranges                      │
//! │           ▼                                   │
//! │  ┌──────────────────┐                         │
//! │  │  Range Provider  │                         │
//! │  └──────────────────┘                         │
//! └───────────────────────────────────────────────┘
//! ```

pub mod auction;
pub mod config;
pub mod error;
pub mod feed;
pub mod simulation;

// Re-export main types
pub use auction::{AuctionCounters, MarketAuction};
pub use config::{
    FeedConfig, MarketConfig, ShockConfig, SimulationConfig, load_config, load_config_from_str,
    load_default_config,
};
pub use error::{Result, RunnerError};
pub use feed::{MarketEvent, TradeFeedSimulator};
pub use simulation::{MarketSimulation, SimulationResults};
