//! Aegis Price Monitor
//!
//! Watches the prices a market trades at and protects it from abrupt moves.
//! Every configured trigger (horizon, probability, auction extension) gets a
//! valid price band, derived from a risk model and recomputed at a fixed
//! cadence. A price outside a band starts a price monitoring auction, or
//! extends the one already running.
//!
//! # Example
//!
//! ```ignore
//! let settings = load_settings("price_monitoring.json")?;
//! let mut engine = Engine::builder(settings)
//!     .range_provider(Arc::new(SimpleRangeProvider::new()))
//!     .build()?;
//!
//! engine.check_price(&mut auction, trade.price, trade.size, trade.timestamp)?;
//! ```

mod bounds;
mod config;
mod engine;
mod error;
mod history;
mod state;

pub use bounds::{Bound, PriceRange, horizon_year_fraction};
pub use config::{
    MAX_AUCTION_EXTENSION, MAX_HORIZON, MAX_UPDATE_FREQUENCY, MIN_UPDATE_FREQUENCY,
    effective_update_frequency, load_settings, load_settings_from_str, validate_settings,
};
pub use engine::{Engine, EngineBuilder};
pub use error::{MonitorError, Result};
pub use history::{CurrentPrice, PastPrice};
pub use state::{BoundState, EngineState, PriceRangeEntry};
