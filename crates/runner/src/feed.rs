//! Trade Feed - Simulated prints for the monitored market
//!
//! Generates a random walk of trades with monotonically increasing
//! timestamps:
//! - Trades at the walk's current price with a random size
//! - Time-only ticks when nothing traded
//! - An optional one-off shock that moves the price by a fixed factor

use aegis_core::{Timestamp, Trade};
use chrono::Duration;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;

use crate::config::FeedConfig;

/// Something that happened on the market
#[derive(Debug, Clone, PartialEq)]
pub enum MarketEvent {
    Trade(Trade),
    /// Time moved on without a trade
    Tick(Timestamp),
}

impl MarketEvent {
    pub fn timestamp(&self) -> Timestamp {
        match self {
            MarketEvent::Trade(trade) => trade.timestamp,
            MarketEvent::Tick(time) => *time,
        }
    }
}

/// Generates simulated market events
pub struct TradeFeedSimulator {
    config: FeedConfig,
    price: Decimal,
    time: Timestamp,
    tick: usize,
    rng: StdRng,
}

impl TradeFeedSimulator {
    /// Create a feed seeded from the config
    pub fn new(config: FeedConfig) -> Self {
        let seed = config.seed;
        Self::with_seed(config, seed)
    }

    /// Create with a specific seed for reproducible simulations
    pub fn with_seed(config: FeedConfig, seed: u64) -> Self {
        Self {
            price: config.start_price,
            time: config.start_time,
            tick: 0,
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    /// Current price of the walk
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Ticks generated so far
    pub fn ticks(&self) -> usize {
        self.tick
    }

    pub fn is_finished(&self) -> bool {
        self.tick >= self.config.ticks
    }

    /// Generate next event, `None` once the configured ticks are used up
    pub fn next_event(&mut self) -> Option<MarketEvent> {
        if self.is_finished() {
            return None;
        }

        if self.tick > 0 {
            self.time += Duration::seconds(self.config.tick_seconds);
        }

        // Random walk: price * (1 + volatility * uniform(-1, 1))
        let change = Decimal::from_f64(self.rng.gen_range(-1.0..1.0)).unwrap_or_default();
        self.price = (self.price * (dec!(1) + self.config.volatility * change)).round_dp(4);

        if let Some(shock) = self.config.shock {
            if shock.tick == self.tick {
                self.price = (self.price * shock.factor).round_dp(4);
                debug!("Price shock at tick {}: now {}", self.tick, self.price);
            }
        }
        self.tick += 1;

        let trades: f64 = self.rng.r#gen();
        if trades < self.config.trade_probability {
            let size = self.rng.gen_range(1..=self.config.max_volume);
            Some(MarketEvent::Trade(Trade::new_with_time(self.price, size, self.time)))
        } else {
            Some(MarketEvent::Tick(self.time))
        }
    }

    /// Send every event to the market, stops early if the market goes away
    pub async fn run(mut self, tx: mpsc::Sender<MarketEvent>) {
        while let Some(event) = self.next_event() {
            if tx.send(event).await.is_err() {
                debug!("Market closed, trade feed stopping at tick {}", self.tick);
                return;
            }
        }
        debug!("Trade feed finished after {} ticks", self.tick);
    }
}
