//! Simulation - Price monitoring of a single simulated market
//!
//! Ties together:
//! - Trade feed (spawned task, sends events over a channel)
//! - Market loop (one task owning the engine and the auction state)
//! - Snapshot of the final engine state

use std::sync::Arc;

use aegis_core::{AuctionDuration, PriceMonitoringBounds, Price, Timestamp, TradingMode};
use aegis_ports::AuctionState;
use aegis_price_monitor::{Engine, EngineState};
use aegis_risk::SimpleRangeProvider;
use chrono::Duration;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::auction::{AuctionCounters, MarketAuction};
use crate::config::SimulationConfig;
use crate::error::{Result, RunnerError};
use crate::feed::{MarketEvent, TradeFeedSimulator};

const CHANNEL_CAPACITY: usize = 1000;

/// Simulation results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    /// Trades checked by the engine
    pub trades: u64,
    /// Trades that arrived while the market was in an auction
    pub trades_in_auction: u64,
    /// Time-only ticks
    pub ticks: u64,
    pub auctions: AuctionCounters,
    pub final_mode: TradingMode,
    pub last_price: Option<Price>,
    pub last_time: Option<Timestamp>,
    /// Valid price range when the feed ran out
    pub valid_price_range: (Price, Price),
    pub bounds: Vec<PriceMonitoringBounds>,
    /// SHA-256 of the final engine snapshot
    pub state_hash: String,
}

/// Market loop state, owned by a single task
struct Market {
    engine: Engine,
    auction: MarketAuction,
    opening_auction_ticks: usize,
    events: usize,
    trades: u64,
    trades_in_auction: u64,
    ticks: u64,
    last_price: Option<Price>,
    last_time: Option<Timestamp>,
}

impl Market {
    fn new(config: &SimulationConfig) -> Result<Self> {
        let range_provider = Arc::new(SimpleRangeProvider::with_config(config.risk));
        let engine = Engine::builder(config.price_monitoring.clone())
            .range_provider(range_provider)
            .min_duration(Duration::seconds(config.min_auction_duration))
            .build()?;

        let auction = match config.market.initial_mode {
            TradingMode::OpeningAuction => MarketAuction::opening(),
            TradingMode::BatchAuction => MarketAuction::batch(
                config.feed.start_time,
                AuctionDuration::seconds(config.market.batch_seconds),
            ),
            _ => MarketAuction::continuous(),
        };

        Ok(Self {
            engine,
            auction,
            opening_auction_ticks: config.market.opening_auction_ticks,
            events: 0,
            trades: 0,
            trades_in_auction: 0,
            ticks: 0,
            last_price: None,
            last_time: None,
        })
    }

    fn handle(&mut self, event: MarketEvent) -> Result<()> {
        let now = event.timestamp();
        self.auction.on_time_update(now);

        match event {
            MarketEvent::Trade(trade) => {
                if self.auction.in_auction() {
                    self.trades_in_auction += 1;
                }
                self.engine
                    .check_price(&mut self.auction, trade.price, trade.size, now)?;
                self.trades += 1;
                self.last_price = Some(trade.price);
            }
            MarketEvent::Tick(time) => {
                self.engine.on_time_update(time)?;
                self.ticks += 1;
            }
        }
        self.last_time = Some(now);

        self.auction.leave_if_ready(now);

        self.events += 1;
        if self.auction.is_opening_auction() && self.events >= self.opening_auction_ticks {
            self.auction.end_opening_auction();
        }
        Ok(())
    }

    fn finish(mut self) -> Result<(SimulationResults, EngineState)> {
        let state = self.engine.get_state();
        let results = SimulationResults {
            trades: self.trades,
            trades_in_auction: self.trades_in_auction,
            ticks: self.ticks,
            auctions: self.auction.counters(),
            final_mode: self.auction.mode(),
            last_price: self.last_price,
            last_time: self.last_time,
            valid_price_range: self.engine.valid_price_range(),
            bounds: self.engine.current_bounds(),
            state_hash: state.hash()?,
        };
        Ok((results, state))
    }
}

/// Full market simulation
pub struct MarketSimulation {
    config: SimulationConfig,
}

impl MarketSimulation {
    /// Create a simulation, validating the configuration
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the market until the trade feed runs out
    pub async fn run(self) -> Result<SimulationResults> {
        info!(
            "Starting market simulation: {} ticks, {} triggers",
            self.config.feed.ticks,
            self.config.price_monitoring.triggers().len()
        );

        let market = Market::new(&self.config)?;
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let feed = TradeFeedSimulator::new(self.config.feed.clone());
        let feed_handle = tokio::spawn(feed.run(tx));
        let market_handle = tokio::spawn(Self::run_market(market, rx));

        let market_result = market_handle
            .await
            .map_err(|e| RunnerError::Task(e.to_string()))?;
        // The feed stops on its own once the market is gone
        feed_handle
            .await
            .map_err(|e| RunnerError::Task(e.to_string()))?;

        let (results, state) = market_result?;

        if let Some(path) = &self.config.snapshot_path {
            std::fs::write(path, state.encode()?)?;
            info!("Engine snapshot written to {}", path.display());
        }

        info!(
            "Simulation finished: {} trades, {} auctions started, {} extended, {} ended",
            results.trades,
            results.auctions.started,
            results.auctions.extended,
            results.auctions.ended
        );
        Ok(results)
    }

    /// Consume market events, the engine is only ever touched here
    async fn run_market(
        mut market: Market,
        mut rx: mpsc::Receiver<MarketEvent>,
    ) -> Result<(SimulationResults, EngineState)> {
        debug!("Market loop started");

        while let Some(event) = rx.recv().await {
            market.handle(event)?;
        }

        debug!("Market loop stopped");
        market.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;

    fn short_config() -> SimulationConfig {
        SimulationConfig {
            feed: FeedConfig {
                ticks: 50,
                shock: None,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_opening_auction_ends_after_configured_ticks() {
        let mut config = short_config();
        config.market.opening_auction_ticks = 3;
        let mut market = Market::new(&config).unwrap();
        let mut feed = TradeFeedSimulator::new(config.feed.clone());

        for _ in 0..2 {
            market.handle(feed.next_event().unwrap()).unwrap();
        }
        assert!(market.auction.is_opening_auction());

        market.handle(feed.next_event().unwrap()).unwrap();
        assert_eq!(market.auction.mode(), TradingMode::Continuous);
    }

    #[tokio::test]
    async fn test_simulation_short_run() {
        let sim = MarketSimulation::new(short_config()).unwrap();
        let results = sim.run().await.unwrap();

        assert_eq!(results.trades + results.ticks, 50);
        assert_eq!(results.state_hash.len(), 64);
    }
}
