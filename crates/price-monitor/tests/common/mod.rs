//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use aegis_core::{
    AuctionDuration, Price, PriceMonitoringSettings, PriceMonitoringTrigger, Timestamp, TradingMode,
};
use aegis_ports::{AuctionState, RangeProvider};
use aegis_price_monitor::Engine;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn at(seconds: i64) -> Timestamp {
    t0() + Duration::seconds(seconds)
}

/// Call made to the risk model
#[derive(Debug, Clone, PartialEq)]
pub struct RangeCall {
    pub price: Price,
    pub year_fraction: Decimal,
    pub probability: Decimal,
}

/// Risk model returning fixed absolute moves per probability level
///
/// Probabilities without configured moves get a band of zero width.
#[derive(Default)]
pub struct RecordingRangeProvider {
    moves: Vec<(Decimal, (Decimal, Decimal))>,
    calls: Mutex<Vec<RangeCall>>,
}

impl RecordingRangeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// `price - down` and `price + up` for triggers with this probability
    pub fn with_moves(mut self, probability: Decimal, down: Decimal, up: Decimal) -> Self {
        self.moves.push((probability, (down, up)));
        self
    }

    pub fn calls(&self) -> Vec<RangeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl RangeProvider for RecordingRangeProvider {
    fn price_range(
        &self,
        price: Price,
        year_fraction: Decimal,
        probability: Decimal,
    ) -> (Price, Price) {
        self.calls.lock().unwrap().push(RangeCall {
            price,
            year_fraction,
            probability,
        });
        let tolerance = Decimal::new(1, 9);
        let (down, up) = self
            .moves
            .iter()
            .find(|(p, _)| (*p - probability).abs() < tolerance)
            .map(|(_, moves)| *moves)
            .unwrap_or_default();
        (price - down, price + up)
    }
}

/// Command issued by the engine to the auction state
#[derive(Debug, Clone, PartialEq)]
pub enum AuctionCommand {
    Start(Timestamp, i64),
    Extend(i64),
    End,
}

/// Auction state driven entirely by its flags
///
/// Commands are only recorded, the flags never change on their own.
#[derive(Debug, Clone)]
pub struct MockAuction {
    pub mode: TradingMode,
    pub closing: bool,
    pub expires_at: Option<Timestamp>,
    pub commands: Vec<AuctionCommand>,
}

impl MockAuction {
    pub fn continuous() -> Self {
        Self::in_mode(TradingMode::Continuous)
    }

    pub fn in_mode(mode: TradingMode) -> Self {
        Self {
            mode,
            closing: false,
            expires_at: None,
            commands: Vec::new(),
        }
    }

    pub fn price_auction(expires_at: Timestamp) -> Self {
        Self {
            expires_at: Some(expires_at),
            ..Self::in_mode(TradingMode::MonitoringAuction)
        }
    }
}

impl AuctionState for MockAuction {
    fn mode(&self) -> TradingMode {
        self.mode
    }

    fn in_auction(&self) -> bool {
        self.mode.is_auction()
    }

    fn is_opening_auction(&self) -> bool {
        self.mode == TradingMode::OpeningAuction
    }

    fn is_price_auction(&self) -> bool {
        self.mode == TradingMode::MonitoringAuction
    }

    fn is_fba(&self) -> bool {
        self.mode == TradingMode::BatchAuction
    }

    fn auction_end(&self) -> bool {
        self.closing
    }

    fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    fn start_price_auction(&mut self, now: Timestamp, duration: AuctionDuration) {
        self.commands.push(AuctionCommand::Start(now, duration.duration));
    }

    fn extend_auction(&mut self, delta: AuctionDuration) {
        self.commands.push(AuctionCommand::Extend(delta.duration));
    }

    fn end_auction(&mut self) {
        self.commands.push(AuctionCommand::End);
    }
}

pub fn settings(
    triggers: Vec<PriceMonitoringTrigger>,
    update_frequency: i64,
) -> PriceMonitoringSettings {
    PriceMonitoringSettings::new(triggers, update_frequency)
}

pub fn engine_with(
    provider: &Arc<RecordingRangeProvider>,
    triggers: Vec<PriceMonitoringTrigger>,
    update_frequency: i64,
) -> Engine {
    init_logger();
    Engine::new(provider.clone(), &settings(triggers, update_frequency)).unwrap()
}
