//! In-memory auction state of a simulated market
//!
//! Implements the [`AuctionState`] port the price monitor drives. The engine
//! only flags a price monitoring auction as ready to end; the market loop
//! decides when to actually leave it (see [`MarketAuction::leave_if_ready`]).

use aegis_core::{AuctionDuration, Timestamp, TradingMode};
use aegis_ports::AuctionState;
use chrono::Duration;
use log::info;
use serde::{Deserialize, Serialize};

/// Number of each command issued to the auction state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionCounters {
    pub started: u64,
    pub extended: u64,
    pub ended: u64,
}

#[derive(Debug, Clone)]
pub struct MarketAuction {
    mode: TradingMode,
    start: Option<Timestamp>,
    duration: AuctionDuration,
    /// Mode to return to once a price monitoring auction ends
    resume_mode: TradingMode,
    batch_length: AuctionDuration,
    ready_to_leave: bool,
    /// Last time the market loop reported
    now: Option<Timestamp>,
    counters: AuctionCounters,
}

impl MarketAuction {
    pub fn continuous() -> Self {
        Self {
            mode: TradingMode::Continuous,
            start: None,
            duration: AuctionDuration::default(),
            resume_mode: TradingMode::Continuous,
            batch_length: AuctionDuration::default(),
            ready_to_leave: false,
            now: None,
            counters: AuctionCounters::default(),
        }
    }

    /// Market opening in an auction with no fixed end
    pub fn opening() -> Self {
        Self {
            mode: TradingMode::OpeningAuction,
            ..Self::continuous()
        }
    }

    /// Market trading in frequent batch auctions of `batch_length`
    pub fn batch(start: Timestamp, batch_length: AuctionDuration) -> Self {
        Self {
            mode: TradingMode::BatchAuction,
            start: Some(start),
            duration: batch_length,
            resume_mode: TradingMode::BatchAuction,
            batch_length,
            ..Self::continuous()
        }
    }

    pub fn counters(&self) -> AuctionCounters {
        self.counters
    }

    /// The price monitor flagged the current auction as done
    pub fn ready_to_leave(&self) -> bool {
        self.ready_to_leave
    }

    /// Uncross the opening auction and start trading continuously
    pub fn end_opening_auction(&mut self) {
        if self.mode == TradingMode::OpeningAuction {
            info!("Opening auction ended");
            self.mode = TradingMode::Continuous;
            self.resume_mode = TradingMode::Continuous;
        }
    }

    /// Leave a price monitoring auction the engine flagged as done
    ///
    /// Returns true when the market changed mode.
    pub fn leave_if_ready(&mut self, now: Timestamp) -> bool {
        if !self.ready_to_leave {
            return false;
        }
        self.ready_to_leave = false;
        self.mode = self.resume_mode;
        if self.mode == TradingMode::BatchAuction {
            self.start = Some(now);
            self.duration = self.batch_length;
        } else {
            self.start = None;
            self.duration = AuctionDuration::default();
        }
        info!("Left price monitoring auction, now in {:?}", self.mode);
        true
    }

    /// Roll batch auctions forward to the one running at `now`
    pub fn on_time_update(&mut self, now: Timestamp) {
        self.now = Some(now);
        if self.mode != TradingMode::BatchAuction || self.batch_length.is_zero() {
            return;
        }
        while let Some(end) = self.expires_at() {
            if now < end {
                break;
            }
            self.start = Some(end);
            self.duration = self.batch_length;
        }
    }
}

impl AuctionState for MarketAuction {
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

    /// A batch auction in its final second
    fn auction_end(&self) -> bool {
        match (self.is_fba(), self.expires_at(), self.now) {
            (true, Some(end), Some(now)) => end - now <= Duration::seconds(1),
            _ => false,
        }
    }

    fn expires_at(&self) -> Option<Timestamp> {
        self.start.map(|start| start + self.duration.as_duration())
    }

    fn start_price_auction(&mut self, now: Timestamp, duration: AuctionDuration) {
        info!("Price monitoring auction started at {} for {}s", now, duration.duration);
        if self.mode != TradingMode::MonitoringAuction {
            self.resume_mode = self.mode;
        }
        self.mode = TradingMode::MonitoringAuction;
        self.start = Some(now);
        self.duration = duration;
        self.ready_to_leave = false;
        self.counters.started += 1;
    }

    fn extend_auction(&mut self, delta: AuctionDuration) {
        info!("Auction extended by {}s", delta.duration);
        self.duration = self.duration + delta;
        self.counters.extended += 1;
    }

    fn end_auction(&mut self) {
        self.ready_to_leave = true;
        self.counters.ended += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_price_auction_lifecycle() {
        let mut auction = MarketAuction::continuous();

        auction.start_price_auction(t0(), AuctionDuration::seconds(60));
        assert!(auction.is_price_auction());
        assert_eq!(auction.expires_at(), Some(t0() + Duration::seconds(60)));

        auction.extend_auction(AuctionDuration::seconds(120));
        assert_eq!(auction.expires_at(), Some(t0() + Duration::seconds(180)));

        assert!(!auction.leave_if_ready(t0()));
        auction.end_auction();
        assert!(auction.leave_if_ready(t0() + Duration::seconds(181)));
        assert_eq!(auction.mode(), TradingMode::Continuous);
        assert_eq!(auction.expires_at(), None);

        assert_eq!(
            auction.counters(),
            AuctionCounters {
                started: 1,
                extended: 1,
                ended: 1
            }
        );
    }

    #[test]
    fn test_opening_auction() {
        let mut auction = MarketAuction::opening();
        assert!(auction.is_opening_auction());
        assert_eq!(auction.expires_at(), None);

        auction.end_opening_auction();
        assert!(!auction.in_auction());
    }

    #[test]
    fn test_batch_auctions_roll_forward() {
        let mut auction = MarketAuction::batch(t0(), AuctionDuration::seconds(30));
        assert!(auction.is_fba());
        assert!(!auction.auction_end());

        auction.on_time_update(t0() + Duration::seconds(75));
        assert_eq!(auction.expires_at(), Some(t0() + Duration::seconds(90)));
        assert!(!auction.auction_end());

        auction.on_time_update(t0() + Duration::seconds(89));
        assert!(auction.auction_end());
    }

    #[test]
    fn test_price_auction_returns_to_batch_trading() {
        let mut auction = MarketAuction::batch(t0(), AuctionDuration::seconds(30));

        auction.start_price_auction(t0() + Duration::seconds(10), AuctionDuration::seconds(60));
        assert!(!auction.is_fba());
        auction.end_auction();
        auction.leave_if_ready(t0() + Duration::seconds(80));

        assert!(auction.is_fba());
        assert_eq!(auction.expires_at(), Some(t0() + Duration::seconds(110)));
    }
}
