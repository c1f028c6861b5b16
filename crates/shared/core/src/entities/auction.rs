use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Trading mode of a market as reported by its auction state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradingMode {
    /// Continuous trading, no auction in progress
    Continuous,
    /// Opening auction (never influenced by price monitoring)
    OpeningAuction,
    /// Auction triggered by price monitoring
    MonitoringAuction,
    /// Frequent batch auction
    BatchAuction,
    /// Auction started for another reason, e.g. insufficient liquidity
    LiquidityAuction,
}

impl TradingMode {
    /// Check if the mode is any kind of auction
    pub fn is_auction(&self) -> bool {
        !matches!(self, TradingMode::Continuous)
    }
}

/// Length of an auction (or of an extension to one), in whole seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AuctionDuration {
    pub duration: i64,
}

impl AuctionDuration {
    pub fn seconds(duration: i64) -> Self {
        Self { duration }
    }

    pub fn is_zero(&self) -> bool {
        self.duration == 0
    }

    /// As a chrono span, for adding to timestamps
    ///
    /// Saturates at the longest span chrono can represent.
    pub fn as_duration(&self) -> Duration {
        Duration::try_seconds(self.duration).unwrap_or(if self.duration < 0 {
            Duration::MIN
        } else {
            Duration::MAX
        })
    }
}

impl std::ops::Add for AuctionDuration {
    type Output = AuctionDuration;

    fn add(self, rhs: AuctionDuration) -> AuctionDuration {
        AuctionDuration::seconds(self.duration.saturating_add(rhs.duration))
    }
}

impl std::iter::Sum for AuctionDuration {
    fn sum<I: Iterator<Item = AuctionDuration>>(iter: I) -> Self {
        iter.fold(AuctionDuration::default(), |acc, d| acc + d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auction_duration_sum() {
        let total: AuctionDuration = [60, 120, 0]
            .into_iter()
            .map(AuctionDuration::seconds)
            .sum();
        assert_eq!(total, AuctionDuration::seconds(180));
        assert_eq!(total.as_duration(), Duration::minutes(3));
    }

    #[test]
    fn test_auction_duration_saturates() {
        let total: AuctionDuration = [i64::MAX, i64::MAX]
            .into_iter()
            .map(AuctionDuration::seconds)
            .sum();
        assert_eq!(total, AuctionDuration::seconds(i64::MAX));
        assert!(total > AuctionDuration::seconds(0));
        assert_eq!(total.as_duration(), Duration::MAX);
    }

    #[test]
    fn test_trading_mode_is_auction() {
        assert!(!TradingMode::Continuous.is_auction());
        assert!(TradingMode::OpeningAuction.is_auction());
        assert!(TradingMode::MonitoringAuction.is_auction());
        assert!(TradingMode::BatchAuction.is_auction());
        assert!(TradingMode::LiquidityAuction.is_auction());
    }
}
