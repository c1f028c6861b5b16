use aegis_core::{AuctionDuration, Timestamp, TradingMode};

/// Port for the market's auction state machine
///
/// The price monitor queries it to classify the market and commands it to
/// start, extend or end price-monitoring auctions.
pub trait AuctionState {
    /// Current trading mode of the market
    fn mode(&self) -> TradingMode;

    /// Is any kind of auction in progress?
    fn in_auction(&self) -> bool;

    /// Opening auction in progress
    fn is_opening_auction(&self) -> bool;

    /// Auction started by price monitoring in progress
    fn is_price_auction(&self) -> bool;

    /// Frequent batch auction in progress
    fn is_fba(&self) -> bool;

    /// The current (batch) auction is about to close
    fn auction_end(&self) -> bool;

    /// When the current auction is due to end, if it has an end at all
    fn expires_at(&self) -> Option<Timestamp>;

    /// Start a price-monitoring auction at `now` lasting `duration`
    fn start_price_auction(&mut self, now: Timestamp, duration: AuctionDuration);

    /// Extend the current auction by `delta`
    fn extend_auction(&mut self, delta: AuctionDuration);

    /// Flag the current auction as ready to end
    fn end_auction(&mut self);
}
