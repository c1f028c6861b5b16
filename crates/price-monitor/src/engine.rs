//! Price monitoring engine
//!
//! Tracks the prices a market trades at, keeps one valid price band per
//! configured trigger and drives the market's auction state when a price
//! falls outside a band.

use std::collections::BTreeMap;
use std::sync::Arc;

use aegis_core::{
    AuctionDuration, Price, PriceMonitoringBounds, PriceMonitoringSettings, Timestamp, Volume,
};
use aegis_ports::{AuctionState, RangeProvider};
use chrono::Duration;
use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::bounds::{Bound, PriceRange, Trigger, horizon_year_fraction, sort_triggers};
use crate::config::{effective_update_frequency, validate_settings};
use crate::error::{MonitorError, Result};
use crate::history::{CurrentPrice, PastPrice, average_price};

/// Builder for [`Engine`]
pub struct EngineBuilder {
    settings: PriceMonitoringSettings,
    range_provider: Option<Arc<dyn RangeProvider>>,
    min_duration: Duration,
}

impl EngineBuilder {
    /// Risk model used to turn a price into a valid range
    pub fn range_provider(mut self, range_provider: Arc<dyn RangeProvider>) -> Self {
        self.range_provider = Some(range_provider);
        self
    }

    /// Shortest price monitoring auction the engine will start
    pub fn min_duration(mut self, min_duration: Duration) -> Self {
        self.min_duration = min_duration;
        self
    }

    pub fn build(self) -> Result<Engine> {
        let range_provider = self
            .range_provider
            .ok_or(MonitorError::MissingRangeProvider)?;
        let mut engine = Engine::new(range_provider, &self.settings)?;
        engine.set_min_duration(self.min_duration);
        Ok(engine)
    }
}

/// Price monitoring engine of a single market
///
/// Not thread safe: the owner serialises every call.
pub struct Engine {
    range_provider: Arc<dyn RangeProvider>,
    update_frequency: Duration,
    min_duration: AuctionDuration,

    // Sorted by horizon, then probability descending. `bounds[i]` belongs to `triggers[i]`.
    pub(crate) triggers: Vec<Trigger>,
    pub(crate) bounds: Vec<Bound>,
    pub(crate) horizons: BTreeMap<i64, Decimal>,

    pub(crate) initialised: bool,
    /// Set once any time was accepted, `now` is meaningless before
    pub(crate) time_seen: bool,
    pub(crate) now: Timestamp,
    /// Next time the bounds get recomputed
    pub(crate) update: Timestamp,
    pub(crate) prices_now: Vec<CurrentPrice>,
    pub(crate) prices_past: Vec<PastPrice>,

    pub(crate) price_range_cache: Vec<Option<PriceRange>>,
    pub(crate) price_range_cache_time: Option<Timestamp>,
    pub(crate) ref_price_cache: BTreeMap<i64, Price>,
    pub(crate) ref_price_cache_time: Option<Timestamp>,

    pub(crate) changed: bool,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("initialised", &self.initialised)
            .field("now", &self.now)
            .field("update", &self.update)
            .field("triggers", &self.triggers.len())
            .field("prices_now", &self.prices_now.len())
            .field("prices_past", &self.prices_past.len())
            .finish()
    }
}

impl Engine {
    pub fn builder(settings: PriceMonitoringSettings) -> EngineBuilder {
        EngineBuilder {
            settings,
            range_provider: None,
            min_duration: Duration::zero(),
        }
    }

    /// Create an engine for the given risk model and settings
    pub fn new(
        range_provider: Arc<dyn RangeProvider>,
        settings: &PriceMonitoringSettings,
    ) -> Result<Self> {
        let (triggers, horizons) = build_triggers(settings)?;

        Ok(Self {
            range_provider,
            update_frequency: Duration::seconds(effective_update_frequency(settings)),
            min_duration: AuctionDuration::default(),
            bounds: vec![Bound::default(); triggers.len()],
            triggers,
            horizons,
            initialised: false,
            time_seen: false,
            now: Timestamp::default(),
            update: Timestamp::default(),
            prices_now: Vec::new(),
            prices_past: Vec::new(),
            price_range_cache: Vec::new(),
            price_range_cache_time: None,
            ref_price_cache: BTreeMap::new(),
            ref_price_cache_time: None,
            changed: true,
        })
    }

    /// Set the shortest price monitoring auction the engine will start
    ///
    /// Extensions of an auction already running are not affected.
    pub fn set_min_duration(&mut self, min_duration: Duration) {
        self.min_duration = AuctionDuration::seconds(min_duration.num_seconds());
        self.changed = true;
    }

    /// Replace the risk model and the triggers
    ///
    /// The engine goes back to uninitialised: the next traded price becomes
    /// the new baseline.
    pub fn update_settings(
        &mut self,
        range_provider: Arc<dyn RangeProvider>,
        settings: &PriceMonitoringSettings,
    ) -> Result<()> {
        let (triggers, horizons) = build_triggers(settings)?;

        self.range_provider = range_provider;
        self.update_frequency = Duration::seconds(effective_update_frequency(settings));
        self.bounds = vec![Bound::default(); triggers.len()];
        self.triggers = triggers;
        self.horizons = horizons;
        self.initialised = false;
        self.update = self.now;
        self.invalidate_caches();
        self.changed = true;

        info!("Price monitoring reconfigured with {} triggers", self.triggers.len());
        Ok(())
    }

    /// Has the engine seen a price yet?
    pub fn initialised(&self) -> bool {
        self.initialised
    }

    /// Has the state changed since the last snapshot?
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Horizons of all the triggers as year fractions, ascending
    pub fn horizon_year_fractions(&self) -> Vec<Decimal> {
        let mut fractions: Vec<Decimal> = self.horizons.values().copied().collect();
        fractions.sort();
        fractions
    }

    /// Valid price range of every active trigger at the last seen time
    pub fn current_bounds(&self) -> Vec<PriceMonitoringBounds> {
        let ranges = self.price_ranges_snapshot();
        let mut bounds: Vec<PriceMonitoringBounds> = ranges
            .iter()
            .enumerate()
            .filter(|(i, _)| self.bounds[*i].active)
            .filter_map(|(i, range)| {
                range.map(|range| PriceMonitoringBounds {
                    min_valid_price: range.min,
                    max_valid_price: range.max,
                    trigger: self.triggers[i].config,
                    reference_price: range.reference,
                })
            })
            .collect();

        bounds.sort_by(|a, b| {
            a.trigger.horizon.cmp(&b.trigger.horizon).then_with(|| {
                a.trigger
                    .probability
                    .partial_cmp(&b.trigger.probability)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        bounds
    }

    /// Range of prices that won't start a price monitoring auction
    ///
    /// `(0, Decimal::MAX)` when no band is in force.
    pub fn valid_price_range(&self) -> (Price, Price) {
        let mut min = Decimal::ZERO;
        let mut max = Decimal::MAX;

        let ranges = self.price_ranges_snapshot();
        for (i, range) in ranges.iter().enumerate() {
            if !self.bounds[i].active {
                continue;
            }
            if let Some(range) = range {
                min = min.max(range.min);
                max = max.min(range.max);
            }
        }
        (min, max)
    }

    /// Move the engine clock forward without a trade
    pub fn on_time_update(&mut self, now: Timestamp) -> Result<()> {
        self.record_time_change(now)
    }

    /// Check a traded price and start, extend or end auctions accordingly
    pub fn check_price<A>(
        &mut self,
        auction: &mut A,
        price: Price,
        volume: Volume,
        now: Timestamp,
    ) -> Result<()>
    where
        A: AuctionState + ?Sized,
    {
        self.check_time_sequence(now)?;

        let was_initialised = self.initialised;
        if !was_initialised {
            if volume == 0 {
                return Ok(());
            }
            self.reset(price, volume, now);
            self.initialised = true;
        }

        let fba = auction.is_fba();
        if !auction.in_auction() || fba {
            self.record_time_change(now)?;

            let breached = self.check_bounds(price, volume);
            if breached.is_empty() {
                if was_initialised {
                    self.record_price_change(price, volume);
                }
                return Ok(());
            }

            let mut duration = self.total_extension(&breached);

            if fba && auction.auction_end() {
                info!(
                    "Price {} breached {} bounds, extending closing batch auction by {}s",
                    price,
                    breached.len(),
                    duration.duration
                );
                auction.extend_auction(duration);
                return Ok(());
            }

            if duration < self.min_duration {
                duration = self.min_duration;
            }
            info!(
                "Price {} breached {} bounds, starting price monitoring auction of {}s",
                price,
                breached.len(),
                duration.duration
            );
            auction.start_price_auction(now, duration);
            return Ok(());
        }

        if auction.is_opening_auction() {
            return Ok(());
        }

        self.record_time_change(now)?;

        let breached = self.check_bounds(price, volume);
        if breached.is_empty() {
            if !auction.is_price_auction() {
                return Ok(());
            }

            let end = auction.expires_at().ok_or(MonitorError::ExpiresAtNotSet)?;
            if now <= end {
                return Ok(());
            }

            info!("Price monitoring auction expired at {}, ending it", end);
            auction.end_auction();
            self.reset(price, volume, now);
            return Ok(());
        }

        let duration = self.total_extension(&breached);
        info!(
            "Price {} breached {} bounds during auction, extending by {}s",
            price,
            breached.len(),
            duration.duration
        );
        auction.extend_auction(duration);
        Ok(())
    }

    /// Restart monitoring from a single price, dropping history and bands
    fn reset(&mut self, price: Price, volume: Volume, now: Timestamp) {
        self.now = now;
        self.time_seen = true;
        self.update = now;
        self.changed = true;

        if volume > 0 {
            self.prices_now = vec![CurrentPrice { price, volume }];
            self.prices_past.clear();
        } else if let Some(last) = self.prices_past.last().copied() {
            self.prices_past = vec![last];
        } else {
            self.initialised = false;
            return;
        }

        debug!("Price monitoring reset at {} with price {}", now, price);

        self.invalidate_caches();
        for bound in &mut self.bounds {
            *bound = Bound::default();
        }
        self.update_bounds();
    }

    fn record_price_change(&mut self, price: Price, volume: Volume) {
        if volume > 0 {
            self.prices_now.push(CurrentPrice { price, volume });
            self.changed = true;
        }
    }

    fn check_time_sequence(&self, now: Timestamp) -> Result<()> {
        if self.time_seen && now < self.now {
            warn!(
                "Price monitoring received time {} before the last seen time {}",
                now, self.now
            );
            return Err(MonitorError::TimeSequence {
                last: self.now,
                received: now,
            });
        }
        Ok(())
    }

    fn record_time_change(&mut self, now: Timestamp) -> Result<()> {
        self.check_time_sequence(now)?;
        self.time_seen = true;
        if now == self.now {
            return Ok(());
        }

        if let Some(average) = average_price(&self.prices_now) {
            debug!(
                "Closing period at {} with {} prices averaging {}",
                self.now,
                self.prices_now.len(),
                average
            );
            self.prices_past.push(PastPrice {
                time: self.now,
                average_price: average,
            });
        }
        self.prices_now.clear();
        self.now = now;
        self.changed = true;
        self.update_bounds();
        Ok(())
    }

    /// Indices of the active bounds the price falls outside of, now deactivated
    fn check_bounds(&mut self, price: Price, volume: Volume) -> Vec<usize> {
        if volume == 0 {
            return Vec::new();
        }

        self.refresh_price_ranges();
        let breached: Vec<usize> = self
            .price_range_cache
            .iter()
            .enumerate()
            .filter(|(i, _)| self.bounds[*i].active)
            .filter_map(|(i, range)| match range {
                Some(range) if range.is_breached_by(price) => Some(i),
                _ => None,
            })
            .collect();

        for &i in &breached {
            self.bounds[i].active = false;
        }
        if !breached.is_empty() {
            self.changed = true;
        }
        breached
    }

    fn total_extension(&self, breached: &[usize]) -> AuctionDuration {
        breached
            .iter()
            .map(|&i| self.triggers[i].auction_extension)
            .sum()
    }

    fn update_bounds(&mut self) {
        if self.now < self.update || self.triggers.is_empty() {
            return;
        }

        let Some(latest) = self.latest_price() else {
            return;
        };

        // Skip straight past every missed step, the bands are computed once
        let frequency = self.update_frequency.num_seconds();
        let elapsed = (self.now - self.update).num_seconds();
        let steps = elapsed / frequency + 1;
        self.update = self
            .update
            .checked_add_signed(Duration::seconds(steps * frequency))
            .unwrap_or(Timestamp::MAX_UTC);

        for (bound, trigger) in self.bounds.iter_mut().zip(&self.triggers) {
            if !bound.active {
                continue;
            }
            let (min, max) =
                self.range_provider
                    .price_range(latest, trigger.year_fraction, trigger.probability);
            bound.min_move_down = min - latest;
            bound.max_move_up = max - latest;
        }
        self.price_range_cache_time = None;

        self.clear_stale_prices();
        self.changed = true;

        debug!(
            "Price bounds recomputed at {} from latest price {}, next update at {}",
            self.now, latest, self.update
        );
    }

    /// Most recent period average, or the last sample of the open period
    fn latest_price(&self) -> Option<Price> {
        self.prices_past
            .last()
            .map(|p| p.average_price)
            .or_else(|| self.prices_now.last().map(|p| p.price))
    }

    /// Drop averages older than the longest horizon, keeping at least one
    fn clear_stale_prices(&mut self) {
        let Some(max_horizon) = self.triggers.iter().map(|t| t.horizon).max() else {
            return;
        };
        if self.prices_past.is_empty() {
            return;
        }

        let min_required = self.horizon_start(max_horizon);
        let last = self.prices_past.len() - 1;
        let keep_from = self.prices_past[..last]
            .iter()
            .position(|p| p.time >= min_required)
            .unwrap_or(last);
        self.prices_past.drain(..keep_from);
    }

    fn refresh_price_ranges(&mut self) {
        if self.price_range_cache_time == Some(self.now)
            && self.price_range_cache.len() == self.bounds.len()
        {
            return;
        }

        let mut ranges = Vec::with_capacity(self.bounds.len());
        for i in 0..self.bounds.len() {
            let range = if self.bounds[i].active {
                let horizon = self.triggers[i].horizon;
                self.ref_price(horizon)
                    .map(|reference| PriceRange::new(reference, &self.bounds[i]))
            } else {
                None
            };
            ranges.push(range);
        }

        self.price_range_cache = ranges;
        self.price_range_cache_time = Some(self.now);
    }

    /// Price ranges without touching the caches
    fn price_ranges_snapshot(&self) -> Vec<Option<PriceRange>> {
        if self.price_range_cache_time == Some(self.now)
            && self.price_range_cache.len() == self.bounds.len()
        {
            return self.price_range_cache.clone();
        }

        let ref_cache_fresh = self.ref_price_cache_time == Some(self.now);
        self.bounds
            .iter()
            .zip(&self.triggers)
            .map(|(bound, trigger)| {
                if !bound.active {
                    return None;
                }
                let reference = ref_cache_fresh
                    .then(|| self.ref_price_cache.get(&trigger.horizon).copied())
                    .flatten()
                    .or_else(|| self.calculate_ref_price(trigger.horizon))?;
                Some(PriceRange::new(reference, bound))
            })
            .collect()
    }

    fn ref_price(&mut self, horizon: i64) -> Option<Price> {
        if self.ref_price_cache_time != Some(self.now) {
            self.ref_price_cache.clear();
            self.ref_price_cache_time = Some(self.now);
        }

        if let Some(price) = self.ref_price_cache.get(&horizon) {
            return Some(*price);
        }
        let price = self.calculate_ref_price(horizon)?;
        self.ref_price_cache.insert(horizon, price);
        Some(price)
    }

    /// Last period average at or before `now - horizon`
    ///
    /// Falls back to the oldest average, then to the first sample of the open
    /// period when no period has closed yet.
    fn calculate_ref_price(&self, horizon: i64) -> Option<Price> {
        let Some(first) = self.prices_past.first() else {
            return self.prices_now.first().map(|p| p.price);
        };

        let cutoff = self.horizon_start(horizon);
        let reference = self
            .prices_past
            .iter()
            .take_while(|p| p.time <= cutoff)
            .last()
            .unwrap_or(first);
        Some(reference.average_price)
    }

    /// `now - horizon`, or the earliest representable time
    fn horizon_start(&self, horizon: i64) -> Timestamp {
        Duration::try_seconds(horizon)
            .and_then(|span| self.now.checked_sub_signed(span))
            .unwrap_or(Timestamp::MIN_UTC)
    }

    fn invalidate_caches(&mut self) {
        self.price_range_cache.clear();
        self.price_range_cache_time = None;
        self.ref_price_cache.clear();
        self.ref_price_cache_time = None;
    }

    pub(crate) fn min_duration_secs(&self) -> i64 {
        self.min_duration.duration
    }

    pub(crate) fn restore_min_duration(&mut self, seconds: i64) {
        self.min_duration = AuctionDuration::seconds(seconds);
    }
}

/// Validate, convert and sort the configured triggers
fn build_triggers(
    settings: &PriceMonitoringSettings,
) -> Result<(Vec<Trigger>, BTreeMap<i64, Decimal>)> {
    validate_settings(settings)?;

    let mut triggers = settings
        .triggers()
        .iter()
        .enumerate()
        .map(|(index, config)| Trigger::from_config(index, config))
        .collect::<Result<Vec<_>>>()?;
    sort_triggers(&mut triggers);

    let horizons = triggers
        .iter()
        .map(|t| (t.horizon, horizon_year_fraction(t.horizon)))
        .collect();

    Ok((triggers, horizons))
}
