//! Engine snapshots
//!
//! The full engine state can be captured and restored so a market resumes
//! monitoring without replaying its trade history. Collections are ordered
//! (`Vec`, `BTreeMap`) so equal states always encode to equal bytes.

use std::collections::BTreeMap;
use std::sync::Arc;

use aegis_core::{Price, PriceMonitoringSettings, PriceMonitoringTrigger, Timestamp};
use aegis_ports::RangeProvider;
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::bounds::{Bound, PriceRange};
use crate::engine::Engine;
use crate::error::{MonitorError, Result};
use crate::history::{CurrentPrice, PastPrice};

/// Bound of one trigger as stored in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundState {
    pub trigger: PriceMonitoringTrigger,
    pub active: bool,
    pub max_move_up: Decimal,
    pub min_move_down: Decimal,
}

/// Cached price range of the bound at position `bound`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRangeEntry {
    pub bound: usize,
    pub range: PriceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub initialised: bool,
    /// Whether `now` holds an accepted time
    pub time_seen: bool,
    pub horizon_year_fractions: BTreeMap<i64, Decimal>,
    pub now: Timestamp,
    pub update: Timestamp,
    pub prices_now: Vec<CurrentPrice>,
    pub prices_past: Vec<PastPrice>,
    pub bounds: Vec<BoundState>,
    pub price_range_cache: Vec<PriceRangeEntry>,
    pub price_range_cache_time: Option<Timestamp>,
    pub ref_price_cache: BTreeMap<i64, Price>,
    pub ref_price_cache_time: Option<Timestamp>,
    /// Seconds
    pub min_duration: i64,
}

impl EngineState {
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| MonitorError::Snapshot(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| MonitorError::Snapshot(e.to_string()))
    }

    /// SHA-256 of the encoded state, hex encoded
    pub fn hash(&self) -> Result<String> {
        let bytes = self.encode()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

impl Engine {
    /// Capture the engine state and clear the changed flag
    pub fn get_state(&mut self) -> EngineState {
        self.changed = false;

        EngineState {
            initialised: self.initialised,
            time_seen: self.time_seen,
            horizon_year_fractions: self.horizons.clone(),
            now: self.now,
            update: self.update,
            prices_now: self.prices_now.clone(),
            prices_past: self.prices_past.clone(),
            bounds: self
                .triggers
                .iter()
                .zip(&self.bounds)
                .map(|(trigger, bound)| BoundState {
                    trigger: trigger.config,
                    active: bound.active,
                    max_move_up: bound.max_move_up,
                    min_move_down: bound.min_move_down,
                })
                .collect(),
            price_range_cache: self
                .price_range_cache
                .iter()
                .enumerate()
                .filter_map(|(bound, range)| range.map(|range| PriceRangeEntry { bound, range }))
                .collect(),
            price_range_cache_time: self.price_range_cache_time,
            ref_price_cache: self.ref_price_cache.clone(),
            ref_price_cache_time: self.ref_price_cache_time,
            min_duration: self.min_duration_secs(),
        }
    }

    /// Rebuild an engine from a snapshot taken with the same triggers
    pub fn from_state(
        range_provider: Arc<dyn RangeProvider>,
        settings: &PriceMonitoringSettings,
        state: EngineState,
    ) -> Result<Self> {
        let mut engine = Engine::new(range_provider, settings)?;

        if engine.triggers.len() != state.bounds.len() {
            return Err(MonitorError::SnapshotMismatch(format!(
                "{} triggers configured, {} in snapshot",
                engine.triggers.len(),
                state.bounds.len()
            )));
        }
        for (index, (trigger, stored)) in engine.triggers.iter().zip(&state.bounds).enumerate() {
            if trigger.config != stored.trigger {
                return Err(MonitorError::SnapshotMismatch(format!(
                    "trigger #{} is {:?}, snapshot has {:?}",
                    index, trigger.config, stored.trigger
                )));
            }
        }

        let mut price_range_cache = vec![None; state.bounds.len()];
        for entry in state.price_range_cache {
            let slot = price_range_cache.get_mut(entry.bound).ok_or_else(|| {
                MonitorError::SnapshotMismatch(format!(
                    "cached range for unknown bound #{}",
                    entry.bound
                ))
            })?;
            *slot = Some(entry.range);
        }

        engine.bounds = state
            .bounds
            .iter()
            .map(|b| Bound {
                active: b.active,
                max_move_up: b.max_move_up,
                min_move_down: b.min_move_down,
            })
            .collect();
        engine.initialised = state.initialised;
        engine.time_seen = state.time_seen;
        engine.horizons = state.horizon_year_fractions;
        engine.now = state.now;
        engine.update = state.update;
        engine.prices_now = state.prices_now;
        engine.prices_past = state.prices_past;
        engine.price_range_cache = price_range_cache;
        engine.price_range_cache_time = state.price_range_cache_time;
        engine.ref_price_cache = state.ref_price_cache;
        engine.ref_price_cache_time = state.ref_price_cache_time;
        engine.restore_min_duration(state.min_duration);
        engine.changed = false;

        info!(
            "Price monitoring restored at {} with {} past prices",
            engine.now,
            engine.prices_past.len()
        );
        Ok(engine)
    }
}
