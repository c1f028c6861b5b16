//! Snapshot Integration Tests
//!
//! An engine rebuilt from an encoded snapshot must behave exactly like the
//! engine the snapshot was taken from.

mod common;

use std::sync::Arc;

use aegis_core::{Price, PriceMonitoringSettings, PriceMonitoringTrigger, Timestamp, TradingMode};
use aegis_price_monitor::{Engine, EngineState, MonitorError};
use aegis_risk::{RangeConfig, SimpleRangeProvider};
use chrono::Duration;
use common::*;
use rust_decimal_macros::dec;

fn monitoring_settings() -> PriceMonitoringSettings {
    settings(
        vec![
            PriceMonitoringTrigger::new(60, 0.95, 30),
            PriceMonitoringTrigger::new(300, 0.99, 120),
            PriceMonitoringTrigger::new(60, 0.99, 60),
        ],
        15,
    )
}

fn provider() -> Arc<SimpleRangeProvider> {
    Arc::new(SimpleRangeProvider::with_config(RangeConfig {
        max_move_down: dec!(0.02),
        max_move_up: dec!(0.03),
    }))
}

/// A market session: steady trading, a spike, an auction, recovery
fn session(offset: i64) -> Vec<(Price, u64, Timestamp)> {
    let mut trades = Vec::new();
    let mut price = dec!(100);
    for i in 0..40 {
        price += if i % 3 == 0 { dec!(0.4) } else { dec!(-0.15) };
        trades.push((price, 5 + (i as u64 % 4), at(offset + i * 7)));
    }
    trades.push((price * dec!(1.1), 10, at(offset + 290)));
    trades.push((price * dec!(1.1), 10, at(offset + 295)));
    trades.push((price * dec!(1.12), 10, at(offset + 320)));
    trades
}

/// Feed trades, moving a simulated auction state along with the commands
fn replay(engine: &mut Engine, auction: &mut MockAuction, trades: &[(Price, u64, Timestamp)]) {
    for (price, volume, time) in trades {
        let issued = auction.commands.len();
        engine.check_price(auction, *price, *volume, *time).unwrap();

        for command in auction.commands[issued..].to_vec() {
            match command {
                AuctionCommand::Start(now, duration) => {
                    auction.mode = TradingMode::MonitoringAuction;
                    auction.expires_at = Some(now + Duration::seconds(duration));
                }
                AuctionCommand::Extend(duration) => {
                    auction.expires_at =
                        auction.expires_at.map(|end| end + Duration::seconds(duration));
                }
                AuctionCommand::End => {
                    auction.mode = TradingMode::Continuous;
                    auction.expires_at = None;
                }
            }
        }
    }
}

fn restore(engine: &mut Engine, settings: &PriceMonitoringSettings) -> Engine {
    let bytes = engine.get_state().encode().unwrap();
    let state = EngineState::decode(&bytes).unwrap();
    Engine::from_state(provider(), settings, state).unwrap()
}

#[test]
fn test_round_trip_preserves_state() {
    init_logger();
    let settings = monitoring_settings();
    let mut engine = Engine::new(provider(), &settings).unwrap();
    let mut auction = MockAuction::continuous();
    replay(&mut engine, &mut auction, &session(0));

    let state = engine.get_state();
    let decoded = EngineState::decode(&state.encode().unwrap()).unwrap();
    assert_eq!(decoded, state);

    let mut restored = Engine::from_state(provider(), &settings, decoded).unwrap();
    assert_eq!(restored.get_state().hash().unwrap(), state.hash().unwrap());
    assert_eq!(restored.current_bounds(), engine.current_bounds());
    assert_eq!(restored.valid_price_range(), engine.valid_price_range());
    assert_eq!(restored.horizon_year_fractions(), engine.horizon_year_fractions());
    assert!(restored.initialised());
    assert!(!restored.changed());
}

#[test]
fn test_restored_engine_behaves_identically() {
    init_logger();
    let settings = monitoring_settings();
    let mut original = Engine::new(provider(), &settings).unwrap();
    let mut auction = MockAuction::continuous();
    replay(&mut original, &mut auction, &session(0));
    assert!(!auction.commands.is_empty(), "the session should trigger an auction");

    let mut restored = restore(&mut original, &settings);
    let mut restored_auction = MockAuction {
        commands: Vec::new(),
        ..auction.clone()
    };
    auction.commands.clear();

    let next = session(400);
    replay(&mut original, &mut auction, &next);
    replay(&mut restored, &mut restored_auction, &next);

    assert_eq!(auction.commands, restored_auction.commands);
    assert_eq!(
        original.get_state().hash().unwrap(),
        restored.get_state().hash().unwrap()
    );
}

#[test]
fn test_snapshot_taken_mid_auction() {
    init_logger();
    let settings = monitoring_settings();
    let mut original = Engine::new(provider(), &settings).unwrap();
    let mut auction = MockAuction::continuous();

    let trades = session(0);
    let (before, after) = trades.split_at(trades.len() - 2);
    replay(&mut original, &mut auction, before);
    assert_eq!(auction.mode, TradingMode::MonitoringAuction);

    let mut restored = restore(&mut original, &settings);
    let mut restored_auction = auction.clone();

    replay(&mut original, &mut auction, after);
    replay(&mut restored, &mut restored_auction, after);

    assert_eq!(auction.commands, restored_auction.commands);
    assert_eq!(original.get_state(), restored.get_state());
}

#[test]
fn test_min_duration_survives_snapshot() {
    init_logger();
    let settings = monitoring_settings();
    let mut original = Engine::builder(settings.clone())
        .range_provider(provider())
        .min_duration(Duration::minutes(15))
        .build()
        .unwrap();
    let mut auction = MockAuction::continuous();
    original.check_price(&mut auction, dec!(100), 1, t0()).unwrap();

    let mut restored = restore(&mut original, &settings);
    restored.check_price(&mut auction, dec!(150), 1, at(1)).unwrap();

    assert_eq!(auction.commands, vec![AuctionCommand::Start(at(1), 900)]);
}

#[test]
fn test_snapshot_rejected_for_other_triggers() {
    init_logger();
    let settings = monitoring_settings();
    let mut engine = Engine::new(provider(), &settings).unwrap();
    let mut auction = MockAuction::continuous();
    engine.check_price(&mut auction, dec!(100), 1, t0()).unwrap();
    let state = engine.get_state();

    let fewer = common::settings(vec![PriceMonitoringTrigger::new(60, 0.95, 30)], 15);
    let result = Engine::from_state(provider(), &fewer, state.clone());
    assert!(matches!(result, Err(MonitorError::SnapshotMismatch(_))));

    let different = common::settings(
        vec![
            PriceMonitoringTrigger::new(60, 0.95, 30),
            PriceMonitoringTrigger::new(300, 0.99, 120),
            PriceMonitoringTrigger::new(60, 0.99, 90),
        ],
        15,
    );
    let result = Engine::from_state(provider(), &different, state);
    assert!(matches!(result, Err(MonitorError::SnapshotMismatch(_))));
}

#[test]
fn test_hash_tracks_state() {
    init_logger();
    let settings = monitoring_settings();
    let mut engine = Engine::new(provider(), &settings).unwrap();
    let mut auction = MockAuction::continuous();

    let empty = engine.get_state().hash().unwrap();
    engine.check_price(&mut auction, dec!(100), 1, t0()).unwrap();
    let seeded = engine.get_state().hash().unwrap();
    engine.check_price(&mut auction, dec!(100.5), 1, at(3)).unwrap();
    let traded = engine.get_state().hash().unwrap();

    assert_ne!(empty, seeded);
    assert_ne!(seeded, traded);
    assert_eq!(traded, engine.get_state().hash().unwrap());
}
