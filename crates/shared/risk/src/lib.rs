//! Aegis Risk
//!
//! Range provider implementations. Real risk models (log-normal, etc.) live
//! outside this workspace; the simple provider here gives fixed relative bands
//! and is used by the runner and in tests.

mod basic;

pub use basic::{RangeConfig, SimpleRangeProvider};
