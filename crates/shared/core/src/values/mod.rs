use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Traded volume. Informational for the monitor; zero-volume samples are ignored.
pub type Volume = u64;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// 365.25 days, used to turn trigger horizons into year fractions
pub const SECONDS_PER_YEAR: Decimal = dec!(31557600);
