use aegis_core::Price;
use rust_decimal::Decimal;

/// Port for the risk model
///
/// Provides the minimum and maximum future price implied by the current price
/// level, a horizon expressed as a year fraction (e.g. 0.5 for 6 months) and a
/// probability level (e.g. 0.95 for 95%).
///
/// Implementations must be pure: the engine calls this once per active bound
/// on every recompute and relies on identical inputs producing identical output.
pub trait RangeProvider: Send + Sync {
    /// Returns `(min_price, max_price)`
    fn price_range(&self, price: Price, year_fraction: Decimal, probability: Decimal)
    -> (Price, Price);
}
