//! Market data access port trait.

use crate::domain::bar::{PriceBar, Quote};
use crate::domain::error::PaperTraderError;

pub trait MarketDataPort {
    /// Daily bars for `symbol`, ordered most-recent-first. `size_hint` is the
    /// number of bars the caller needs; adapters may return more (e.g. a full
    /// cached file) but never reorder. Implementations may serve cached/stale
    /// data when the upstream source fails; they error only on total
    /// unavailability.
    fn daily_bars(&self, symbol: &str, size_hint: usize)
    -> Result<Vec<PriceBar>, PaperTraderError>;

    /// Real-time (or latest-known) quote for `symbol`.
    fn quote(&self, symbol: &str) -> Result<Quote, PaperTraderError>;
}
