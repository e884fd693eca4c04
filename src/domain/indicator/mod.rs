//! Technical indicator implementations.
//!
//! All functions are pure and consume a most-recent-first bar slice (see
//! [`crate::domain::bar`]). Recurrence-based indicators (RSI, EMA) reverse to
//! chronological order internally. An indicator that cannot be computed from
//! the bars on hand fails with [`PaperTraderError::InsufficientData`] — callers
//! treat that as "cannot analyze this symbol now", never as a default value.

pub mod rsi;
pub mod moving_average;
pub mod bollinger;
pub mod macd;
pub mod atr;
pub mod levels;

pub use atr::calculate_atr;
pub use bollinger::{BollingerBands, calculate_bollinger};
pub use levels::{SupportResistance, support_resistance};
pub use macd::{MacdValue, calculate_macd};
pub use moving_average::{calculate_ema, calculate_sma};
pub use rsi::calculate_rsi;

use crate::domain::bar::PriceBar;
use crate::domain::error::PaperTraderError;

/// A zero period can never be satisfied, so it reports as insufficient data
/// rather than panicking downstream.
pub(crate) fn check_window(
    bars: &[PriceBar],
    period: usize,
    minimum: usize,
) -> Result<(), PaperTraderError> {
    if period == 0 || bars.len() < minimum {
        return Err(PaperTraderError::InsufficientData {
            symbol: bars.first().map(|b| b.symbol.clone()).unwrap_or_default(),
            bars: bars.len(),
            minimum,
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::NaiveDate;

    /// Build a most-recent-first bar slice from chronological closes.
    pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        let mut bars: Vec<PriceBar> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                symbol: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect();
        bars.reverse();
        bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::bars_from_closes;

    #[test]
    fn check_window_rejects_zero_period() {
        let bars = bars_from_closes(&[100.0, 101.0]);
        assert!(check_window(&bars, 0, 0).is_err());
    }

    #[test]
    fn check_window_reports_symbol_and_counts() {
        let bars = bars_from_closes(&[100.0, 101.0]);
        let err = check_window(&bars, 14, 15).unwrap_err();
        match err {
            PaperTraderError::InsufficientData {
                symbol,
                bars,
                minimum,
            } => {
                assert_eq!(symbol, "TEST");
                assert_eq!(bars, 2);
                assert_eq!(minimum, 15);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn check_window_empty_slice() {
        let err = check_window(&[], 14, 15).unwrap_err();
        match err {
            PaperTraderError::InsufficientData { symbol, bars, .. } => {
                assert_eq!(symbol, "");
                assert_eq!(bars, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
