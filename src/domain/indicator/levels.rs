//! Support and resistance levels from recent extremes.

use super::check_window;
use crate::domain::bar::PriceBar;
use crate::domain::error::PaperTraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
}

/// support = min(low), resistance = max(high) over the most recent `lookback`
/// bars.
pub fn support_resistance(
    bars: &[PriceBar],
    lookback: usize,
) -> Result<SupportResistance, PaperTraderError> {
    check_window(bars, lookback, lookback)?;

    let window = &bars[..lookback];
    let support = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let resistance = window
        .iter()
        .map(|b| b.high)
        .fold(f64::NEG_INFINITY, f64::max);

    Ok(SupportResistance {
        support,
        resistance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn bars_from_hl(pairs: &[(f64, f64)]) -> Vec<PriceBar> {
        let mut bars: Vec<PriceBar> = pairs
            .iter()
            .enumerate()
            .map(|(i, &(high, low))| PriceBar {
                symbol: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: (high + low) / 2.0,
                high,
                low,
                close: (high + low) / 2.0,
                volume: 1000,
            })
            .collect();
        bars.reverse();
        bars
    }

    #[test]
    fn levels_insufficient_bars() {
        let bars = bars_from_hl(&[(110.0, 90.0); 19]);
        assert!(support_resistance(&bars, 20).is_err());
    }

    #[test]
    fn levels_extremes_over_window() {
        let bars = bars_from_hl(&[(105.0, 95.0), (120.0, 88.0), (110.0, 92.0)]);
        let levels = support_resistance(&bars, 3).unwrap();
        assert_relative_eq!(levels.support, 88.0);
        assert_relative_eq!(levels.resistance, 120.0);
    }

    #[test]
    fn levels_window_excludes_older_bars() {
        // The extreme (200 high / 10 low) sits outside the 2-bar window.
        let bars = bars_from_hl(&[(200.0, 10.0), (105.0, 95.0), (110.0, 92.0)]);
        let levels = support_resistance(&bars, 2).unwrap();
        assert_relative_eq!(levels.support, 92.0);
        assert_relative_eq!(levels.resistance, 110.0);
    }
}
