//! ATR (Average True Range).
//!
//! True range per bar = max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR here is the simple mean of the most recent n true ranges, not the
//! Wilder-smoothed variant.

use super::check_window;
use crate::domain::bar::PriceBar;
use crate::domain::error::PaperTraderError;

pub fn calculate_atr(bars: &[PriceBar], period: usize) -> Result<f64, PaperTraderError> {
    check_window(bars, period, period + 1)?;

    // bars[i + 1] is the chronologically previous session.
    let mut sum = 0.0;
    for i in 0..period {
        sum += bars[i].true_range(bars[i + 1].close);
    }

    Ok(sum / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    /// Chronological (high, low, close) triples → most-recent-first bars.
    fn bars_from_hlc(triples: &[(f64, f64, f64)]) -> Vec<PriceBar> {
        let mut bars: Vec<PriceBar> = triples
            .iter()
            .enumerate()
            .map(|(i, &(high, low, close))| PriceBar {
                symbol: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high,
                low,
                close,
                volume: 1000,
            })
            .collect();
        bars.reverse();
        bars
    }

    #[test]
    fn atr_insufficient_bars() {
        let bars = bars_from_hlc(&[(110.0, 90.0, 100.0); 14]);
        assert!(matches!(
            calculate_atr(&bars, 14),
            Err(PaperTraderError::InsufficientData { minimum: 15, .. })
        ));
    }

    #[test]
    fn atr_simple_ranges() {
        // Every bar spans 20 with no gaps, so each TR is 20.
        let bars = bars_from_hlc(&[(110.0, 90.0, 100.0); 4]);
        let atr = calculate_atr(&bars, 3).unwrap();
        assert_relative_eq!(atr, 20.0);
    }

    #[test]
    fn atr_gap_dominates() {
        // Second bar gaps up: TR = |130 - 105| = 25 beats high-low of 10.
        let bars = bars_from_hlc(&[
            (110.0, 100.0, 105.0),
            (130.0, 120.0, 125.0),
            (126.0, 116.0, 121.0),
        ]);
        let atr = calculate_atr(&bars, 2).unwrap();
        // TRs most-recent-first: max(10, |126-125|, |116-125|)=10, then 25.
        assert_relative_eq!(atr, (10.0 + 25.0) / 2.0);
    }

    #[test]
    fn atr_is_mean_not_smoothed() {
        let bars = bars_from_hlc(&[
            (110.0, 100.0, 105.0),
            (115.0, 105.0, 110.0),
            (120.0, 110.0, 115.0),
            (145.0, 125.0, 135.0),
        ]);
        let atr = calculate_atr(&bars, 3).unwrap();
        // TRs: |145-125| vs |145-115|=30 vs |125-115|=10 → 30; then 10; then 10.
        assert_relative_eq!(atr, (30.0 + 10.0 + 10.0) / 3.0);
    }
}
