//! Simple and exponential moving averages of closing prices.
//!
//! SMA: mean of the most recent n closes. Since bars arrive most-recent-first,
//! that is the first n elements of the slice.
//!
//! EMA: k = 2/(n+1), seed with the SMA of the first n chronological bars, then
//! ema = (price - ema)*k + ema forward through the rest.

use super::check_window;
use crate::domain::bar::PriceBar;
use crate::domain::error::PaperTraderError;

pub fn calculate_sma(bars: &[PriceBar], period: usize) -> Result<f64, PaperTraderError> {
    check_window(bars, period, period)?;
    let sum: f64 = bars[..period].iter().map(|b| b.close).sum();
    Ok(sum / period as f64)
}

pub fn calculate_ema(bars: &[PriceBar], period: usize) -> Result<f64, PaperTraderError> {
    check_window(bars, period, period)?;

    let closes: Vec<f64> = bars.iter().rev().map(|b| b.close).collect();
    let k = 2.0 / (period as f64 + 1.0);

    let mut ema = closes[..period].iter().sum::<f64>() / period as f64;
    for &price in &closes[period..] {
        ema = (price - ema) * k + ema;
    }

    Ok(ema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::bars_from_closes;
    use approx::assert_relative_eq;

    #[test]
    fn sma_insufficient_bars() {
        let bars = bars_from_closes(&[100.0; 19]);
        assert!(matches!(
            calculate_sma(&bars, 20),
            Err(PaperTraderError::InsufficientData { minimum: 20, .. })
        ));
    }

    #[test]
    fn sma_averages_most_recent_closes() {
        // Chronological 10, 20, 30, 40 → the 2 most recent are 30 and 40.
        let bars = bars_from_closes(&[10.0, 20.0, 30.0, 40.0]);
        let sma = calculate_sma(&bars, 2).unwrap();
        assert_relative_eq!(sma, 35.0);
    }

    #[test]
    fn sma_full_window() {
        let bars = bars_from_closes(&[10.0, 20.0, 30.0]);
        let sma = calculate_sma(&bars, 3).unwrap();
        assert_relative_eq!(sma, 20.0);
    }

    #[test]
    fn sma_zero_period() {
        let bars = bars_from_closes(&[10.0, 20.0]);
        assert!(calculate_sma(&bars, 0).is_err());
    }

    #[test]
    fn ema_insufficient_bars() {
        let bars = bars_from_closes(&[100.0; 4]);
        assert!(calculate_ema(&bars, 5).is_err());
    }

    #[test]
    fn ema_seed_is_sma_when_no_extra_bars() {
        let bars = bars_from_closes(&[10.0, 20.0, 30.0]);
        let ema = calculate_ema(&bars, 3).unwrap();
        assert_relative_eq!(ema, 20.0);
    }

    #[test]
    fn ema_applies_multiplier_forward() {
        // Seed over [10, 20, 30] = 20, then k = 0.5 for period 3:
        // ema = (40 - 20) * 0.5 + 20 = 30
        let bars = bars_from_closes(&[10.0, 20.0, 30.0, 40.0]);
        let ema = calculate_ema(&bars, 3).unwrap();
        assert_relative_eq!(ema, 30.0);
    }

    #[test]
    fn ema_tracks_constant_series() {
        let bars = bars_from_closes(&[50.0; 30]);
        let ema = calculate_ema(&bars, 10).unwrap();
        assert_relative_eq!(ema, 50.0);
    }

    #[test]
    fn ema_leans_toward_recent_prices() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let bars = bars_from_closes(&closes);
        let ema = calculate_ema(&bars, 10).unwrap();
        let sma = calculate_sma(&bars, 10).unwrap();
        // Rising series: EMA weights recent closes more but both sit below the
        // latest close.
        assert!(ema < 129.0);
        assert!(ema > sma - 10.0);
    }
}
