//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper:  middle + (multiplier × stddev)
//! - Lower:  middle - (multiplier × stddev)
//!
//! StdDev is population standard deviation (divides by N, not N-1).

use super::check_window;
use crate::domain::bar::PriceBar;
use crate::domain::error::PaperTraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

pub fn calculate_bollinger(
    bars: &[PriceBar],
    period: usize,
    multiplier: f64,
) -> Result<BollingerBands, PaperTraderError> {
    check_window(bars, period, period)?;

    let window = &bars[..period];
    let middle: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;

    let variance: f64 = window
        .iter()
        .map(|b| {
            let diff = b.close - middle;
            diff * diff
        })
        .sum::<f64>()
        / period as f64;
    let stddev = variance.sqrt();

    Ok(BollingerBands {
        upper: middle + multiplier * stddev,
        middle,
        lower: middle - multiplier * stddev,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::bars_from_closes;
    use approx::assert_relative_eq;

    #[test]
    fn bollinger_insufficient_bars() {
        let bars = bars_from_closes(&[100.0; 19]);
        assert!(calculate_bollinger(&bars, 20, 2.0).is_err());
    }

    #[test]
    fn bollinger_constant_prices_collapse_bands() {
        let bars = bars_from_closes(&[100.0; 20]);
        let bands = calculate_bollinger(&bars, 20, 2.0).unwrap();
        assert_relative_eq!(bands.middle, 100.0);
        assert_relative_eq!(bands.upper, 100.0);
        assert_relative_eq!(bands.lower, 100.0);
    }

    #[test]
    fn bollinger_known_values() {
        // Most recent 4 closes are 10, 20, 30, 40: mean 25,
        // population variance = (225+25+25+225)/4 = 125.
        let bars = bars_from_closes(&[10.0, 20.0, 30.0, 40.0]);
        let bands = calculate_bollinger(&bars, 4, 2.0).unwrap();
        let stddev = 125.0_f64.sqrt();
        assert_relative_eq!(bands.middle, 25.0);
        assert_relative_eq!(bands.upper, 25.0 + 2.0 * stddev);
        assert_relative_eq!(bands.lower, 25.0 - 2.0 * stddev);
    }

    #[test]
    fn bollinger_bands_are_symmetric() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + ((i * 3) % 7) as f64).collect();
        let bars = bars_from_closes(&closes);
        let bands = calculate_bollinger(&bars, 20, 2.0).unwrap();
        assert_relative_eq!(
            bands.upper - bands.middle,
            bands.middle - bands.lower,
            epsilon = 1e-9
        );
    }
}
