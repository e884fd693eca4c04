//! MACD line: EMA(fast) - EMA(slow).
//!
//! The signal line is not smoothed here and always reads 0.0; no consumer in
//! this crate uses it.

use super::moving_average::calculate_ema;
use crate::domain::bar::PriceBar;
use crate::domain::error::PaperTraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
}

pub fn calculate_macd(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
) -> Result<MacdValue, PaperTraderError> {
    let line = calculate_ema(bars, fast)? - calculate_ema(bars, slow)?;
    Ok(MacdValue { line, signal: 0.0 })
}
