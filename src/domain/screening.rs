//! Batch screening of a symbol list against strategy criteria.
//!
//! One symbol's failure never aborts the batch: failed symbols are reported
//! in the skipped list and screening continues.

use crate::domain::strategy::{AnalysisResult, Signal, StrategyParams, analyze};
use crate::domain::trade::TradeAction;
use crate::ports::market_data_port::MarketDataPort;

/// Screening filters. Explicit optional fields; `None` means "don't filter".
#[derive(Debug, Clone, Default)]
pub struct ScreeningCriteria {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub rsi_min: Option<f64>,
    pub rsi_max: Option<f64>,
    pub require_ma_crossover: bool,
}

/// One qualifying scan entry, stored for the execution phase to consume once.
#[derive(Debug, Clone)]
pub struct ScreeningResult {
    /// Assigned by the screening store; 0 until stored.
    pub id: i64,
    pub symbol: String,
    pub signal: Signal,
    pub price: f64,
    pub rsi: f64,
    pub ma_short: f64,
    pub ma_long: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub reason: String,
    pub executed: bool,
}

impl ScreeningResult {
    /// Turn a stored scan entry into a trade proposal. `None` for HOLD rows,
    /// which the scan never stores in the first place.
    pub fn to_new_trade(&self, quantity: i64) -> Option<crate::domain::trade::NewTrade> {
        let action = self.signal.action()?;
        Some(crate::domain::trade::NewTrade {
            symbol: self.symbol.clone(),
            action,
            quantity,
            entry_price: self.price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            rsi_at_entry: self.rsi,
            ma_short_at_entry: self.ma_short,
            ma_long_at_entry: self.ma_long,
            entry_reason: self.reason.clone(),
            exit_criteria: format!(
                "stop {:.2}, target {:.2}, or signal reversal",
                self.stop_loss, self.take_profit
            ),
        })
    }

    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        ScreeningResult {
            id: 0,
            symbol: analysis.symbol.clone(),
            signal: analysis.snapshot.signal,
            price: analysis.entry_price,
            rsi: analysis.snapshot.rsi,
            ma_short: analysis.snapshot.ma_short,
            ma_long: analysis.snapshot.ma_long,
            stop_loss: analysis.stop_loss,
            take_profit: analysis.take_profit,
            reason: analysis.reason.clone(),
            executed: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ScreeningReport {
    pub results: Vec<ScreeningResult>,
    pub skipped: Vec<SkippedSymbol>,
    /// Symbols examined, including HOLDs and failures.
    pub processed: usize,
}

pub fn passes_criteria(analysis: &AnalysisResult, criteria: &ScreeningCriteria) -> bool {
    if criteria
        .min_price
        .is_some_and(|min| analysis.entry_price < min)
    {
        return false;
    }
    if criteria
        .max_price
        .is_some_and(|max| analysis.entry_price > max)
    {
        return false;
    }
    if criteria.rsi_min.is_some_and(|min| analysis.snapshot.rsi < min) {
        return false;
    }
    if criteria.rsi_max.is_some_and(|max| analysis.snapshot.rsi > max) {
        return false;
    }
    if criteria.require_ma_crossover {
        let aligned = match analysis.action {
            Some(TradeAction::Buy) => analysis.snapshot.ma_short > analysis.snapshot.ma_long,
            Some(TradeAction::Sell) => analysis.snapshot.ma_short < analysis.snapshot.ma_long,
            None => false,
        };
        if !aligned {
            return false;
        }
    }
    true
}

/// Run the strategy over each symbol, keeping qualifying tradeable entries.
///
/// Per-symbol failures (provider errors, insufficient data) are recorded and
/// skipped; symbols that analyze to HOLD or fail the criteria are simply not
/// included.
pub fn screen_symbols(
    market: &dyn MarketDataPort,
    symbols: &[String],
    params: &StrategyParams,
    criteria: &ScreeningCriteria,
) -> ScreeningReport {
    let mut results = Vec::new();
    let mut skipped = Vec::new();

    for symbol in symbols {
        let analysis = market
            .daily_bars(symbol, params.min_bars())
            .and_then(|bars| analyze(symbol, &bars, params));

        match analysis {
            Ok(analysis) => {
                if analysis.should_trade && passes_criteria(&analysis, criteria) {
                    results.push(ScreeningResult::from_analysis(&analysis));
                }
            }
            Err(e) => {
                eprintln!("Warning: skipping {symbol} ({e})");
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    ScreeningReport {
        results,
        skipped,
        processed: symbols.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::IndicatorSnapshot;

    fn buy_analysis(price: f64, rsi: f64) -> AnalysisResult {
        AnalysisResult {
            symbol: "AAPL".into(),
            should_trade: true,
            action: Some(TradeAction::Buy),
            entry_price: price,
            stop_loss: price * 0.95,
            take_profit: price * 1.15,
            snapshot: IndicatorSnapshot {
                rsi,
                ma_short: 105.0,
                ma_long: 100.0,
                atr: 2.0,
                support: price * 0.9,
                resistance: price * 1.1,
                signal: Signal::Buy,
            },
            reason: "test".into(),
        }
    }

    #[test]
    fn no_criteria_passes_everything() {
        let analysis = buy_analysis(100.0, 25.0);
        assert!(passes_criteria(&analysis, &ScreeningCriteria::default()));
    }

    #[test]
    fn price_band_filters() {
        let analysis = buy_analysis(100.0, 25.0);
        let criteria = ScreeningCriteria {
            min_price: Some(150.0),
            ..Default::default()
        };
        assert!(!passes_criteria(&analysis, &criteria));

        let criteria = ScreeningCriteria {
            max_price: Some(50.0),
            ..Default::default()
        };
        assert!(!passes_criteria(&analysis, &criteria));

        let criteria = ScreeningCriteria {
            min_price: Some(50.0),
            max_price: Some(150.0),
            ..Default::default()
        };
        assert!(passes_criteria(&analysis, &criteria));
    }

    #[test]
    fn rsi_band_filters() {
        let analysis = buy_analysis(100.0, 25.0);
        let criteria = ScreeningCriteria {
            rsi_min: Some(30.0),
            ..Default::default()
        };
        assert!(!passes_criteria(&analysis, &criteria));

        let criteria = ScreeningCriteria {
            rsi_max: Some(20.0),
            ..Default::default()
        };
        assert!(!passes_criteria(&analysis, &criteria));
    }

    #[test]
    fn ma_crossover_requirement() {
        let mut analysis = buy_analysis(100.0, 25.0);
        let criteria = ScreeningCriteria {
            require_ma_crossover: true,
            ..Default::default()
        };
        assert!(passes_criteria(&analysis, &criteria));

        analysis.snapshot.ma_short = 95.0;
        assert!(!passes_criteria(&analysis, &criteria));
    }

    #[test]
    fn from_analysis_starts_unexecuted() {
        let result = ScreeningResult::from_analysis(&buy_analysis(100.0, 25.0));
        assert_eq!(result.id, 0);
        assert!(!result.executed);
        assert_eq!(result.signal, Signal::Buy);
        assert_eq!(result.symbol, "AAPL");
    }
}
