//! Screening/batch orchestration.
//!
//! [`run_cycle`] is the single entry point for any external trigger (timer,
//! CLI, HTTP handler): monitor open positions first, then screen for new
//! entries — in that order, so a stale position's cash is freed before the
//! funds check. Symbols are processed sequentially against one consistent
//! cash snapshot; a per-symbol failure degrades to "record and continue" and
//! never aborts the batch.

use chrono::NaiveDate;

use crate::domain::error::PaperTraderError;
use crate::domain::ledger::{MonitorOutcome, TradeLedger};
use crate::domain::screening::{ScreeningCriteria, ScreeningResult, screen_symbols};
use crate::domain::strategy::{StrategyParams, position_size};
use crate::domain::trade::TradeAction;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::store_port::ScreeningStorePort;

/// Per-symbol outcome of one screening/execution pass. First-class output:
/// the CLI and batch callers consume this list directly.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub symbol: String,
    pub action: Option<TradeAction>,
    pub rsi: Option<f64>,
    pub reason: String,
    pub trade_created: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub monitor: Vec<MonitorOutcome>,
    pub outcomes: Vec<CycleOutcome>,
    /// Symbols screened, including failures.
    pub processed: usize,
}

impl CycleReport {
    pub fn trades_created(&self) -> usize {
        self.outcomes.iter().filter(|o| o.trade_created).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }

    pub fn positions_closed(&self) -> usize {
        self.monitor.iter().filter(|m| m.closed).count()
    }
}

/// Screen `symbols` and open a position for each qualifying result.
///
/// Skips symbols that already carry an open position, sizes the rest against
/// current cash, and records one outcome per symbol either way.
pub fn analyze_and_trade(
    ledger: &mut TradeLedger<'_>,
    market: &dyn MarketDataPort,
    screening_store: &mut dyn ScreeningStorePort,
    symbols: &[String],
    params: &StrategyParams,
    criteria: &ScreeningCriteria,
    date: NaiveDate,
) -> Result<CycleReport, PaperTraderError> {
    let scan = screen_symbols(market, symbols, params, criteria);
    screening_store.store_results(&scan.results)?;

    let mut outcomes = Vec::new();

    for skipped in &scan.skipped {
        outcomes.push(CycleOutcome {
            symbol: skipped.symbol.clone(),
            action: None,
            rsi: None,
            reason: "analysis failed".into(),
            trade_created: false,
            error: Some(skipped.reason.clone()),
        });
    }

    for result in screening_store.unexecuted()? {
        let outcome = execute_result(ledger, screening_store, &result, params, date);
        outcomes.push(outcome);
    }

    Ok(CycleReport {
        monitor: Vec::new(),
        outcomes,
        processed: scan.processed,
    })
}

fn execute_result(
    ledger: &mut TradeLedger<'_>,
    screening_store: &mut dyn ScreeningStorePort,
    result: &ScreeningResult,
    params: &StrategyParams,
    date: NaiveDate,
) -> CycleOutcome {
    let base = CycleOutcome {
        symbol: result.symbol.clone(),
        action: result.signal.action(),
        rsi: Some(result.rsi),
        reason: result.reason.clone(),
        trade_created: false,
        error: None,
    };

    let has_open = match ledger.has_open_position(&result.symbol) {
        Ok(open) => open,
        Err(e) => {
            return CycleOutcome {
                error: Some(e.to_string()),
                ..base
            };
        }
    };
    if has_open {
        return CycleOutcome {
            reason: format!("open position exists for {}", result.symbol),
            ..base
        };
    }

    let cash = match ledger.available_cash() {
        Ok(cash) => cash,
        Err(e) => {
            return CycleOutcome {
                error: Some(e.to_string()),
                ..base
            };
        }
    };

    let quantity = position_size(
        cash,
        result.price,
        result.stop_loss,
        params.risk_fraction,
        params.max_position_fraction,
    );
    if quantity == 0 {
        return CycleOutcome {
            reason: format!("position sized to zero for {}", result.symbol),
            ..base
        };
    }

    let Some(proposal) = result.to_new_trade(quantity) else {
        return CycleOutcome {
            reason: format!("no tradeable action for {}", result.symbol),
            ..base
        };
    };

    match ledger.execute_trade(proposal, date) {
        Ok(_) => {
            if let Err(e) = screening_store.mark_executed(result.id) {
                eprintln!("Warning: could not mark result {} executed ({e})", result.id);
            }
            CycleOutcome {
                trade_created: true,
                ..base
            }
        }
        Err(e) => {
            eprintln!("Warning: could not open {} ({e})", result.symbol);
            CycleOutcome {
                error: Some(e.to_string()),
                ..base
            }
        }
    }
}

/// One full cycle: close stale positions, then look for new entries.
pub fn run_cycle(
    ledger: &mut TradeLedger<'_>,
    market: &dyn MarketDataPort,
    screening_store: &mut dyn ScreeningStorePort,
    symbols: &[String],
    params: &StrategyParams,
    criteria: &ScreeningCriteria,
    date: NaiveDate,
) -> Result<CycleReport, PaperTraderError> {
    let monitor = ledger.monitor_positions(market, params, date)?;
    let mut report = analyze_and_trade(
        ledger,
        market,
        screening_store,
        symbols,
        params,
        criteria,
        date,
    )?;
    report.monitor = monitor;
    Ok(report)
}
