//! Portfolio cash ledger.
//!
//! One instance per running system, created with a configured initial cash
//! value and only ever updated, never replaced.

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_cash: f64,
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Portfolio {
            cash: initial_cash,
            initial_cash,
        }
    }
}

/// Derived portfolio statistics; a pure read over the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioStats {
    pub cash: f64,
    pub initial_cash: f64,
    /// Σ(entry_price × quantity) over OPEN BUY trades. Entry-price valuation,
    /// not mark-to-market.
    pub invested_capital: f64,
    pub total_value: f64,
    pub total_return_pct: f64,
    pub total_trades: usize,
    pub open_trades: usize,
    pub closed_trades: usize,
    pub total_pnl: f64,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_portfolio_starts_flat() {
        let portfolio = Portfolio::new(100_000.0);
        assert_relative_eq!(portfolio.cash, 100_000.0);
        assert_relative_eq!(portfolio.initial_cash, 100_000.0);
    }
}
