//! Persistence port traits for trades, portfolio, and screening results.

use crate::domain::error::PaperTraderError;
use crate::domain::portfolio::Portfolio;
use crate::domain::screening::ScreeningResult;
use crate::domain::trade::{NewTrade, Trade};
use chrono::NaiveDate;

pub trait TradeStorePort {
    /// Persist a proposal as an OPEN trade; returns the assigned id. Ids are
    /// never reused.
    fn create_trade(
        &mut self,
        new_trade: &NewTrade,
        entry_date: NaiveDate,
    ) -> Result<i64, PaperTraderError>;

    fn get_trade(&self, id: i64) -> Result<Option<Trade>, PaperTraderError>;

    /// Full-row update keyed by `trade.id`.
    fn update_trade(&mut self, trade: &Trade) -> Result<(), PaperTraderError>;

    fn open_trades(&self) -> Result<Vec<Trade>, PaperTraderError>;

    fn trades_by_symbol(&self, symbol: &str) -> Result<Vec<Trade>, PaperTraderError>;

    /// All trades ordered by entry date descending.
    fn all_trades(&self) -> Result<Vec<Trade>, PaperTraderError>;
}

pub trait PortfolioStorePort {
    fn portfolio(&self) -> Result<Portfolio, PaperTraderError>;

    fn update_cash(&mut self, new_cash: f64) -> Result<(), PaperTraderError>;
}

pub trait ScreeningStorePort {
    /// Store a fresh scan, clearing prior unexecuted results first.
    fn store_results(&mut self, results: &[ScreeningResult]) -> Result<(), PaperTraderError>;

    fn unexecuted(&self) -> Result<Vec<ScreeningResult>, PaperTraderError>;

    fn mark_executed(&mut self, id: i64) -> Result<(), PaperTraderError>;
}
