//! In-memory store adapters for pure simulation and tests.

use chrono::NaiveDate;

use crate::domain::error::PaperTraderError;
use crate::domain::portfolio::Portfolio;
use crate::domain::screening::ScreeningResult;
use crate::domain::trade::{NewTrade, Trade, TradeStatus};
use crate::ports::store_port::{PortfolioStorePort, ScreeningStorePort, TradeStorePort};

#[derive(Debug)]
pub struct MemoryTradeStore {
    trades: Vec<Trade>,
    next_id: i64,
}

impl MemoryTradeStore {
    pub fn new() -> Self {
        MemoryTradeStore {
            trades: Vec::new(),
            next_id: 1,
        }
    }
}

impl Default for MemoryTradeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeStorePort for MemoryTradeStore {
    fn create_trade(
        &mut self,
        new_trade: &NewTrade,
        entry_date: NaiveDate,
    ) -> Result<i64, PaperTraderError> {
        let id = self.next_id;
        self.next_id += 1;
        self.trades.push(Trade {
            id,
            symbol: new_trade.symbol.clone(),
            action: new_trade.action,
            quantity: new_trade.quantity,
            entry_price: new_trade.entry_price,
            entry_date,
            stop_loss: new_trade.stop_loss,
            take_profit: new_trade.take_profit,
            status: TradeStatus::Open,
            exit_price: None,
            exit_date: None,
            exit_reason: None,
            pnl: None,
            pnl_percent: None,
            rsi_at_entry: new_trade.rsi_at_entry,
            ma_short_at_entry: new_trade.ma_short_at_entry,
            ma_long_at_entry: new_trade.ma_long_at_entry,
            entry_reason: new_trade.entry_reason.clone(),
            exit_criteria: new_trade.exit_criteria.clone(),
        });
        Ok(id)
    }

    fn get_trade(&self, id: i64) -> Result<Option<Trade>, PaperTraderError> {
        Ok(self.trades.iter().find(|t| t.id == id).cloned())
    }

    fn update_trade(&mut self, trade: &Trade) -> Result<(), PaperTraderError> {
        match self.trades.iter_mut().find(|t| t.id == trade.id) {
            Some(slot) => {
                *slot = trade.clone();
                Ok(())
            }
            None => Err(PaperTraderError::TradeNotFound { id: trade.id }),
        }
    }

    fn open_trades(&self) -> Result<Vec<Trade>, PaperTraderError> {
        Ok(self
            .trades
            .iter()
            .filter(|t| t.is_open())
            .cloned()
            .collect())
    }

    fn trades_by_symbol(&self, symbol: &str) -> Result<Vec<Trade>, PaperTraderError> {
        Ok(self
            .trades
            .iter()
            .filter(|t| t.symbol == symbol)
            .cloned()
            .collect())
    }

    fn all_trades(&self) -> Result<Vec<Trade>, PaperTraderError> {
        let mut trades = self.trades.clone();
        trades.sort_by(|a, b| b.entry_date.cmp(&a.entry_date).then(b.id.cmp(&a.id)));
        Ok(trades)
    }
}

#[derive(Debug)]
pub struct MemoryPortfolioStore {
    portfolio: Portfolio,
}

impl MemoryPortfolioStore {
    pub fn new(initial_cash: f64) -> Self {
        MemoryPortfolioStore {
            portfolio: Portfolio::new(initial_cash),
        }
    }
}

impl PortfolioStorePort for MemoryPortfolioStore {
    fn portfolio(&self) -> Result<Portfolio, PaperTraderError> {
        Ok(self.portfolio.clone())
    }

    fn update_cash(&mut self, new_cash: f64) -> Result<(), PaperTraderError> {
        self.portfolio.cash = new_cash;
        Ok(())
    }
}

#[derive(Debug)]
pub struct MemoryScreeningStore {
    results: Vec<ScreeningResult>,
    next_id: i64,
}

impl MemoryScreeningStore {
    pub fn new() -> Self {
        MemoryScreeningStore {
            results: Vec::new(),
            next_id: 1,
        }
    }
}

impl Default for MemoryScreeningStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreeningStorePort for MemoryScreeningStore {
    fn store_results(&mut self, results: &[ScreeningResult]) -> Result<(), PaperTraderError> {
        self.results.retain(|r| r.executed);
        for result in results {
            let mut stored = result.clone();
            stored.id = self.next_id;
            self.next_id += 1;
            stored.executed = false;
            self.results.push(stored);
        }
        Ok(())
    }

    fn unexecuted(&self) -> Result<Vec<ScreeningResult>, PaperTraderError> {
        Ok(self
            .results
            .iter()
            .filter(|r| !r.executed)
            .cloned()
            .collect())
    }

    fn mark_executed(&mut self, id: i64) -> Result<(), PaperTraderError> {
        match self.results.iter_mut().find(|r| r.id == id) {
            Some(result) => {
                result.executed = true;
                Ok(())
            }
            None => Err(PaperTraderError::Database {
                reason: format!("screening result {id} not found"),
            }),
        }
    }
}
