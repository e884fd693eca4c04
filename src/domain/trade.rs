//! Trade entity and its Open → Closed lifecycle.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub fn opposite(self) -> Self {
        match self {
            TradeAction::Buy => TradeAction::Sell,
            TradeAction::Sell => TradeAction::Buy,
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Open,
    Closed,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatus::Open => write!(f, "OPEN"),
            TradeStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

/// A proposed trade, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewTrade {
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: i64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub rsi_at_entry: f64,
    pub ma_short_at_entry: f64,
    pub ma_long_at_entry: f64,
    pub entry_reason: String,
    pub exit_criteria: String,
}

#[derive(Debug, Clone)]
pub struct Trade {
    pub id: i64,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: i64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub status: TradeStatus,
    pub exit_price: Option<f64>,
    pub exit_date: Option<NaiveDate>,
    pub exit_reason: Option<String>,
    pub pnl: Option<f64>,
    pub pnl_percent: Option<f64>,
    pub rsi_at_entry: f64,
    pub ma_short_at_entry: f64,
    pub ma_long_at_entry: f64,
    pub entry_reason: String,
    pub exit_criteria: String,
}

impl Trade {
    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    /// Entry notional: entry_price × quantity.
    pub fn entry_cost(&self) -> f64 {
        self.entry_price * self.quantity as f64
    }

    /// Realized PnL at `exit_price`. Sign inverts for a short.
    pub fn realized_pnl(&self, exit_price: f64) -> f64 {
        match self.action {
            TradeAction::Buy => (exit_price - self.entry_price) * self.quantity as f64,
            TradeAction::Sell => (self.entry_price - exit_price) * self.quantity as f64,
        }
    }

    /// Percent move from entry. Does NOT invert for a short — upstream
    /// behavior, kept intact.
    pub fn pnl_percent_at(&self, exit_price: f64) -> f64 {
        (exit_price - self.entry_price) / self.entry_price * 100.0
    }

    pub fn breaches_stop_loss(&self, price: f64) -> bool {
        match self.action {
            TradeAction::Buy => price <= self.stop_loss,
            TradeAction::Sell => price >= self.stop_loss,
        }
    }

    pub fn breaches_take_profit(&self, price: f64) -> bool {
        match self.action {
            TradeAction::Buy => price >= self.take_profit,
            TradeAction::Sell => price <= self.take_profit,
        }
    }
}
