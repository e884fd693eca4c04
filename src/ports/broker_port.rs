//! Brokerage order placement port trait (optional collaborator).
//!
//! The ledger simulates fills locally when no broker is attached or when a
//! placement call errors; a broker failure never loses the trading decision.

use crate::domain::error::PaperTraderError;
use crate::domain::trade::TradeAction;

#[derive(Debug, Clone)]
pub struct BrokerPosition {
    pub symbol: String,
    pub quantity: i64,
    pub avg_entry_price: f64,
}

#[derive(Debug, Clone)]
pub struct BrokerAccount {
    pub cash: f64,
    pub equity: f64,
    pub buying_power: f64,
}

pub trait BrokerPort {
    /// Entry order bundled with stop-loss and take-profit exits. Returns the
    /// broker's order id.
    fn place_bracket_order(
        &mut self,
        symbol: &str,
        quantity: i64,
        side: TradeAction,
        stop_loss: f64,
        take_profit: f64,
    ) -> Result<String, PaperTraderError>;

    fn positions(&self) -> Result<Vec<BrokerPosition>, PaperTraderError>;

    fn account(&self) -> Result<BrokerAccount, PaperTraderError>;
}
