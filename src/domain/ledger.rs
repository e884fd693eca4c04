//! Trade lifecycle and portfolio ledger.
//!
//! A [`TradeLedger`] borrows its stores mutably, so all cash and trade
//! mutation is serialized through one writer. Trades move Open → Closed
//! exactly once and are never reopened.

use chrono::NaiveDate;

use crate::domain::error::PaperTraderError;
use crate::domain::portfolio::PortfolioStats;
use crate::domain::strategy::{StrategyParams, check_exit, compute_snapshot};
use crate::domain::trade::{NewTrade, Trade, TradeAction, TradeStatus};
use crate::ports::broker_port::BrokerPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::store_port::{PortfolioStorePort, TradeStorePort};

pub struct TradeLedger<'a> {
    trades: &'a mut dyn TradeStorePort,
    portfolio: &'a mut dyn PortfolioStorePort,
    broker: Option<&'a mut dyn BrokerPort>,
}

/// Per-trade result of one monitoring pass.
#[derive(Debug, Clone)]
pub struct MonitorOutcome {
    pub trade_id: i64,
    pub symbol: String,
    pub closed: bool,
    pub reason: Option<String>,
    pub error: Option<String>,
}

impl<'a> TradeLedger<'a> {
    pub fn new(
        trades: &'a mut dyn TradeStorePort,
        portfolio: &'a mut dyn PortfolioStorePort,
    ) -> Self {
        TradeLedger {
            trades,
            portfolio,
            broker: None,
        }
    }

    pub fn with_broker(
        trades: &'a mut dyn TradeStorePort,
        portfolio: &'a mut dyn PortfolioStorePort,
        broker: &'a mut dyn BrokerPort,
    ) -> Self {
        TradeLedger {
            trades,
            portfolio,
            broker: Some(broker),
        }
    }

    /// Open a trade from a proposal.
    ///
    /// A BUY whose cost exceeds cash is rejected atomically: nothing is
    /// persisted and cash is untouched. A SELL (short) entry does not move
    /// cash — shorts are margin-free in this ledger. When a broker is
    /// attached the bracket order is attempted first; any broker error falls
    /// through to local simulation so the decision is never lost.
    pub fn execute_trade(
        &mut self,
        proposal: NewTrade,
        date: NaiveDate,
    ) -> Result<i64, PaperTraderError> {
        let portfolio = self.portfolio.portfolio()?;
        let cost = proposal.entry_price * proposal.quantity as f64;

        if proposal.action == TradeAction::Buy && cost > portfolio.cash {
            return Err(PaperTraderError::InsufficientFunds {
                required: cost,
                available: portfolio.cash,
            });
        }

        if let Some(broker) = self.broker.as_deref_mut() {
            match broker.place_bracket_order(
                &proposal.symbol,
                proposal.quantity,
                proposal.action,
                proposal.stop_loss,
                proposal.take_profit,
            ) {
                Ok(order_id) => {
                    eprintln!("Placed bracket order {order_id} for {}", proposal.symbol);
                }
                Err(e) => {
                    eprintln!(
                        "Warning: broker rejected {} order ({e}); simulating locally",
                        proposal.symbol
                    );
                }
            }
        }

        let id = self.trades.create_trade(&proposal, date)?;

        if proposal.action == TradeAction::Buy {
            self.portfolio.update_cash(portfolio.cash - cost)?;
        }

        Ok(id)
    }

    /// Close a trade at the current quoted price.
    ///
    /// Unknown ids fail with `TradeNotFound`. Closing an already-closed trade
    /// is a no-op that returns the stored trade unchanged.
    pub fn close_trade(
        &mut self,
        id: i64,
        market: &dyn MarketDataPort,
        date: NaiveDate,
    ) -> Result<Trade, PaperTraderError> {
        let trade = self
            .trades
            .get_trade(id)?
            .ok_or(PaperTraderError::TradeNotFound { id })?;

        if !trade.is_open() {
            return Ok(trade);
        }

        let quote = market.quote(&trade.symbol)?;
        self.close_at_price(trade, quote.price, "manual close", date)
    }

    fn close_at_price(
        &mut self,
        mut trade: Trade,
        exit_price: f64,
        reason: &str,
        date: NaiveDate,
    ) -> Result<Trade, PaperTraderError> {
        trade.pnl = Some(trade.realized_pnl(exit_price));
        trade.pnl_percent = Some(trade.pnl_percent_at(exit_price));
        trade.status = TradeStatus::Closed;
        trade.exit_price = Some(exit_price);
        trade.exit_date = Some(date);
        trade.exit_reason = Some(reason.to_string());
        self.trades.update_trade(&trade)?;

        let portfolio = self.portfolio.portfolio()?;
        let proceeds = exit_price * trade.quantity as f64;
        let new_cash = match trade.action {
            TradeAction::Buy => portfolio.cash + proceeds,
            // Buy-to-cover cost; entry never credited cash.
            TradeAction::Sell => portfolio.cash - proceeds,
        };
        self.portfolio.update_cash(new_cash)?;

        Ok(trade)
    }

    /// Evaluate exit conditions for every open trade, closing those that
    /// fire. One trade's data failure never halts monitoring of the rest.
    pub fn monitor_positions(
        &mut self,
        market: &dyn MarketDataPort,
        params: &StrategyParams,
        date: NaiveDate,
    ) -> Result<Vec<MonitorOutcome>, PaperTraderError> {
        let open = self.trades.open_trades()?;
        let mut outcomes = Vec::with_capacity(open.len());

        for trade in open {
            match self.monitor_one(&trade, market, params, date) {
                Ok(Some(reason)) => outcomes.push(MonitorOutcome {
                    trade_id: trade.id,
                    symbol: trade.symbol.clone(),
                    closed: true,
                    reason: Some(reason),
                    error: None,
                }),
                Ok(None) => outcomes.push(MonitorOutcome {
                    trade_id: trade.id,
                    symbol: trade.symbol.clone(),
                    closed: false,
                    reason: None,
                    error: None,
                }),
                Err(e) => {
                    eprintln!("Warning: could not monitor {} ({e})", trade.symbol);
                    outcomes.push(MonitorOutcome {
                        trade_id: trade.id,
                        symbol: trade.symbol.clone(),
                        closed: false,
                        reason: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(outcomes)
    }

    fn monitor_one(
        &mut self,
        trade: &Trade,
        market: &dyn MarketDataPort,
        params: &StrategyParams,
        date: NaiveDate,
    ) -> Result<Option<String>, PaperTraderError> {
        let bars = market.daily_bars(&trade.symbol, params.min_bars())?;
        let snapshot = compute_snapshot(&bars, params)?;
        let quote = market.quote(&trade.symbol)?;

        match check_exit(trade, quote.price, &snapshot, params) {
            Some(reason) => {
                let label = reason.to_string();
                self.close_at_price(trade.clone(), quote.price, &label, date)?;
                Ok(Some(label))
            }
            None => Ok(None),
        }
    }

    pub fn available_cash(&self) -> Result<f64, PaperTraderError> {
        Ok(self.portfolio.portfolio()?.cash)
    }

    /// At most one OPEN trade per symbol; the screening/execution path checks
    /// here before sizing a new entry.
    pub fn has_open_position(&self, symbol: &str) -> Result<bool, PaperTraderError> {
        Ok(self
            .trades
            .trades_by_symbol(symbol)?
            .iter()
            .any(|t| t.is_open()))
    }

    /// Derived portfolio statistics. Pure read, no side effects.
    pub fn stats(&self) -> Result<PortfolioStats, PaperTraderError> {
        let portfolio = self.portfolio.portfolio()?;
        let trades = self.trades.all_trades()?;

        let mut invested_capital = 0.0;
        let mut open_trades = 0usize;
        let mut closed_trades = 0usize;
        let mut total_pnl = 0.0;
        let mut winners = 0usize;
        let mut losers = 0usize;
        let mut total_wins = 0.0;
        let mut total_losses = 0.0;

        for trade in &trades {
            if trade.is_open() {
                open_trades += 1;
                if trade.action == TradeAction::Buy {
                    invested_capital += trade.entry_cost();
                }
            } else {
                closed_trades += 1;
                let pnl = trade.pnl.unwrap_or(0.0);
                total_pnl += pnl;
                if pnl > 0.0 {
                    winners += 1;
                    total_wins += pnl;
                } else if pnl < 0.0 {
                    losers += 1;
                    total_losses += pnl.abs();
                }
            }
        }

        let total_value = portfolio.cash + invested_capital;
        let total_return_pct = if portfolio.initial_cash > 0.0 {
            (total_value - portfolio.initial_cash) / portfolio.initial_cash * 100.0
        } else {
            0.0
        };
        let win_rate = if closed_trades > 0 {
            winners as f64 / closed_trades as f64 * 100.0
        } else {
            0.0
        };
        let avg_win = if winners > 0 {
            total_wins / winners as f64
        } else {
            0.0
        };
        let avg_loss = if losers > 0 {
            total_losses / losers as f64
        } else {
            0.0
        };

        Ok(PortfolioStats {
            cash: portfolio.cash,
            initial_cash: portfolio.initial_cash,
            invested_capital,
            total_value,
            total_return_pct,
            total_trades: trades.len(),
            open_trades,
            closed_trades,
            total_pnl,
            win_rate,
            avg_win,
            avg_loss,
        })
    }
}
