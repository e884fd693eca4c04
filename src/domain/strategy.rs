//! Strategy decision logic.
//!
//! Combines the indicator engine into a BUY/SELL/HOLD signal, derives
//! stop-loss/take-profit targets, sizes positions against account risk, and
//! evaluates exit conditions for open trades.

use std::fmt;

use crate::domain::bar::PriceBar;
use crate::domain::error::PaperTraderError;
use crate::domain::indicator::{calculate_atr, calculate_rsi, calculate_sma, support_resistance};
use crate::domain::trade::{NewTrade, Trade, TradeAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// The trade action this signal maps to; `None` for HOLD.
    pub fn action(self) -> Option<TradeAction> {
        match self {
            Signal::Buy => Some(TradeAction::Buy),
            Signal::Sell => Some(TradeAction::Sell),
            Signal::Hold => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StrategyParams {
    pub rsi_period: usize,
    pub ma_short_period: usize,
    pub ma_long_period: usize,
    pub atr_period: usize,
    pub sr_lookback: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub risk_fraction: f64,
    pub max_position_fraction: f64,
    pub reward_risk_ratio: f64,
}

impl StrategyParams {
    /// Bars needed to compute every indicator in the snapshot.
    pub fn min_bars(&self) -> usize {
        (self.rsi_period + 1)
            .max(self.ma_short_period)
            .max(self.ma_long_period)
            .max(self.atr_period + 1)
            .max(self.sr_lookback)
    }
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            rsi_period: 14,
            ma_short_period: 20,
            ma_long_period: 50,
            atr_period: 14,
            sr_lookback: 20,
            oversold: 30.0,
            overbought: 70.0,
            risk_fraction: 0.02,
            max_position_fraction: 0.10,
            reward_risk_ratio: 3.0,
        }
    }
}

/// Indicator readings behind one analysis pass. Ephemeral; only the scalar
/// fields feeding a trade are persisted, alongside that trade.
#[derive(Debug, Clone)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub ma_short: f64,
    pub ma_long: f64,
    pub atr: f64,
    pub support: f64,
    pub resistance: f64,
    pub signal: Signal,
}

/// Oscillator extremity alone is noise; the signal additionally requires the
/// short MA on the matching side of the long MA.
pub fn signal_for(rsi: f64, ma_short: f64, ma_long: f64, params: &StrategyParams) -> Signal {
    if rsi < params.oversold && ma_short > ma_long {
        Signal::Buy
    } else if rsi > params.overbought && ma_short < ma_long {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

pub fn compute_snapshot(
    bars: &[PriceBar],
    params: &StrategyParams,
) -> Result<IndicatorSnapshot, PaperTraderError> {
    let rsi = calculate_rsi(bars, params.rsi_period)?;
    let ma_short = calculate_sma(bars, params.ma_short_period)?;
    let ma_long = calculate_sma(bars, params.ma_long_period)?;
    let atr = calculate_atr(bars, params.atr_period)?;
    let levels = support_resistance(bars, params.sr_lookback)?;

    Ok(IndicatorSnapshot {
        rsi,
        ma_short,
        ma_long,
        atr,
        support: levels.support,
        resistance: levels.resistance,
        signal: signal_for(rsi, ma_short, ma_long, params),
    })
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub symbol: String,
    pub should_trade: bool,
    pub action: Option<TradeAction>,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub snapshot: IndicatorSnapshot,
    pub reason: String,
}

impl AnalysisResult {
    /// Turn a tradeable analysis into a store-ready proposal.
    pub fn to_new_trade(&self, quantity: i64) -> Option<NewTrade> {
        let action = self.action?;
        Some(NewTrade {
            symbol: self.symbol.clone(),
            action,
            quantity,
            entry_price: self.entry_price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            rsi_at_entry: self.snapshot.rsi,
            ma_short_at_entry: self.snapshot.ma_short,
            ma_long_at_entry: self.snapshot.ma_long,
            entry_reason: self.reason.clone(),
            exit_criteria: format!(
                "stop {:.2}, target {:.2}, or signal reversal",
                self.stop_loss, self.take_profit
            ),
        })
    }
}

/// Analyze one symbol's bars into a trade decision.
///
/// Entry is the most recent close. Stops anchor to volatility (2×ATR) but
/// never beyond the recent support/resistance level (±2%); the target is a
/// fixed reward:risk multiple of the stop distance.
pub fn analyze(
    symbol: &str,
    bars: &[PriceBar],
    params: &StrategyParams,
) -> Result<AnalysisResult, PaperTraderError> {
    let snapshot = compute_snapshot(bars, params)?;
    let entry_price = bars[0].close;

    let (should_trade, action, stop_loss, take_profit, reason) = match snapshot.signal {
        Signal::Buy => {
            let stop = (entry_price - 2.0 * snapshot.atr).max(snapshot.support * 0.98);
            let risk = entry_price - stop;
            let take = entry_price + params.reward_risk_ratio * risk;
            let reason = format!(
                "RSI {:.1} below {:.0} with {}-day MA {:.2} above {}-day MA {:.2}",
                snapshot.rsi,
                params.oversold,
                params.ma_short_period,
                snapshot.ma_short,
                params.ma_long_period,
                snapshot.ma_long,
            );
            (true, Some(TradeAction::Buy), stop, take, reason)
        }
        Signal::Sell => {
            let stop = (entry_price + 2.0 * snapshot.atr).min(snapshot.resistance * 1.02);
            let risk = stop - entry_price;
            let take = entry_price - params.reward_risk_ratio * risk;
            let reason = format!(
                "RSI {:.1} above {:.0} with {}-day MA {:.2} below {}-day MA {:.2}",
                snapshot.rsi,
                params.overbought,
                params.ma_short_period,
                snapshot.ma_short,
                params.ma_long_period,
                snapshot.ma_long,
            );
            (true, Some(TradeAction::Sell), stop, take, reason)
        }
        Signal::Hold => {
            let reason = format!(
                "no edge: RSI {:.1}, {}-day MA {:.2} vs {}-day MA {:.2}",
                snapshot.rsi,
                params.ma_short_period,
                snapshot.ma_short,
                params.ma_long_period,
                snapshot.ma_long,
            );
            (false, None, 0.0, 0.0, reason)
        }
    };

    Ok(AnalysisResult {
        symbol: symbol.to_string(),
        should_trade,
        action,
        entry_price,
        stop_loss,
        take_profit,
        snapshot,
        reason,
    })
}

/// Whole-share position size from account risk and stop distance.
///
/// Caps the risk budget (cash × risk_fraction) by risk-per-share, then caps
/// the notional at max_position_fraction of the account. Zero is a valid
/// outcome meaning "skip the trade".
pub fn position_size(
    cash: f64,
    entry_price: f64,
    stop_loss: f64,
    risk_fraction: f64,
    max_position_fraction: f64,
) -> i64 {
    let risk_per_share = (entry_price - stop_loss).abs();
    if risk_per_share == 0.0 || entry_price <= 0.0 {
        return 0;
    }

    let risk_amount = cash * risk_fraction;
    let shares_by_risk = (risk_amount / risk_per_share).floor() as i64;
    let shares_by_cap = (cash * max_position_fraction / entry_price).floor() as i64;

    shares_by_risk.min(shares_by_cap)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    SignalReversal,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop loss"),
            ExitReason::TakeProfit => write!(f, "take profit"),
            ExitReason::SignalReversal => write!(f, "signal reversal"),
        }
    }
}

/// Evaluate exit conditions in fixed priority order: stop-loss, take-profit,
/// then signal reversal. A single tick can satisfy several at once; the first
/// match wins so the reported reason is the most capital-protective one.
pub fn check_exit(
    trade: &Trade,
    current_price: f64,
    snapshot: &IndicatorSnapshot,
    params: &StrategyParams,
) -> Option<ExitReason> {
    if trade.breaches_stop_loss(current_price) {
        return Some(ExitReason::StopLoss);
    }
    if trade.breaches_take_profit(current_price) {
        return Some(ExitReason::TakeProfit);
    }

    let reversed = match trade.action {
        TradeAction::Buy => {
            snapshot.rsi > params.overbought || snapshot.signal == Signal::Sell
        }
        TradeAction::Sell => snapshot.rsi < params.oversold || snapshot.signal == Signal::Buy,
    };
    if reversed {
        return Some(ExitReason::SignalReversal);
    }

    None
}
