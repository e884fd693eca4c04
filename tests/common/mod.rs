#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;

use papertrader::domain::bar::{PriceBar, Quote};
use papertrader::domain::error::PaperTraderError;
use papertrader::domain::strategy::StrategyParams;
use papertrader::ports::market_data_port::MarketDataPort;

pub struct MockMarketPort {
    pub bars: HashMap<String, Vec<PriceBar>>,
    pub quotes: HashMap<String, f64>,
    pub errors: HashMap<String, String>,
}

impl MockMarketPort {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            quotes: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    /// Bars are given chronologically and stored most-recent-first; the quote
    /// defaults to the latest close.
    pub fn with_history(mut self, symbol: &str, chronological: Vec<PriceBar>) -> Self {
        if let Some(last) = chronological.last() {
            self.quotes.insert(symbol.to_string(), last.close);
        }
        let mut bars = chronological;
        bars.reverse();
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_quote(mut self, symbol: &str, price: f64) -> Self {
        self.quotes.insert(symbol.to_string(), price);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketPort {
    fn daily_bars(
        &self,
        symbol: &str,
        _size_hint: usize,
    ) -> Result<Vec<PriceBar>, PaperTraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PaperTraderError::Provider {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.bars.get(symbol).cloned().unwrap_or_default())
    }

    fn quote(&self, symbol: &str) -> Result<Quote, PaperTraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PaperTraderError::Provider {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        let price = *self
            .quotes
            .get(symbol)
            .ok_or_else(|| PaperTraderError::Provider {
                symbol: symbol.to_string(),
                reason: "no quote".into(),
            })?;
        Ok(Quote {
            symbol: symbol.to_string(),
            price,
            previous_close: price,
            open: price,
            high: price + 1.0,
            low: price - 1.0,
            volume: 1000,
            change: 0.0,
            change_percent: 0.0,
        })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, day_offset: i64, close: f64) -> PriceBar {
    PriceBar {
        symbol: symbol.to_string(),
        date: date(2024, 1, 1) + chrono::Duration::days(day_offset),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 10_000,
    }
}

/// Chronological bar series from a close sequence.
pub fn history_from_closes(symbol: &str, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(symbol, i as i64, close))
        .collect()
}

/// A rally into a sharp dip: 55 sessions climbing 70 → 120, then eight
/// 3.5-point down days. The dip drags RSI(14) under 30 while the 20-day MA
/// still sits well above the 50-day.
pub fn rally_then_dip() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..55).map(|i| 70.0 + i as f64 * (50.0 / 54.0)).collect();
    for i in 0..8 {
        closes.push(120.0 - 3.5 * (i + 1) as f64);
    }
    closes
}

/// Definite BUY under 2/2/4-period params: early collapse keeps RSI
/// depressed, recent closes hold the short MA above the long MA.
pub fn quick_buy_closes() -> Vec<f64> {
    vec![100.0, 30.0, 44.0, 41.0, 40.0]
}

pub fn short_window_params() -> StrategyParams {
    StrategyParams {
        rsi_period: 2,
        ma_short_period: 2,
        ma_long_period: 4,
        atr_period: 2,
        sr_lookback: 3,
        ..StrategyParams::default()
    }
}
