//! CSV file market data adapter.
//!
//! Serves `MarketDataPort` from a directory of `SYMBOL.csv` files with
//! `date,open,high,low,close,volume` rows. Bars are returned most-recent-first
//! regardless of file order. Quotes are derived from the two most recent bars,
//! so "current price" here means the latest cached close.

use crate::domain::bar::{PriceBar, Quote};
use crate::domain::error::PaperTraderError;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvMarketAdapter {
    base_path: PathBuf,
}

impl CsvMarketAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    pub fn list_symbols(&self) -> Result<Vec<String>, PaperTraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| PaperTraderError::Provider {
            symbol: String::new(),
            reason: format!("failed to read directory {}: {}", self.base_path.display(), e),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PaperTraderError::Provider {
                symbol: String::new(),
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn parse_field<T: std::str::FromStr>(
        record: &csv::StringRecord,
        index: usize,
        name: &str,
        symbol: &str,
    ) -> Result<T, PaperTraderError>
    where
        T::Err: std::fmt::Display,
    {
        record
            .get(index)
            .ok_or_else(|| PaperTraderError::Provider {
                symbol: symbol.to_string(),
                reason: format!("missing {name} column"),
            })?
            .trim()
            .parse()
            .map_err(|e| PaperTraderError::Provider {
                symbol: symbol.to_string(),
                reason: format!("invalid {name} value: {e}"),
            })
    }
}

impl MarketDataPort for CsvMarketAdapter {
    fn daily_bars(
        &self,
        symbol: &str,
        _size_hint: usize,
    ) -> Result<Vec<PriceBar>, PaperTraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| PaperTraderError::Provider {
            symbol: symbol.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| PaperTraderError::Provider {
                symbol: symbol.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str =
                record
                    .get(0)
                    .ok_or_else(|| PaperTraderError::Provider {
                        symbol: symbol.to_string(),
                        reason: "missing date column".into(),
                    })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                PaperTraderError::Provider {
                    symbol: symbol.to_string(),
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            bars.push(PriceBar {
                symbol: symbol.to_string(),
                date,
                open: Self::parse_field(&record, 1, "open", symbol)?,
                high: Self::parse_field(&record, 2, "high", symbol)?,
                low: Self::parse_field(&record, 3, "low", symbol)?,
                close: Self::parse_field(&record, 4, "close", symbol)?,
                volume: Self::parse_field(&record, 5, "volume", symbol)?,
            });
        }

        bars.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(bars)
    }

    fn quote(&self, symbol: &str) -> Result<Quote, PaperTraderError> {
        let bars = self.daily_bars(symbol, 2)?;
        let latest = bars.first().ok_or_else(|| PaperTraderError::Provider {
            symbol: symbol.to_string(),
            reason: "no bars available for quote".into(),
        })?;
        let previous_close = bars.get(1).map(|b| b.close).unwrap_or(latest.close);

        let change = latest.close - previous_close;
        let change_percent = if previous_close != 0.0 {
            change / previous_close * 100.0
        } else {
            0.0
        };

        Ok(Quote {
            symbol: symbol.to_string(),
            price: latest.close,
            previous_close,
            open: latest.open,
            high: latest.high,
            low: latest.low,
            volume: latest.volume,
            change,
            change_percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n";

        fs::write(path.join("AAPL.csv"), csv_content).unwrap();
        fs::write(path.join("MSFT.csv"), "date,open,high,low,close,volume\n").unwrap();

        (dir, path)
    }

    #[test]
    fn daily_bars_most_recent_first() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);

        let bars = adapter.daily_bars("AAPL", 50).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        assert_eq!(bars[2].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].close, 115.0);
        assert_eq!(bars[0].volume, 55000);
    }

    #[test]
    fn daily_bars_missing_file_errors() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);

        let result = adapter.daily_bars("XYZ", 50);
        assert!(matches!(result, Err(PaperTraderError::Provider { .. })));
    }

    #[test]
    fn daily_bars_rejects_malformed_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(
            path.join("BAD.csv"),
            "date,open,high,low,close,volume\n2024-01-15,abc,110.0,90.0,105.0,50000\n",
        )
        .unwrap();

        let adapter = CsvMarketAdapter::new(path);
        assert!(adapter.daily_bars("BAD", 10).is_err());
    }

    #[test]
    fn quote_derives_change_from_last_two_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);

        let quote = adapter.quote("AAPL").unwrap();
        assert_eq!(quote.price, 115.0);
        assert_eq!(quote.previous_close, 110.0);
        assert_eq!(quote.change, 5.0);
        assert!((quote.change_percent - 5.0 / 110.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn quote_on_empty_file_errors() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);
        assert!(adapter.quote("MSFT").is_err());
    }

    #[test]
    fn list_symbols_strips_extension() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvMarketAdapter::new(path);
        assert_eq!(adapter.list_symbols().unwrap(), vec!["AAPL", "MSFT"]);
    }
}
