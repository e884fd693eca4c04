//! SQLite persistence adapter for trades, portfolio, and screening results.
//!
//! The adapter is `Clone` (the pool is shared), so one configured instance
//! can serve the trade store and the portfolio store as two separate values.

use chrono::NaiveDate;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Row, params};

use crate::domain::error::PaperTraderError;
use crate::domain::portfolio::Portfolio;
use crate::domain::screening::ScreeningResult;
use crate::domain::strategy::Signal;
use crate::domain::trade::{NewTrade, Trade, TradeAction, TradeStatus};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::{PortfolioStorePort, ScreeningStorePort, TradeStorePort};

#[derive(Clone)]
pub struct SqliteStoreAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_err(e: r2d2::Error) -> PaperTraderError {
    PaperTraderError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> PaperTraderError {
    PaperTraderError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl SqliteStoreAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PaperTraderError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| PaperTraderError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, PaperTraderError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).map_err(pool_err)?;
        Ok(Self { pool })
    }

    /// Create tables and seed the singleton portfolio row if absent.
    pub fn initialize_schema(&self, initial_cash: f64) -> Result<(), PaperTraderError> {
        let conn = self.pool.get().map_err(pool_err)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS trades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                action TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                entry_price REAL NOT NULL,
                entry_date TEXT NOT NULL,
                stop_loss REAL NOT NULL,
                take_profit REAL NOT NULL,
                status TEXT NOT NULL,
                exit_price REAL,
                exit_date TEXT,
                exit_reason TEXT,
                pnl REAL,
                pnl_percent REAL,
                rsi_at_entry REAL NOT NULL,
                ma_short_at_entry REAL NOT NULL,
                ma_long_at_entry REAL NOT NULL,
                entry_reason TEXT NOT NULL,
                exit_criteria TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trades_symbol ON trades(symbol);
            CREATE INDEX IF NOT EXISTS idx_trades_status ON trades(status);
            CREATE TABLE IF NOT EXISTS portfolio (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                cash REAL NOT NULL,
                initial_cash REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS screening_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                signal TEXT NOT NULL,
                price REAL NOT NULL,
                rsi REAL NOT NULL,
                ma_short REAL NOT NULL,
                ma_long REAL NOT NULL,
                stop_loss REAL NOT NULL,
                take_profit REAL NOT NULL,
                reason TEXT NOT NULL,
                executed INTEGER NOT NULL DEFAULT 0
            );",
        )
        .map_err(query_err)?;

        conn.execute(
            "INSERT OR IGNORE INTO portfolio (id, cash, initial_cash) VALUES (1, ?1, ?2)",
            params![initial_cash, initial_cash],
        )
        .map_err(query_err)?;

        Ok(())
    }
}

fn action_to_str(action: TradeAction) -> &'static str {
    match action {
        TradeAction::Buy => "BUY",
        TradeAction::Sell => "SELL",
    }
}

fn action_from_str(s: &str) -> Result<TradeAction, PaperTraderError> {
    match s {
        "BUY" => Ok(TradeAction::Buy),
        "SELL" => Ok(TradeAction::Sell),
        other => Err(PaperTraderError::DatabaseQuery {
            reason: format!("unknown trade action: {other}"),
        }),
    }
}

fn status_from_str(s: &str) -> Result<TradeStatus, PaperTraderError> {
    match s {
        "OPEN" => Ok(TradeStatus::Open),
        "CLOSED" => Ok(TradeStatus::Closed),
        other => Err(PaperTraderError::DatabaseQuery {
            reason: format!("unknown trade status: {other}"),
        }),
    }
}

fn signal_from_str(s: &str) -> Result<Signal, PaperTraderError> {
    match s {
        "BUY" => Ok(Signal::Buy),
        "SELL" => Ok(Signal::Sell),
        "HOLD" => Ok(Signal::Hold),
        other => Err(PaperTraderError::DatabaseQuery {
            reason: format!("unknown signal: {other}"),
        }),
    }
}

fn date_to_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn date_from_str(s: &str) -> Result<NaiveDate, PaperTraderError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| PaperTraderError::DatabaseQuery {
        reason: format!("invalid stored date: {e}"),
    })
}

fn trade_from_row(row: &Row<'_>) -> rusqlite::Result<(Trade, String, String, Option<String>)> {
    // Enum/date strings come back raw; the caller converts so parse errors
    // surface as domain errors rather than rusqlite panics.
    let trade = Trade {
        id: row.get("id")?,
        symbol: row.get("symbol")?,
        action: TradeAction::Buy,
        quantity: row.get("quantity")?,
        entry_price: row.get("entry_price")?,
        entry_date: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
        stop_loss: row.get("stop_loss")?,
        take_profit: row.get("take_profit")?,
        status: TradeStatus::Open,
        exit_price: row.get("exit_price")?,
        exit_date: None,
        exit_reason: row.get("exit_reason")?,
        pnl: row.get("pnl")?,
        pnl_percent: row.get("pnl_percent")?,
        rsi_at_entry: row.get("rsi_at_entry")?,
        ma_short_at_entry: row.get("ma_short_at_entry")?,
        ma_long_at_entry: row.get("ma_long_at_entry")?,
        entry_reason: row.get("entry_reason")?,
        exit_criteria: row.get("exit_criteria")?,
    };
    let action: String = row.get("action")?;
    let entry_date: String = row.get("entry_date")?;
    let exit_date: Option<String> = row.get("exit_date")?;
    Ok((trade, action, entry_date, exit_date))
}

fn finish_trade(
    (mut trade, action, entry_date, exit_date): (Trade, String, String, Option<String>),
    status: String,
) -> Result<Trade, PaperTraderError> {
    trade.action = action_from_str(&action)?;
    trade.status = status_from_str(&status)?;
    trade.entry_date = date_from_str(&entry_date)?;
    trade.exit_date = exit_date.as_deref().map(date_from_str).transpose()?;
    Ok(trade)
}

const TRADE_COLUMNS: &str = "id, symbol, action, quantity, entry_price, entry_date, stop_loss, \
     take_profit, status, exit_price, exit_date, exit_reason, pnl, pnl_percent, rsi_at_entry, \
     ma_short_at_entry, ma_long_at_entry, entry_reason, exit_criteria";

impl SqliteStoreAdapter {
    fn query_trades(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Trade>, PaperTraderError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let mut stmt = conn.prepare(sql).map_err(query_err)?;

        let rows = stmt
            .query_map(params, |row| {
                let parts = trade_from_row(row)?;
                let status: String = row.get("status")?;
                Ok((parts, status))
            })
            .map_err(query_err)?;

        let mut trades = Vec::new();
        for row in rows {
            let (parts, status) = row.map_err(query_err)?;
            trades.push(finish_trade(parts, status)?);
        }
        Ok(trades)
    }
}

impl TradeStorePort for SqliteStoreAdapter {
    fn create_trade(
        &mut self,
        new_trade: &NewTrade,
        entry_date: NaiveDate,
    ) -> Result<i64, PaperTraderError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.execute(
            "INSERT INTO trades (symbol, action, quantity, entry_price, entry_date, stop_loss, \
             take_profit, status, rsi_at_entry, ma_short_at_entry, ma_long_at_entry, \
             entry_reason, exit_criteria)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'OPEN', ?8, ?9, ?10, ?11, ?12)",
            params![
                new_trade.symbol,
                action_to_str(new_trade.action),
                new_trade.quantity,
                new_trade.entry_price,
                date_to_str(entry_date),
                new_trade.stop_loss,
                new_trade.take_profit,
                new_trade.rsi_at_entry,
                new_trade.ma_short_at_entry,
                new_trade.ma_long_at_entry,
                new_trade.entry_reason,
                new_trade.exit_criteria,
            ],
        )
        .map_err(query_err)?;

        Ok(conn.last_insert_rowid())
    }

    fn get_trade(&self, id: i64) -> Result<Option<Trade>, PaperTraderError> {
        let trades = self.query_trades(
            &format!("SELECT {TRADE_COLUMNS} FROM trades WHERE id = ?1"),
            params![id],
        )?;
        Ok(trades.into_iter().next())
    }

    fn update_trade(&mut self, trade: &Trade) -> Result<(), PaperTraderError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let updated = conn
            .execute(
                "UPDATE trades SET symbol = ?1, action = ?2, quantity = ?3, entry_price = ?4, \
                 entry_date = ?5, stop_loss = ?6, take_profit = ?7, status = ?8, \
                 exit_price = ?9, exit_date = ?10, exit_reason = ?11, pnl = ?12, \
                 pnl_percent = ?13, rsi_at_entry = ?14, ma_short_at_entry = ?15, \
                 ma_long_at_entry = ?16, entry_reason = ?17, exit_criteria = ?18
                 WHERE id = ?19",
                params![
                    trade.symbol,
                    action_to_str(trade.action),
                    trade.quantity,
                    trade.entry_price,
                    date_to_str(trade.entry_date),
                    trade.stop_loss,
                    trade.take_profit,
                    trade.status.to_string(),
                    trade.exit_price,
                    trade.exit_date.map(date_to_str),
                    trade.exit_reason,
                    trade.pnl,
                    trade.pnl_percent,
                    trade.rsi_at_entry,
                    trade.ma_short_at_entry,
                    trade.ma_long_at_entry,
                    trade.entry_reason,
                    trade.exit_criteria,
                    trade.id,
                ],
            )
            .map_err(query_err)?;

        if updated == 0 {
            return Err(PaperTraderError::TradeNotFound { id: trade.id });
        }
        Ok(())
    }

    fn open_trades(&self) -> Result<Vec<Trade>, PaperTraderError> {
        self.query_trades(
            &format!("SELECT {TRADE_COLUMNS} FROM trades WHERE status = 'OPEN' ORDER BY id"),
            params![],
        )
    }

    fn trades_by_symbol(&self, symbol: &str) -> Result<Vec<Trade>, PaperTraderError> {
        self.query_trades(
            &format!(
                "SELECT {TRADE_COLUMNS} FROM trades WHERE symbol = ?1 \
                 ORDER BY entry_date DESC, id DESC"
            ),
            params![symbol],
        )
    }

    fn all_trades(&self) -> Result<Vec<Trade>, PaperTraderError> {
        self.query_trades(
            &format!("SELECT {TRADE_COLUMNS} FROM trades ORDER BY entry_date DESC, id DESC"),
            params![],
        )
    }
}

impl PortfolioStorePort for SqliteStoreAdapter {
    fn portfolio(&self) -> Result<Portfolio, PaperTraderError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.query_row(
            "SELECT cash, initial_cash FROM portfolio WHERE id = 1",
            [],
            |row| {
                Ok(Portfolio {
                    cash: row.get(0)?,
                    initial_cash: row.get(1)?,
                })
            },
        )
        .map_err(query_err)
    }

    fn update_cash(&mut self, new_cash: f64) -> Result<(), PaperTraderError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.execute(
            "UPDATE portfolio SET cash = ?1 WHERE id = 1",
            params![new_cash],
        )
        .map_err(query_err)?;
        Ok(())
    }
}

impl ScreeningStorePort for SqliteStoreAdapter {
    fn store_results(&mut self, results: &[ScreeningResult]) -> Result<(), PaperTraderError> {
        let mut conn = self.pool.get().map_err(pool_err)?;
        let tx = conn.transaction().map_err(query_err)?;

        tx.execute("DELETE FROM screening_results WHERE executed = 0", [])
            .map_err(query_err)?;

        for result in results {
            tx.execute(
                "INSERT INTO screening_results (symbol, signal, price, rsi, ma_short, ma_long, \
                 stop_loss, take_profit, reason, executed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0)",
                params![
                    result.symbol,
                    result.signal.to_string(),
                    result.price,
                    result.rsi,
                    result.ma_short,
                    result.ma_long,
                    result.stop_loss,
                    result.take_profit,
                    result.reason,
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)
    }

    fn unexecuted(&self) -> Result<Vec<ScreeningResult>, PaperTraderError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, symbol, signal, price, rsi, ma_short, ma_long, stop_loss, \
                 take_profit, reason, executed FROM screening_results WHERE executed = 0 \
                 ORDER BY id",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map([], |row| {
                let signal: String = row.get("signal")?;
                Ok((
                    ScreeningResult {
                        id: row.get("id")?,
                        symbol: row.get("symbol")?,
                        signal: Signal::Hold,
                        price: row.get("price")?,
                        rsi: row.get("rsi")?,
                        ma_short: row.get("ma_short")?,
                        ma_long: row.get("ma_long")?,
                        stop_loss: row.get("stop_loss")?,
                        take_profit: row.get("take_profit")?,
                        reason: row.get("reason")?,
                        executed: row.get::<_, i64>("executed")? != 0,
                    },
                    signal,
                ))
            })
            .map_err(query_err)?;

        let mut results = Vec::new();
        for row in rows {
            let (mut result, signal) = row.map_err(query_err)?;
            result.signal = signal_from_str(&signal)?;
            results.push(result);
        }
        Ok(results)
    }

    fn mark_executed(&mut self, id: i64) -> Result<(), PaperTraderError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let updated = conn
            .execute(
                "UPDATE screening_results SET executed = 1 WHERE id = ?1",
                params![id],
            )
            .map_err(query_err)?;
        if updated == 0 {
            return Err(PaperTraderError::Database {
                reason: format!("screening result {id} not found"),
            });
        }
        Ok(())
    }
}
