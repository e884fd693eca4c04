//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_market_adapter::CsvMarketAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_store_adapter::{
    MemoryPortfolioStore, MemoryScreeningStore, MemoryTradeStore,
};
#[cfg(feature = "sqlite")]
use crate::adapters::sqlite_store_adapter::SqliteStoreAdapter;
use crate::domain::config_validation::{
    criteria_from_config, initial_cash_from_config, parse_symbols, strategy_params_from_config,
    symbols_from_config, validate_config,
};
use crate::domain::cycle::{CycleReport, run_cycle};
use crate::domain::error::PaperTraderError;
use crate::domain::ledger::TradeLedger;
use crate::domain::strategy::analyze;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::{PortfolioStorePort, ScreeningStorePort, TradeStorePort};

#[derive(Parser, Debug)]
#[command(name = "papertrader", about = "Simulated stock-trading assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a single symbol and print the decision
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// Screen the watchlist without trading
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Run one full cycle: monitor open positions, then screen and trade
    Cycle {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Evaluate exit conditions for open positions
    Monitor {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List recorded trades
    Trades {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Close one open trade at the current price
    Close {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        id: i64,
    },
    /// Print portfolio statistics
    Portfolio {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze { config, symbol } => run_analyze(&config, &symbol),
        Command::Screen { config, symbols } => run_screen(&config, symbols.as_deref()),
        Command::Cycle { config, symbols } => run_cycle_cmd(&config, symbols.as_deref()),
        Command::Monitor { config } => run_monitor(&config),
        Command::Trades { config } => run_trades(&config),
        Command::Close { config, id } => run_close(&config, id),
        Command::Portfolio { config } => run_portfolio(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PaperTraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn load_validated_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    let config = load_config(path)?;
    if let Err(e) = validate_config(&config) {
        eprintln!("error: {e}");
        return Err(ExitCode::from(&e));
    }
    Ok(config)
}

fn market_from_config(config: &dyn ConfigPort) -> Result<CsvMarketAdapter, PaperTraderError> {
    let csv_dir =
        config
            .get_string("data", "csv_dir")
            .ok_or_else(|| PaperTraderError::ConfigMissing {
                section: "data".into(),
                key: "csv_dir".into(),
            })?;
    Ok(CsvMarketAdapter::new(PathBuf::from(csv_dir)))
}

fn resolve_symbols(
    config: &dyn ConfigPort,
    override_list: Option<&str>,
) -> Result<Vec<String>, PaperTraderError> {
    match override_list {
        Some(list) => parse_symbols(list),
        None => symbols_from_config(config),
    }
}

struct Stores {
    trades: Box<dyn TradeStorePort>,
    portfolio: Box<dyn PortfolioStorePort>,
    screening: Box<dyn ScreeningStorePort>,
}

/// SQLite-backed stores when `[sqlite] path` is configured, otherwise an
/// ephemeral in-memory simulation.
fn open_stores(config: &dyn ConfigPort) -> Result<Stores, PaperTraderError> {
    #[cfg(feature = "sqlite")]
    if config.get_string("sqlite", "path").is_some() {
        let adapter = SqliteStoreAdapter::from_config(config)?;
        adapter.initialize_schema(initial_cash_from_config(config))?;
        return Ok(Stores {
            trades: Box::new(adapter.clone()),
            portfolio: Box::new(adapter.clone()),
            screening: Box::new(adapter),
        });
    }

    Ok(Stores {
        trades: Box::new(MemoryTradeStore::new()),
        portfolio: Box::new(MemoryPortfolioStore::new(initial_cash_from_config(config))),
        screening: Box::new(MemoryScreeningStore::new()),
    })
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

fn fail(e: &PaperTraderError) -> ExitCode {
    eprintln!("error: {e}");
    ExitCode::from(e)
}

fn run_analyze(config_path: &PathBuf, symbol: &str) -> ExitCode {
    let config = match load_validated_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let params = strategy_params_from_config(&config);
    let market = match market_from_config(&config) {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };

    use crate::ports::market_data_port::MarketDataPort;
    let analysis = market
        .daily_bars(symbol, params.min_bars())
        .and_then(|bars| analyze(symbol, &bars, &params));

    match analysis {
        Ok(analysis) => {
            println!("{}: {}", analysis.symbol, analysis.snapshot.signal);
            println!("  price      {:.2}", analysis.entry_price);
            println!("  rsi        {:.1}", analysis.snapshot.rsi);
            println!(
                "  ma         {:.2} / {:.2}",
                analysis.snapshot.ma_short, analysis.snapshot.ma_long
            );
            println!("  atr        {:.2}", analysis.snapshot.atr);
            println!(
                "  levels     {:.2} / {:.2}",
                analysis.snapshot.support, analysis.snapshot.resistance
            );
            if analysis.should_trade {
                println!("  stop       {:.2}", analysis.stop_loss);
                println!("  target     {:.2}", analysis.take_profit);
            }
            println!("  reason     {}", analysis.reason);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_screen(config_path: &PathBuf, symbols_override: Option<&str>) -> ExitCode {
    let config = match load_validated_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let params = strategy_params_from_config(&config);
    let criteria = criteria_from_config(&config);
    let market = match market_from_config(&config) {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };
    let symbols = match resolve_symbols(&config, symbols_override) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    eprintln!("Screening {} symbols", symbols.len());
    let report = crate::domain::screening::screen_symbols(&market, &symbols, &params, &criteria);

    for result in &report.results {
        println!(
            "{:<8} {:<4} price {:>8.2}  rsi {:>5.1}  stop {:>8.2}  target {:>8.2}  {}",
            result.symbol,
            result.signal.to_string(),
            result.price,
            result.rsi,
            result.stop_loss,
            result.take_profit,
            result.reason,
        );
    }
    println!(
        "screened {} symbols: {} candidates, {} skipped",
        report.processed,
        report.results.len(),
        report.skipped.len()
    );
    ExitCode::SUCCESS
}

fn run_cycle_cmd(config_path: &PathBuf, symbols_override: Option<&str>) -> ExitCode {
    with_trading_context(config_path, symbols_override, |ledger, market, screening, symbols, params, criteria| {
        run_cycle(ledger, market, screening, symbols, params, criteria, today())
    })
}

fn with_trading_context<F>(
    config_path: &PathBuf,
    symbols_override: Option<&str>,
    f: F,
) -> ExitCode
where
    F: FnOnce(
        &mut TradeLedger<'_>,
        &CsvMarketAdapter,
        &mut dyn ScreeningStorePort,
        &[String],
        &crate::domain::strategy::StrategyParams,
        &crate::domain::screening::ScreeningCriteria,
    ) -> Result<CycleReport, PaperTraderError>,
{
    let config = match load_validated_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let params = strategy_params_from_config(&config);
    let criteria = criteria_from_config(&config);
    let market = match market_from_config(&config) {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };
    let symbols = match resolve_symbols(&config, symbols_override) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let mut stores = match open_stores(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let mut ledger = TradeLedger::new(&mut *stores.trades, &mut *stores.portfolio);
    match f(
        &mut ledger,
        &market,
        &mut *stores.screening,
        &symbols,
        &params,
        &criteria,
    ) {
        Ok(report) => {
            print_cycle_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn print_cycle_report(report: &CycleReport) {
    for outcome in &report.monitor {
        match (&outcome.reason, &outcome.error) {
            (Some(reason), _) => {
                println!("closed #{} {} ({})", outcome.trade_id, outcome.symbol, reason)
            }
            (None, Some(error)) => {
                println!("error  #{} {} ({})", outcome.trade_id, outcome.symbol, error)
            }
            (None, None) => println!("held   #{} {}", outcome.trade_id, outcome.symbol),
        }
    }
    for outcome in &report.outcomes {
        let status = if outcome.trade_created {
            "traded"
        } else if outcome.error.is_some() {
            "failed"
        } else {
            "skipped"
        };
        let action = outcome
            .action
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        let rsi = outcome
            .rsi
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:<7} {:<4} rsi {:>5}  {}",
            outcome.symbol,
            status,
            action,
            rsi,
            outcome.error.as_deref().unwrap_or(&outcome.reason),
        );
    }
    println!(
        "processed {} symbols: {} trades created, {} failed, {} positions closed",
        report.processed,
        report.trades_created(),
        report.failed(),
        report.positions_closed()
    );
}

fn run_monitor(config_path: &PathBuf) -> ExitCode {
    let config = match load_validated_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let params = strategy_params_from_config(&config);
    let market = match market_from_config(&config) {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };
    let mut stores = match open_stores(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let mut ledger = TradeLedger::new(&mut *stores.trades, &mut *stores.portfolio);
    match ledger.monitor_positions(&market, &params, today()) {
        Ok(outcomes) => {
            let closed = outcomes.iter().filter(|o| o.closed).count();
            for outcome in &outcomes {
                match (&outcome.reason, &outcome.error) {
                    (Some(reason), _) => {
                        println!("closed #{} {} ({})", outcome.trade_id, outcome.symbol, reason)
                    }
                    (None, Some(error)) => {
                        println!("error  #{} {} ({})", outcome.trade_id, outcome.symbol, error)
                    }
                    (None, None) => println!("held   #{} {}", outcome.trade_id, outcome.symbol),
                }
            }
            println!("monitored {} positions, closed {}", outcomes.len(), closed);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_trades(config_path: &PathBuf) -> ExitCode {
    let config = match load_validated_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let stores = match open_stores(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    match stores.trades.all_trades() {
        Ok(trades) => {
            for trade in &trades {
                let exit = match (trade.exit_price, trade.pnl) {
                    (Some(price), Some(pnl)) => format!("exit {price:.2} pnl {pnl:+.2}"),
                    _ => "open".to_string(),
                };
                println!(
                    "#{:<4} {:<8} {:<4} {:>6} @ {:>8.2} on {}  [{}]  {}",
                    trade.id,
                    trade.symbol,
                    trade.action.to_string(),
                    trade.quantity,
                    trade.entry_price,
                    trade.entry_date,
                    trade.status,
                    exit,
                );
            }
            println!("{} trades", trades.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_close(config_path: &PathBuf, id: i64) -> ExitCode {
    let config = match load_validated_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let market = match market_from_config(&config) {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };
    let mut stores = match open_stores(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let mut ledger = TradeLedger::new(&mut *stores.trades, &mut *stores.portfolio);
    match ledger.close_trade(id, &market, today()) {
        Ok(trade) => {
            match (trade.exit_price, trade.pnl, trade.pnl_percent) {
                (Some(price), Some(pnl), Some(pct)) => println!(
                    "closed #{} {} at {:.2}: pnl {:+.2} ({:+.2}%)",
                    trade.id, trade.symbol, price, pnl, pct
                ),
                _ => println!("trade #{} already closed", trade.id),
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_portfolio(config_path: &PathBuf) -> ExitCode {
    let config = match load_validated_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let mut stores = match open_stores(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let ledger = TradeLedger::new(&mut *stores.trades, &mut *stores.portfolio);
    match ledger.stats() {
        Ok(stats) => {
            println!("cash             {:>12.2}", stats.cash);
            println!("invested         {:>12.2}", stats.invested_capital);
            println!("total value      {:>12.2}", stats.total_value);
            println!("total return     {:>11.2}%", stats.total_return_pct);
            println!(
                "trades           {:>5} total / {} open / {} closed",
                stats.total_trades, stats.open_trades, stats.closed_trades
            );
            println!("total pnl        {:>+12.2}", stats.total_pnl);
            println!("win rate         {:>11.2}%", stats.win_rate);
            println!("avg win / loss   {:>9.2} / {:.2}", stats.avg_win, stats.avg_loss);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    match validate_config(&config) {
        Ok(()) => {
            println!("config OK");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
