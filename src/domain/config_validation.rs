//! Configuration validation and typed loading.
//!
//! All config fields are validated before any cycle runs, so a bad value
//! surfaces as a config error up front instead of a mid-batch surprise.

use std::collections::HashSet;

use crate::domain::error::PaperTraderError;
use crate::domain::screening::ScreeningCriteria;
use crate::domain::strategy::StrategyParams;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), PaperTraderError> {
    validate_initial_cash(config)?;
    validate_strategy(config)?;
    validate_screening(config)?;
    Ok(())
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), PaperTraderError> {
    let value = config.get_double("paper", "initial_cash", DEFAULT_INITIAL_CASH);
    if value <= 0.0 {
        return Err(PaperTraderError::ConfigInvalid {
            section: "paper".to_string(),
            key: "initial_cash".to_string(),
            reason: "initial_cash must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), PaperTraderError> {
    let defaults = StrategyParams::default();

    for (key, default) in [
        ("rsi_period", defaults.rsi_period),
        ("ma_short_period", defaults.ma_short_period),
        ("ma_long_period", defaults.ma_long_period),
        ("atr_period", defaults.atr_period),
        ("sr_lookback", defaults.sr_lookback),
    ] {
        let value = config.get_int("strategy", key, default as i64);
        if value < 1 {
            return Err(PaperTraderError::ConfigInvalid {
                section: "strategy".to_string(),
                key: key.to_string(),
                reason: format!("{key} must be at least 1"),
            });
        }
    }

    let oversold = config.get_double("strategy", "oversold", defaults.oversold);
    let overbought = config.get_double("strategy", "overbought", defaults.overbought);
    if !(0.0..=100.0).contains(&oversold) || !(0.0..=100.0).contains(&overbought) {
        return Err(PaperTraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "oversold".to_string(),
            reason: "RSI thresholds must be between 0 and 100".to_string(),
        });
    }
    if oversold >= overbought {
        return Err(PaperTraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "oversold".to_string(),
            reason: "oversold must be below overbought".to_string(),
        });
    }

    for (key, default) in [
        ("risk_fraction", defaults.risk_fraction),
        ("max_position_fraction", defaults.max_position_fraction),
    ] {
        let value = config.get_double("strategy", key, default);
        if value <= 0.0 || value > 1.0 {
            return Err(PaperTraderError::ConfigInvalid {
                section: "strategy".to_string(),
                key: key.to_string(),
                reason: format!("{key} must be in (0, 1]"),
            });
        }
    }

    let ratio = config.get_double("strategy", "reward_risk_ratio", defaults.reward_risk_ratio);
    if ratio <= 0.0 {
        return Err(PaperTraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "reward_risk_ratio".to_string(),
            reason: "reward_risk_ratio must be positive".to_string(),
        });
    }

    Ok(())
}

fn validate_screening(config: &dyn ConfigPort) -> Result<(), PaperTraderError> {
    let min_price = optional_double(config, "screening", "min_price");
    let max_price = optional_double(config, "screening", "max_price");
    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            return Err(PaperTraderError::ConfigInvalid {
                section: "screening".to_string(),
                key: "min_price".to_string(),
                reason: "min_price must not exceed max_price".to_string(),
            });
        }
    }

    for key in ["rsi_min", "rsi_max"] {
        if let Some(value) = optional_double(config, "screening", key) {
            if !(0.0..=100.0).contains(&value) {
                return Err(PaperTraderError::ConfigInvalid {
                    section: "screening".to_string(),
                    key: key.to_string(),
                    reason: format!("{key} must be between 0 and 100"),
                });
            }
        }
    }

    Ok(())
}

pub fn strategy_params_from_config(config: &dyn ConfigPort) -> StrategyParams {
    let defaults = StrategyParams::default();
    StrategyParams {
        rsi_period: config.get_int("strategy", "rsi_period", defaults.rsi_period as i64) as usize,
        ma_short_period: config.get_int(
            "strategy",
            "ma_short_period",
            defaults.ma_short_period as i64,
        ) as usize,
        ma_long_period: config.get_int(
            "strategy",
            "ma_long_period",
            defaults.ma_long_period as i64,
        ) as usize,
        atr_period: config.get_int("strategy", "atr_period", defaults.atr_period as i64) as usize,
        sr_lookback: config.get_int("strategy", "sr_lookback", defaults.sr_lookback as i64)
            as usize,
        oversold: config.get_double("strategy", "oversold", defaults.oversold),
        overbought: config.get_double("strategy", "overbought", defaults.overbought),
        risk_fraction: config.get_double("strategy", "risk_fraction", defaults.risk_fraction),
        max_position_fraction: config.get_double(
            "strategy",
            "max_position_fraction",
            defaults.max_position_fraction,
        ),
        reward_risk_ratio: config.get_double(
            "strategy",
            "reward_risk_ratio",
            defaults.reward_risk_ratio,
        ),
    }
}

pub fn criteria_from_config(config: &dyn ConfigPort) -> ScreeningCriteria {
    ScreeningCriteria {
        min_price: optional_double(config, "screening", "min_price"),
        max_price: optional_double(config, "screening", "max_price"),
        rsi_min: optional_double(config, "screening", "rsi_min"),
        rsi_max: optional_double(config, "screening", "rsi_max"),
        require_ma_crossover: config.get_bool("screening", "require_ma_crossover", false),
    }
}

pub fn initial_cash_from_config(config: &dyn ConfigPort) -> f64 {
    config.get_double("paper", "initial_cash", DEFAULT_INITIAL_CASH)
}

/// Parse a comma-separated symbol list: trimmed, uppercased, no empties, no
/// duplicates.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, PaperTraderError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(PaperTraderError::ConfigInvalid {
                section: "paper".to_string(),
                key: "symbols".to_string(),
                reason: "empty token in symbol list".to_string(),
            });
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(PaperTraderError::ConfigInvalid {
                section: "paper".to_string(),
                key: "symbols".to_string(),
                reason: format!("duplicate symbol: {symbol}"),
            });
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

pub fn symbols_from_config(config: &dyn ConfigPort) -> Result<Vec<String>, PaperTraderError> {
    let raw = config
        .get_string("paper", "symbols")
        .ok_or_else(|| PaperTraderError::ConfigMissing {
            section: "paper".to_string(),
            key: "symbols".to_string(),
        })?;
    parse_symbols(&raw)
}

fn optional_double(config: &dyn ConfigPort, section: &str, key: &str) -> Option<f64> {
    config
        .get_string(section, key)
        .and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config_from(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn empty_config_is_valid_via_defaults() {
        let config = config_from("[paper]\n");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn negative_initial_cash_rejected() {
        let config = config_from("[paper]\ninitial_cash = -5\n");
        assert!(matches!(
            validate_config(&config),
            Err(PaperTraderError::ConfigInvalid { section, .. }) if section == "paper"
        ));
    }

    #[test]
    fn zero_period_rejected() {
        let config = config_from("[strategy]\nrsi_period = 0\n");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn inverted_thresholds_rejected() {
        // oversold 80 against the default overbought of 70.
        let config = config_from("[strategy]\noversold = 80\n");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn out_of_range_risk_fraction_rejected() {
        let config = config_from("[strategy]\nrisk_fraction = 1.5\n");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn inverted_price_band_rejected() {
        let config = config_from("[screening]\nmin_price = 100\nmax_price = 50\n");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn params_load_with_overrides() {
        let config = config_from(
            "[strategy]\nrsi_period = 7\noversold = 25\nmax_position_fraction = 0.2\n",
        );
        let params = strategy_params_from_config(&config);
        assert_eq!(params.rsi_period, 7);
        assert_eq!(params.ma_short_period, 20);
        assert!((params.oversold - 25.0).abs() < f64::EPSILON);
        assert!((params.max_position_fraction - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn criteria_load_with_optional_fields() {
        let config =
            config_from("[screening]\nmin_price = 5\nrsi_max = 40\nrequire_ma_crossover = yes\n");
        let criteria = criteria_from_config(&config);
        assert_eq!(criteria.min_price, Some(5.0));
        assert_eq!(criteria.max_price, None);
        assert_eq!(criteria.rsi_min, None);
        assert_eq!(criteria.rsi_max, Some(40.0));
        assert!(criteria.require_ma_crossover);
    }

    #[test]
    fn parse_symbols_uppercases_and_trims() {
        let symbols = parse_symbols("aapl, msft ,GOOG").unwrap();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "GOOG"]);
    }

    #[test]
    fn parse_symbols_rejects_empty_token() {
        assert!(parse_symbols("AAPL,,MSFT").is_err());
    }

    #[test]
    fn parse_symbols_rejects_duplicates() {
        assert!(parse_symbols("AAPL,aapl").is_err());
    }

    #[test]
    fn symbols_missing_is_config_error() {
        let config = config_from("[paper]\n");
        assert!(matches!(
            symbols_from_config(&config),
            Err(PaperTraderError::ConfigMissing { .. })
        ));
    }
}
