//! Domain error types.

/// Top-level error type for papertrader.
#[derive(Debug, thiserror::Error)]
pub enum PaperTraderError {
    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("insufficient funds: need {required:.2}, have {available:.2}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("trade {id} not found")]
    TradeNotFound { id: i64 },

    #[error("provider error for {symbol}: {reason}")]
    Provider { symbol: String, reason: String },

    #[error("broker error: {reason}")]
    Broker { reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PaperTraderError> for std::process::ExitCode {
    fn from(err: &PaperTraderError) -> Self {
        let code: u8 = match err {
            PaperTraderError::Io(_) => 1,
            PaperTraderError::ConfigParse { .. }
            | PaperTraderError::ConfigMissing { .. }
            | PaperTraderError::ConfigInvalid { .. } => 2,
            PaperTraderError::Database { .. } | PaperTraderError::DatabaseQuery { .. } => 3,
            PaperTraderError::InsufficientFunds { .. }
            | PaperTraderError::TradeNotFound { .. } => 4,
            PaperTraderError::InsufficientData { .. }
            | PaperTraderError::Provider { .. }
            | PaperTraderError::Broker { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
