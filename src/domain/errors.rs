use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while turning ticks into candles
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error(
        "Out-of-order tick for {symbol}: tick time {tick_time} precedes last candle open {last_open}"
    )]
    OutOfOrderTick {
        symbol: String,
        tick_time: DateTime<Utc>,
        last_open: DateTime<Utc>,
    },

    #[error("Invalid tick for {symbol}: {reason}")]
    InvalidTick { symbol: String, reason: String },

    #[error("Tick for {tick_symbol} routed to series of {series_symbol}")]
    SymbolMismatch {
        series_symbol: String,
        tick_symbol: String,
    },

    #[error("Tick source exhausted for {symbol}")]
    SourceExhausted { symbol: String },
}

/// Errors raised by indicator computation and strategy analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Insufficient data: need {required} candles, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Indicator {indicator} failed: {reason}")]
    IndicatorComputation { indicator: String, reason: String },

    #[error("Indicator series unavailable for {strategy}")]
    MissingIndicators { strategy: String },

    #[error("{strategy} analysis failed: {reason}")]
    AnalyzerFailure { strategy: String, reason: String },
}

/// Errors raised while persisting session artefacts
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
}
