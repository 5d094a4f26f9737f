use crate::domain::errors::{MarketDataError, PersistenceError};
use crate::domain::market::indicator_frame::IndicatorFrame;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::trading::types::{Candle, Tick, TradeRecord, TradingSignal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Producer of price ticks (live feed or synthetic model).
///
/// Ticks for a given symbol must come with non-decreasing timestamps.
pub trait TickSource: Send {
    /// Historical candles used to seed a symbol's series before the first tick.
    fn seed_history(
        &mut self,
        symbol: &str,
        periods: usize,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, MarketDataError>;

    fn next_tick(&mut self, symbol: &str) -> Result<Tick, MarketDataError>;
}

/// Fire-and-forget consumer of periodic frame/signal reports.
pub trait ReportSink: Send {
    fn publish(
        &mut self,
        symbol: &str,
        frame: &IndicatorFrame,
        signal: &TradingSignal,
    ) -> Result<(), PersistenceError>;
}

/// Document written when a session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeHistoryDocument {
    pub summary_time: DateTime<Utc>,
    pub trades: Vec<TradeRecord>,
}

/// Best-effort sink for closed trades.
pub trait TradeHistoryStore: Send {
    fn save(&self, document: &TradeHistoryDocument) -> Result<(), PersistenceError>;
}
