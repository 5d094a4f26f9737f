use crate::domain::errors::MarketDataError;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::TickSource;
use crate::domain::trading::types::{Candle, Tick};
use std::collections::{HashMap, VecDeque};

/// Deterministic source replaying pre-recorded history and ticks.
#[derive(Debug, Default)]
pub struct ReplayTickSource {
    history: HashMap<String, Vec<Candle>>,
    ticks: HashMap<String, VecDeque<Tick>>,
}

impl ReplayTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.history.insert(symbol.to_string(), candles);
        self
    }

    /// Queues ticks; each is routed by its own `symbol` field.
    pub fn with_ticks(mut self, ticks: impl IntoIterator<Item = Tick>) -> Self {
        for tick in ticks {
            self.ticks
                .entry(tick.symbol.clone())
                .or_default()
                .push_back(tick);
        }
        self
    }

    pub fn remaining(&self, symbol: &str) -> usize {
        self.ticks.get(symbol).map_or(0, VecDeque::len)
    }
}

impl TickSource for ReplayTickSource {
    /// Newest `periods` recorded candles; the timeframe is taken as recorded.
    fn seed_history(
        &mut self,
        symbol: &str,
        periods: usize,
        _timeframe: Timeframe,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let candles = self.history.get(symbol).cloned().unwrap_or_default();
        let skip = candles.len().saturating_sub(periods);
        Ok(candles.into_iter().skip(skip).collect())
    }

    fn next_tick(&mut self, symbol: &str) -> Result<Tick, MarketDataError> {
        self.ticks
            .get_mut(symbol)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| MarketDataError::SourceExhausted {
                symbol: symbol.to_string(),
            })
    }
}
