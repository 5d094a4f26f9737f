use crate::domain::trading::types::Candle;
use std::collections::VecDeque;

/// Bounded, time-ordered candle history for one symbol.
///
/// Candles live in a ring buffer addressed by index; once `max_len` is exceeded
/// the oldest candles are evicted from the front. Only the last candle may be
/// mutated, and only by the candle aggregator.
#[derive(Debug, Clone)]
pub struct SymbolSeries {
    symbol: String,
    candles: VecDeque<Candle>,
    max_len: usize,
    pub base_price: f64,
    pub volatility_hint: f64,
    pub current_price: f64,
}

impl SymbolSeries {
    pub fn new(symbol: impl Into<String>, max_len: usize) -> Self {
        Self {
            symbol: symbol.into(),
            candles: VecDeque::with_capacity(max_len.min(4096)),
            max_len: max_len.max(1),
            base_price: 0.0,
            volatility_hint: 0.0,
            current_price: 0.0,
        }
    }

    pub fn with_profile(mut self, base_price: f64, volatility_hint: f64) -> Self {
        self.base_price = base_price;
        self.volatility_hint = volatility_hint;
        self
    }

    /// Replaces the history with `candles` sorted by open time, keeping the newest `max_len`.
    pub fn seed(&mut self, mut candles: Vec<Candle>) {
        candles.sort_by_key(|c| c.open_time);
        let skip = candles.len().saturating_sub(self.max_len);
        self.candles = candles.into_iter().skip(skip).collect();
        if let Some(last) = self.candles.back() {
            self.current_price = last.close;
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Candle> {
        self.candles.back_mut()
    }

    /// Appends a candle and evicts from the front past the ceiling.
    /// Returns the number of evicted candles.
    pub(crate) fn push(&mut self, candle: Candle) -> usize {
        self.candles.push_back(candle);
        let mut evicted = 0;
        while self.candles.len() > self.max_len {
            self.candles.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }

    /// Owned copy of the candles, oldest first.
    pub fn to_vec(&self) -> Vec<Candle> {
        self.candles.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candle(minute: i64, price: f64) -> Candle {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Candle::flat(t0 + Duration::minutes(minute), price, 1.0)
    }

    #[test]
    fn test_push_evicts_oldest_first() {
        let mut series = SymbolSeries::new("XAUUSD", 3);
        for i in 0..5 {
            series.push(candle(i, 100.0 + i as f64));
        }
        assert_eq!(series.len(), 3);
        assert_eq!(series.get(0).unwrap().close, 102.0);
        assert_eq!(series.last().unwrap().close, 104.0);
    }

    #[test]
    fn test_seed_sorts_and_truncates() {
        let mut series = SymbolSeries::new("XAUUSD", 2);
        series.seed(vec![candle(2, 3.0), candle(0, 1.0), candle(1, 2.0)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(0).unwrap().close, 2.0);
        assert_eq!(series.current_price, 3.0);
    }
}
