use crate::domain::errors::MarketDataError;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::trading::symbol_series::SymbolSeries;
use crate::domain::trading::types::{Candle, Tick};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// What a tick did to the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleUpdate {
    /// First candle of an empty series
    Started,
    /// Last candle updated in place
    Updated,
    /// Previous candle closed and a new one appended
    Appended { evicted: usize },
}

/// Folds ticks into a symbol's candle series at a fixed interval.
#[derive(Debug, Clone, Copy)]
pub struct CandleAggregator {
    timeframe: Timeframe,
}

impl CandleAggregator {
    pub fn new(timeframe: Timeframe) -> Self {
        Self { timeframe }
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Records a tick's mid price.
    pub fn on_tick(
        &self,
        series: &mut SymbolSeries,
        tick: &Tick,
    ) -> Result<CandleUpdate, MarketDataError> {
        if tick.symbol != series.symbol() {
            return Err(MarketDataError::SymbolMismatch {
                series_symbol: series.symbol().to_string(),
                tick_symbol: tick.symbol.clone(),
            });
        }
        self.update(series, tick.mid(), tick.timestamp, tick.volume)
    }

    /// Applies one price observation to `series`.
    ///
    /// Ticks older than the last candle's open time are rejected and leave the
    /// series untouched.
    pub fn update(
        &self,
        series: &mut SymbolSeries,
        price: f64,
        timestamp: DateTime<Utc>,
        volume: f64,
    ) -> Result<CandleUpdate, MarketDataError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(MarketDataError::InvalidTick {
                symbol: series.symbol().to_string(),
                reason: format!("price {} is not a positive finite number", price),
            });
        }
        let volume = if volume.is_finite() && volume > 0.0 {
            volume
        } else {
            0.0
        };

        let (last_open, last_close) = match series.last() {
            Some(last) => (last.open_time, last.close),
            None => {
                series.push(Candle::flat(timestamp, price, volume));
                series.current_price = price;
                debug!(
                    "CandleAggregator: {} - First tick @ {}, starting aggregation",
                    series.symbol(),
                    price
                );
                return Ok(CandleUpdate::Started);
            }
        };

        if timestamp < last_open {
            warn!(
                "CandleAggregator: {} out-of-order tick rejected ({} < {})",
                series.symbol(),
                timestamp,
                last_open
            );
            return Err(MarketDataError::OutOfOrderTick {
                symbol: series.symbol().to_string(),
                tick_time: timestamp,
                last_open,
            });
        }

        series.current_price = price;

        let within_interval = match self.timeframe.duration() {
            Some(interval) => timestamp < last_open + interval,
            None => false,
        };

        if within_interval {
            if let Some(candle) = series.last_mut() {
                candle.close = price;
                candle.high = candle.high.max(price);
                candle.low = candle.low.min(price);
                candle.volume += volume;
            }
            return Ok(CandleUpdate::Updated);
        }

        let candle = if self.timeframe == Timeframe::Tick {
            Candle::flat(timestamp, price, volume)
        } else {
            // Gap-free continuity: the new candle opens at the previous close
            Candle {
                open_time: timestamp,
                open: last_close,
                high: last_close.max(price),
                low: last_close.min(price),
                close: price,
                volume,
            }
        };

        if let Some(done) = series.last() {
            debug!(
                "CandleAggregator: {} candle completed → O:{} H:{} L:{} C:{} V:{}",
                series.symbol(),
                done.open,
                done.high,
                done.low,
                done.close,
                done.volume
            );
        }

        let evicted = series.push(candle);
        Ok(CandleUpdate::Appended { evicted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(minute: i64, second: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + Duration::minutes(minute)
            + Duration::seconds(second)
    }

    #[test]
    fn test_candle_aggregation_within_minute() {
        let agg = CandleAggregator::new(Timeframe::OneMin);
        let mut series = SymbolSeries::new("XAUUSD", 500);

        assert_eq!(
            agg.update(&mut series, 2000.0, t(0, 1), 1.5).unwrap(),
            CandleUpdate::Started
        );
        agg.update(&mut series, 2003.0, t(0, 30), 2.5).unwrap();
        agg.update(&mut series, 2001.0, t(0, 45), 0.8).unwrap();
        let update = agg.update(&mut series, 1998.0, t(0, 59), 1.0).unwrap();
        assert_eq!(update, CandleUpdate::Updated);

        assert_eq!(series.len(), 1);
        let candle = series.last().unwrap();
        assert_eq!(candle.open, 2000.0);
        assert_eq!(candle.high, 2003.0);
        assert_eq!(candle.low, 1998.0);
        assert_eq!(candle.close, 1998.0);
        assert!((candle.volume - 5.8).abs() < 1e-9);
        assert_eq!(candle.open_time, t(0, 1));
    }

    #[test]
    fn test_new_candle_opens_at_previous_close() {
        let agg = CandleAggregator::new(Timeframe::OneMin);
        let mut series = SymbolSeries::new("XAUUSD", 500);

        agg.update(&mut series, 2000.0, t(0, 0), 1.0).unwrap();
        agg.update(&mut series, 2004.0, t(0, 30), 1.0).unwrap();
        let update = agg.update(&mut series, 2010.0, t(1, 0), 1.0).unwrap();

        assert_eq!(update, CandleUpdate::Appended { evicted: 0 });
        assert_eq!(series.len(), 2);
        let candle = series.last().unwrap();
        assert_eq!(candle.open, 2004.0);
        assert_eq!(candle.close, 2010.0);
        assert_eq!(candle.low, 2004.0);
        assert_eq!(candle.high, 2010.0);
        assert!(candle.is_consistent());
    }

    #[test]
    fn test_out_of_order_tick_is_rejected() {
        let agg = CandleAggregator::new(Timeframe::OneMin);
        let mut series = SymbolSeries::new("XAUUSD", 500);

        agg.update(&mut series, 2000.0, t(5, 0), 1.0).unwrap();
        agg.update(&mut series, 2001.0, t(6, 0), 1.0).unwrap();
        let before = series.to_vec();

        let result = agg.update(&mut series, 1990.0, t(5, 30), 1.0);
        assert!(matches!(
            result,
            Err(MarketDataError::OutOfOrderTick { .. })
        ));
        assert_eq!(series.to_vec(), before);
    }

    #[test]
    fn test_tick_mode_appends_every_tick() {
        let agg = CandleAggregator::new(Timeframe::Tick);
        let mut series = SymbolSeries::new("XAUUSD", 500);

        for i in 0..5 {
            agg.update(&mut series, 100.0 + i as f64, t(0, i), 1.0)
                .unwrap();
        }
        assert_eq!(series.len(), 5);
        assert!(series.iter().all(|c| c.open == c.close));
    }

    #[test]
    fn test_eviction_at_ceiling() {
        let agg = CandleAggregator::new(Timeframe::OneMin);
        let mut series = SymbolSeries::new("XAUUSD", 3);

        for i in 0..3 {
            agg.update(&mut series, 100.0, t(i, 0), 1.0).unwrap();
        }
        let update = agg.update(&mut series, 101.0, t(3, 0), 1.0).unwrap();
        assert_eq!(update, CandleUpdate::Appended { evicted: 1 });
        assert_eq!(series.len(), 3);
        assert_eq!(series.get(0).unwrap().open_time, t(1, 0));
    }

    #[test]
    fn test_rejects_non_finite_price() {
        let agg = CandleAggregator::new(Timeframe::OneMin);
        let mut series = SymbolSeries::new("XAUUSD", 10);
        assert!(agg.update(&mut series, f64::NAN, t(0, 0), 1.0).is_err());
        assert!(agg.update(&mut series, -1.0, t(0, 0), 1.0).is_err());
        assert!(series.is_empty());
    }

    #[test]
    fn test_symbol_mismatch() {
        let agg = CandleAggregator::new(Timeframe::OneMin);
        let mut series = SymbolSeries::new("XAUUSD", 10);
        let tick = Tick {
            symbol: "EURUSD".to_string(),
            bid: 1.08,
            ask: 1.09,
            timestamp: t(0, 0),
            volume: 1.0,
        };
        assert!(matches!(
            agg.on_tick(&mut series, &tick),
            Err(MarketDataError::SymbolMismatch { .. })
        ));
    }
}
