use crate::application::market_data::candle_aggregator::{CandleAggregator, CandleUpdate};
use crate::application::market_data::indicator_engine::IndicatorEngine;
use crate::application::strategies::{AnalysisContext, TradingStrategy};
use crate::domain::errors::MarketDataError;
use crate::domain::market::indicator_frame::IndicatorFrame;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::trading::symbol_series::SymbolSeries;
use crate::domain::trading::types::{Tick, TradingSignal};
use std::sync::Arc;
use tracing::{debug, warn};

/// Minimum candle count before any analyzer runs.
pub const MIN_ANALYSIS_CANDLES: usize = 20;

/// Per-symbol pipeline: tick → candles → indicators → strategy → signal.
///
/// Owns the symbol's series exclusively; the latest signal replaces the previous one.
pub struct SignalEngine {
    series: SymbolSeries,
    aggregator: CandleAggregator,
    indicators: IndicatorEngine,
    strategy: Arc<dyn TradingStrategy>,
    latest_frame: Option<IndicatorFrame>,
    latest_signal: Option<TradingSignal>,
}

impl SignalEngine {
    pub fn new(
        series: SymbolSeries,
        timeframe: Timeframe,
        strategy: Arc<dyn TradingStrategy>,
    ) -> Self {
        Self {
            series,
            aggregator: CandleAggregator::new(timeframe),
            indicators: IndicatorEngine::new(),
            strategy,
            latest_frame: None,
            latest_signal: None,
        }
    }

    pub fn symbol(&self) -> &str {
        self.series.symbol()
    }

    pub fn series(&self) -> &SymbolSeries {
        &self.series
    }

    pub fn series_mut(&mut self) -> &mut SymbolSeries {
        &mut self.series
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn latest_frame(&self) -> Option<&IndicatorFrame> {
        self.latest_frame.as_ref()
    }

    pub fn latest_signal(&self) -> Option<&TradingSignal> {
        self.latest_signal.as_ref()
    }

    /// Folds a tick into the candle series.
    pub fn ingest(&mut self, tick: &Tick) -> Result<CandleUpdate, MarketDataError> {
        self.aggregator.on_tick(&mut self.series, tick)
    }

    /// Recomputes indicators and runs the configured strategy.
    ///
    /// Never fails: short history yields the "Insufficient data" HOLD and an
    /// analyzer error yields a zero-confidence fallback HOLD.
    pub fn analyze(&mut self) -> TradingSignal {
        let frame = self.indicators.compute_owned(self.series.to_vec());
        let price = self.series.current_price;
        let signal = evaluate(self.strategy.as_ref(), self.series.symbol(), &frame, price);
        self.latest_frame = Some(frame);
        self.latest_signal = Some(signal.clone());
        signal
    }
}

/// Runs `strategy` over `frame` with the short-history guard and error fallback.
pub fn evaluate(
    strategy: &dyn TradingStrategy,
    symbol: &str,
    frame: &IndicatorFrame,
    current_price: f64,
) -> TradingSignal {
    if frame.len() < MIN_ANALYSIS_CANDLES {
        debug!(
            "SignalEngine: {} has {} candles (< {}), holding",
            symbol,
            frame.len(),
            MIN_ANALYSIS_CANDLES
        );
        return TradingSignal::insufficient_data(current_price);
    }

    let ctx = AnalysisContext::new(symbol, frame, current_price);
    match strategy.analyze(&ctx) {
        Ok(signal) => signal,
        Err(e) => {
            warn!(
                "SignalEngine: {} analyzer {} failed: {}",
                symbol,
                strategy.name(),
                e
            );
            let mut signal = TradingSignal::hold(
                format!("{} (fallback)", strategy.name()),
                current_price,
                format!("{} analysis failed, fallback to HOLD", strategy.name()),
            );
            signal.reasoning.push(e.to_string());
            signal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::strategies::{BreakoutStrategy, MultiIndicatorStrategy};
    use crate::domain::trading::types::{Candle, RiskLevel, SignalKind};
    use chrono::{Duration, TimeZone, Utc};

    fn tick(minute: i64, price: f64) -> Tick {
        Tick {
            symbol: "XAUUSD".to_string(),
            bid: price,
            ask: price,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minute),
            volume: 10.0,
        }
    }

    #[test]
    fn test_short_history_is_insufficient_data() {
        let mut engine = SignalEngine::new(
            SymbolSeries::new("XAUUSD", 500),
            Timeframe::OneMin,
            Arc::new(MultiIndicatorStrategy::default()),
        );
        for i in 0..19 {
            engine.ingest(&tick(i, 2000.0 + i as f64)).unwrap();
        }
        let signal = engine.analyze();
        assert_eq!(signal.signal, SignalKind::Hold);
        assert_eq!(signal.confidence, 0.0);
        assert_eq!(signal.risk_level, RiskLevel::High);
        assert_eq!(signal.strategy_name, "None");
        assert_eq!(signal.reasoning, vec!["Insufficient data".to_string()]);
        assert_eq!(engine.latest_signal().unwrap().signal, SignalKind::Hold);
    }

    #[test]
    fn test_analyzer_error_becomes_fallback_hold() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles = (0..30)
            .map(|i| Candle::flat(t0 + Duration::minutes(i), 100.0, 1.0))
            .collect();
        // No indicator series: breakout cannot score
        let frame = IndicatorFrame::new(candles, None);
        let signal = evaluate(&BreakoutStrategy::default(), "XAUUSD", &frame, 100.0);

        assert_eq!(signal.signal, SignalKind::Hold);
        assert_eq!(signal.confidence, 0.0);
        assert_eq!(signal.strategy_name, "Breakout (fallback)");
        assert_eq!(signal.stop_loss, 100.0);
        assert_eq!(signal.take_profit, 100.0);
    }
}
