use super::traits::{AnalysisContext, TradingStrategy};
use super::{BreakoutStrategy, ElliottWaveStrategy, FibonacciStrategy, MeanReversionStrategy};
use crate::domain::errors::AnalysisError;
use crate::domain::market::market_regime::{
    MarketRegimeDetector, MarketRegimeType, RegimeAssessment,
};
use crate::domain::trading::types::TradingSignal;
use std::fmt;
use tracing::{debug, warn};

/// Analyzer an adaptive evaluation was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    ElliottWave,
    MeanReversion,
    Breakout,
    Fibonacci,
}

impl Route {
    /// Regime → analyzer table.
    pub fn for_regime(regime: MarketRegimeType) -> Self {
        match regime {
            MarketRegimeType::StrongTrend | MarketRegimeType::Trending => Route::ElliottWave,
            MarketRegimeType::Volatile => Route::MeanReversion,
            MarketRegimeType::Ranging => Route::Breakout,
            MarketRegimeType::Transitional | MarketRegimeType::Unknown => Route::Fibonacci,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::ElliottWave => write!(f, "elliott_wave"),
            Route::MeanReversion => write!(f, "mean_reversion"),
            Route::Breakout => write!(f, "breakout"),
            Route::Fibonacci => write!(f, "fibonacci"),
        }
    }
}

/// Outcome of one adaptive evaluation.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub regime: RegimeAssessment,
    pub route: Route,
    /// False when the analyzer failed and the fallback HOLD was emitted
    pub delegated: bool,
    pub signal: TradingSignal,
}

/// Regime-driven router over the four single-purpose analyzers.
///
/// Never produces a signal of its own: either the selected analyzer's output or,
/// when that analyzer fails, a zero-confidence HOLD.
pub struct AdaptiveStrategy {
    detector: MarketRegimeDetector,
    elliott: ElliottWaveStrategy,
    mean_reversion: MeanReversionStrategy,
    breakout: BreakoutStrategy,
    fibonacci: FibonacciStrategy,
}

impl Default for AdaptiveStrategy {
    fn default() -> Self {
        Self {
            detector: MarketRegimeDetector::default(),
            elliott: ElliottWaveStrategy::default(),
            mean_reversion: MeanReversionStrategy::default(),
            breakout: BreakoutStrategy::default(),
            fibonacci: FibonacciStrategy::default(),
        }
    }
}

impl AdaptiveStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn analyzer(&self, route: Route) -> &dyn TradingStrategy {
        match route {
            Route::ElliottWave => &self.elliott,
            Route::MeanReversion => &self.mean_reversion,
            Route::Breakout => &self.breakout,
            Route::Fibonacci => &self.fibonacci,
        }
    }

    pub fn dispatch(&self, ctx: &AnalysisContext<'_>) -> Dispatch {
        let regime = self.detector.detect(ctx.frame);
        let route = Route::for_regime(regime.regime);
        debug!(
            "AdaptiveStrategy: {} regime {} ({:.0}%) → {}",
            ctx.symbol, regime.regime, regime.confidence, route
        );

        match self.analyzer(route).analyze(ctx) {
            Ok(mut signal) => {
                signal.reasoning.insert(
                    0,
                    format!(
                        "Market regime: {} ({:.0}% confidence)",
                        regime.regime, regime.confidence
                    ),
                );
                Dispatch {
                    regime,
                    route,
                    delegated: true,
                    signal,
                }
            }
            Err(e) => {
                warn!(
                    "AdaptiveStrategy: {} analyzer {} failed: {}. Falling back to HOLD",
                    ctx.symbol, route, e
                );
                let mut signal = TradingSignal::hold(
                    "Adaptive (fallback)",
                    ctx.current_price,
                    "Adaptive analysis failed, fallback to HOLD",
                );
                signal.reasoning.push(e.to_string());
                Dispatch {
                    regime,
                    route,
                    delegated: false,
                    signal,
                }
            }
        }
    }
}

impl TradingStrategy for AdaptiveStrategy {
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<TradingSignal, AnalysisError> {
        Ok(self.dispatch(ctx).signal)
    }

    fn name(&self) -> &str {
        "Adaptive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::indicator_frame::IndicatorFrame;
    use crate::domain::trading::types::{Candle, RiskLevel, SignalKind};
    use chrono::{Duration, TimeZone, Utc};

    fn frame(closes: &[f64]) -> IndicatorFrame {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::flat(t0 + Duration::minutes(i as i64), c, 1.0))
            .collect();
        IndicatorFrame::new(candles, None)
    }

    #[test]
    fn test_routing_table() {
        assert_eq!(Route::for_regime(MarketRegimeType::StrongTrend), Route::ElliottWave);
        assert_eq!(Route::for_regime(MarketRegimeType::Trending), Route::ElliottWave);
        assert_eq!(Route::for_regime(MarketRegimeType::Volatile), Route::MeanReversion);
        assert_eq!(Route::for_regime(MarketRegimeType::Ranging), Route::Breakout);
        assert_eq!(Route::for_regime(MarketRegimeType::Transitional), Route::Fibonacci);
        assert_eq!(Route::for_regime(MarketRegimeType::Unknown), Route::Fibonacci);
    }

    #[test]
    fn test_unknown_regime_delegates_to_fibonacci() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 0.1).collect();
        let frame = frame(&closes);
        let ctx = AnalysisContext::new("XAUUSD", &frame, 102.9);
        let dispatch = AdaptiveStrategy::new().dispatch(&ctx);

        assert_eq!(dispatch.regime.regime, MarketRegimeType::Unknown);
        assert_eq!(dispatch.route, Route::Fibonacci);
        assert!(dispatch.delegated);
        assert_eq!(dispatch.signal.strategy_name, "Fibonacci");
        assert!(dispatch.signal.reasoning[0].starts_with("Market regime: unknown"));
    }

    #[test]
    fn test_analyzer_failure_falls_back_to_hold() {
        // Flat market, no indicator series: ranging → breakout, which needs indicators
        let frame = frame(&[100.0; 60]);
        let ctx = AnalysisContext::new("XAUUSD", &frame, 100.0);
        let dispatch = AdaptiveStrategy::new().dispatch(&ctx);

        assert_eq!(dispatch.route, Route::Breakout);
        assert!(!dispatch.delegated);
        let signal = dispatch.signal;
        assert_eq!(signal.signal, SignalKind::Hold);
        assert_eq!(signal.confidence, 0.0);
        assert_eq!(signal.risk_level, RiskLevel::High);
        assert_eq!(signal.strategy_name, "Adaptive (fallback)");
        assert_eq!(signal.entry_price, 100.0);
        assert_eq!(signal.stop_loss, 100.0);
        assert_eq!(signal.take_profit, 100.0);
        assert!(signal.reasoning.iter().any(|r| r.contains("fallback")));
    }
}
