mod adaptive;
mod breakout;
mod elliott_wave;
mod fibonacci;
mod mean_reversion;
mod multi_indicator;
pub mod scoring;
mod traits;

pub use adaptive::{AdaptiveStrategy, Dispatch, Route};
pub use breakout::BreakoutStrategy;
pub use elliott_wave::{ElliottWaveStrategy, WaveCount, WavePattern};
pub use fibonacci::{FibonacciStrategy, SwingTrend, fibonacci_levels, nearest_level};
pub use mean_reversion::MeanReversionStrategy;
pub use multi_indicator::MultiIndicatorStrategy;
pub use traits::{AnalysisContext, TradingStrategy};

use crate::domain::market::strategy_config::StrategyMode;
use std::sync::Arc;

pub struct StrategyFactory;

impl StrategyFactory {
    pub fn create(mode: StrategyMode) -> Arc<dyn TradingStrategy> {
        match mode {
            StrategyMode::Adaptive => Arc::new(AdaptiveStrategy::new()),
            StrategyMode::Fibonacci => Arc::new(FibonacciStrategy::default()),
            StrategyMode::ElliottWave => Arc::new(ElliottWaveStrategy::default()),
            StrategyMode::Breakout => Arc::new(BreakoutStrategy::default()),
            StrategyMode::MeanReversion => Arc::new(MeanReversionStrategy::default()),
            StrategyMode::MultiTimeframe => Arc::new(MultiIndicatorStrategy::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_names() {
        let names: Vec<String> = StrategyMode::all()
            .into_iter()
            .map(|mode| StrategyFactory::create(mode).name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Adaptive",
                "Fibonacci",
                "Elliott Wave",
                "Breakout",
                "Mean Reversion",
                "Multi-Indicator"
            ]
        );
    }
}
