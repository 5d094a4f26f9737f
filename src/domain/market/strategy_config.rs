use serde::{Deserialize, Serialize};

/// Strategy selected at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyMode {
    #[default]
    Adaptive,
    Fibonacci,
    ElliottWave,
    Breakout,
    MeanReversion,
    /// Composite multi-indicator scoring
    MultiTimeframe,
}

impl StrategyMode {
    pub fn all() -> [StrategyMode; 6] {
        [
            StrategyMode::Adaptive,
            StrategyMode::Fibonacci,
            StrategyMode::ElliottWave,
            StrategyMode::Breakout,
            StrategyMode::MeanReversion,
            StrategyMode::MultiTimeframe,
        ]
    }
}

impl std::str::FromStr for StrategyMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "adaptive" => Ok(StrategyMode::Adaptive),
            "fibonacci" => Ok(StrategyMode::Fibonacci),
            "elliott_wave" | "elliottwave" => Ok(StrategyMode::ElliottWave),
            "breakout" => Ok(StrategyMode::Breakout),
            "mean_reversion" | "meanreversion" => Ok(StrategyMode::MeanReversion),
            "multi_timeframe" | "multitimeframe" | "multi_indicator" => {
                Ok(StrategyMode::MultiTimeframe)
            }
            _ => anyhow::bail!(
                "Invalid STRATEGY_MODE: {}. Valid: adaptive, fibonacci, elliott_wave, breakout, mean_reversion, multi_timeframe",
                s
            ),
        }
    }
}

impl std::fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyMode::Adaptive => write!(f, "adaptive"),
            StrategyMode::Fibonacci => write!(f, "fibonacci"),
            StrategyMode::ElliottWave => write!(f, "elliott_wave"),
            StrategyMode::Breakout => write!(f, "breakout"),
            StrategyMode::MeanReversion => write!(f, "mean_reversion"),
            StrategyMode::MultiTimeframe => write!(f, "multi_timeframe"),
        }
    }
}
