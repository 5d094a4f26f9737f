use super::{EnvLookup, non_empty, parse_optional_u64, parse_usize};
use crate::domain::market::strategy_config::StrategyMode;
use crate::domain::market::timeframe::Timeframe;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// Market data and analysis settings.
#[derive(Debug, Clone)]
pub struct MarketEnvConfig {
    pub symbols: Vec<String>,
    pub strategy_mode: StrategyMode,
    pub timeframe: Timeframe,
    pub seed_periods: usize,
    pub max_history: usize,
    pub symbol_profiles_path: Option<PathBuf>,
    pub rng_seed: Option<u64>,
}

impl MarketEnvConfig {
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let symbols = parse_symbols(&lookup("SYMBOLS").unwrap_or_else(|| "XAUUSD".to_string()));

        let strategy_mode_str = lookup("STRATEGY_MODE").unwrap_or_else(|| "adaptive".to_string());
        let strategy_mode = StrategyMode::from_str(&strategy_mode_str)?;

        let timeframe_str = lookup("TIMEFRAME").unwrap_or_else(|| "M1".to_string());
        let timeframe = Timeframe::from_str(&timeframe_str).context("Failed to parse TIMEFRAME")?;

        let seed_periods = parse_usize(lookup, "SEED_PERIODS", 200)?;
        let max_history = parse_usize(lookup, "MAX_HISTORY", seed_periods.max(500))?;

        Ok(Self {
            symbols,
            strategy_mode,
            timeframe,
            seed_periods,
            max_history,
            symbol_profiles_path: non_empty(lookup("SYMBOL_PROFILES_PATH")).map(PathBuf::from),
            rng_seed: parse_optional_u64(lookup, "RNG_SEED")?,
        })
    }
}

/// Comma-separated list, upper-cased, de-duplicated in first-seen order.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in raw.split(',').map(|s| s.trim().to_uppercase()) {
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}
