//! Configuration module for aurum.
//!
//! Settings are loaded from environment variables (a `.env` file is honoured by
//! the binary), grouped by concern: Market, Risk and Session.

mod market_config;
mod risk_env_config;
mod session_config;
pub mod symbol_profiles;

pub use market_config::{MarketEnvConfig, parse_symbols};
pub use risk_env_config::RiskEnvConfig;
pub use session_config::SessionEnvConfig;
pub use symbol_profiles::{SymbolProfile, SymbolProfiles};

pub use crate::domain::market::strategy_config::StrategyMode;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::env;
use tracing::info;

/// Variable lookup used by every `from_lookup` constructor.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub market: MarketEnvConfig,
    pub risk: RiskEnvConfig,
    pub session: SessionEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        Ok(Self {
            market: MarketEnvConfig::from_lookup(lookup)?,
            risk: RiskEnvConfig::from_lookup(lookup)?,
            session: SessionEnvConfig::from_lookup(lookup)?,
        })
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.market.symbols.is_empty() {
            anyhow::bail!("SYMBOLS must list at least one symbol");
        }
        if self.market.seed_periods == 0 {
            anyhow::bail!("SEED_PERIODS must be greater than 0");
        }
        if self.market.max_history < self.market.seed_periods {
            anyhow::bail!(
                "MAX_HISTORY ({}) must be at least SEED_PERIODS ({})",
                self.market.max_history,
                self.market.seed_periods
            );
        }
        if self.risk.account_balance <= Decimal::ZERO {
            anyhow::bail!(
                "ACCOUNT_BALANCE must be positive, got {}",
                self.risk.account_balance
            );
        }
        if !(self.risk.risk_per_trade > 0.0 && self.risk.risk_per_trade <= 1.0) {
            anyhow::bail!(
                "RISK_PER_TRADE must be in (0, 1], got {}",
                self.risk.risk_per_trade
            );
        }
        if !(0.0..=100.0).contains(&self.risk.min_confidence) {
            anyhow::bail!(
                "MIN_CONFIDENCE must be in [0, 100], got {}",
                self.risk.min_confidence
            );
        }
        if self.risk.max_positions_per_symbol == 0 {
            anyhow::bail!("MAX_POSITIONS_PER_SYMBOL must be greater than 0");
        }
        if self.session.chart_every == 0 {
            anyhow::bail!("CHART_EVERY must be greater than 0");
        }
        if !(self.session.update_interval_secs.is_finite()
            && self.session.update_interval_secs >= 0.0)
        {
            anyhow::bail!(
                "UPDATE_INTERVAL_SECS must be a non-negative number, got {}",
                self.session.update_interval_secs
            );
        }
        Ok(())
    }

    /// Built-in profiles, overlaid with `SYMBOL_PROFILES_PATH` when set.
    pub fn symbol_profiles(&self) -> Result<SymbolProfiles> {
        match &self.market.symbol_profiles_path {
            Some(path) => {
                let profiles = SymbolProfiles::load(path)?;
                info!("Config: Loaded symbol profiles from {}", path.display());
                Ok(profiles)
            }
            None => Ok(SymbolProfiles::default()),
        }
    }
}

pub(crate) fn parse_usize(lookup: EnvLookup<'_>, key: &str, default: usize) -> Result<usize> {
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .parse::<usize>()
        .context(format!("Failed to parse {}", key))
}

pub(crate) fn parse_f64(lookup: EnvLookup<'_>, key: &str, default: f64) -> Result<f64> {
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .parse::<f64>()
        .context(format!("Failed to parse {}", key))
}

/// Unset or blank means `None`.
pub(crate) fn parse_optional_u64(lookup: EnvLookup<'_>, key: &str) -> Result<Option<u64>> {
    non_empty(lookup(key))
        .map(|raw| raw.parse::<u64>().context(format!("Failed to parse {}", key)))
        .transpose()
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
