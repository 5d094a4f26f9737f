use super::{EnvLookup, parse_f64, parse_usize};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Simulated account and position-sizing settings.
#[derive(Debug, Clone)]
pub struct RiskEnvConfig {
    pub account_balance: Decimal,
    pub risk_per_trade: f64,
    pub min_confidence: f64,
    pub max_positions_per_symbol: usize,
}

impl RiskEnvConfig {
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let account_balance = Decimal::from_str(
            &lookup("ACCOUNT_BALANCE").unwrap_or_else(|| "100000".to_string()),
        )
        .context("Failed to parse ACCOUNT_BALANCE")?;

        Ok(Self {
            account_balance,
            risk_per_trade: parse_f64(lookup, "RISK_PER_TRADE", 0.01)?,
            min_confidence: parse_f64(lookup, "MIN_CONFIDENCE", 70.0)?,
            max_positions_per_symbol: parse_usize(lookup, "MAX_POSITIONS_PER_SYMBOL", 1)?,
        })
    }
}
