use crate::domain::trading::symbol_series::SymbolSeries;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Price model parameters of one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SymbolProfile {
    pub base_price: f64,
    pub volatility: f64,
}

impl Default for SymbolProfile {
    fn default() -> Self {
        Self {
            base_price: 100.0,
            volatility: 1.0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    symbols: HashMap<String, SymbolProfile>,
}

/// Built-in profiles with optional per-symbol overrides.
///
/// Unknown symbols resolve to `SymbolProfile::default()`.
#[derive(Debug, Clone)]
pub struct SymbolProfiles {
    profiles: HashMap<String, SymbolProfile>,
}

impl Default for SymbolProfiles {
    fn default() -> Self {
        let builtin = [
            ("XAUUSD", 3989.45, 3.0),
            ("XAGUSD", 31.25, 0.5),
            ("EURUSD", 1.0850, 0.001),
            ("GBPUSD", 1.2650, 0.001),
            ("BTCUSD", 43500.0, 500.0),
            ("USOUSD", 78.50, 2.0),
        ];
        let profiles = builtin
            .into_iter()
            .map(|(symbol, base_price, volatility)| {
                (
                    symbol.to_string(),
                    SymbolProfile {
                        base_price,
                        volatility,
                    },
                )
            })
            .collect();
        Self { profiles }
    }
}

impl SymbolProfiles {
    /// Built-ins overlaid with the `[symbols.<NAME>]` tables of a TOML file.
    ///
    /// ```toml
    /// [symbols.XAUUSD]
    /// base_price = 2350.0
    /// volatility = 2.5
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read symbol profiles {}", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("Failed to parse symbol profiles {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let file: ProfileFile = toml::from_str(raw)?;
        let mut profiles = Self::default();
        for (symbol, profile) in file.symbols {
            if !(profile.base_price.is_finite() && profile.base_price > 0.0) {
                anyhow::bail!("base_price for {} must be positive", symbol);
            }
            if !(profile.volatility.is_finite() && profile.volatility >= 0.0) {
                anyhow::bail!("volatility for {} must be non-negative", symbol);
            }
            profiles.profiles.insert(symbol.to_uppercase(), profile);
        }
        Ok(profiles)
    }

    pub fn get(&self, symbol: &str) -> SymbolProfile {
        self.profiles
            .get(&symbol.to_uppercase())
            .copied()
            .unwrap_or_default()
    }

    /// Empty series for `symbol` carrying its profile.
    pub fn series_for(&self, symbol: &str, max_len: usize) -> SymbolSeries {
        let profile = self.get(symbol);
        SymbolSeries::new(symbol, max_len).with_profile(profile.base_price, profile.volatility)
    }
}
