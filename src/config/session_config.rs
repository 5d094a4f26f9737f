use super::{EnvLookup, non_empty, parse_f64, parse_optional_u64};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Run loop cadence and session artefacts.
#[derive(Debug, Clone)]
pub struct SessionEnvConfig {
    pub update_interval_secs: f64,
    pub chart_every: u64,
    pub max_iterations: Option<u64>,
    /// `None` disables reports
    pub report_dir: Option<PathBuf>,
    /// `None` disables trade history persistence
    pub trade_history_path: Option<PathBuf>,
}

impl SessionEnvConfig {
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let chart_every = lookup("CHART_EVERY")
            .unwrap_or_else(|| "12".to_string())
            .parse::<u64>()
            .context("Failed to parse CHART_EVERY")?;

        // Set-but-empty disables the artefact
        let report_dir = match lookup("REPORT_DIR") {
            Some(raw) => non_empty(Some(raw)).map(PathBuf::from),
            None => Some(PathBuf::from("./charts")),
        };
        let trade_history_path = match lookup("TRADE_HISTORY_PATH") {
            Some(raw) => non_empty(Some(raw)).map(PathBuf::from),
            None => Some(PathBuf::from("trade_history.json")),
        };

        Ok(Self {
            update_interval_secs: parse_f64(lookup, "UPDATE_INTERVAL_SECS", 5.0)?,
            chart_every,
            max_iterations: parse_optional_u64(lookup, "MAX_ITERATIONS")?,
            report_dir,
            trade_history_path,
        })
    }
}
