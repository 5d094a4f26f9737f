use anyhow::{Result, anyhow};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle interval. `Tick` records one candle per tick instead of aggregating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    Tick,
    #[default]
    OneMin,
    FiveMin,
    FifteenMin,
    OneHour,
    FourHour,
    OneDay,
}

impl Timeframe {
    /// Returns the duration of this timeframe in minutes (0 for tick mode)
    pub fn to_minutes(&self) -> i64 {
        match self {
            Timeframe::Tick => 0,
            Timeframe::OneMin => 1,
            Timeframe::FiveMin => 5,
            Timeframe::FifteenMin => 15,
            Timeframe::OneHour => 60,
            Timeframe::FourHour => 240,
            Timeframe::OneDay => 1440,
        }
    }

    /// Interval length, `None` in tick mode
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Timeframe::Tick => None,
            other => Some(Duration::minutes(other.to_minutes())),
        }
    }

    /// Spacing used when generating seed history (one minute in tick mode)
    pub fn seed_spacing(&self) -> Duration {
        self.duration().unwrap_or_else(|| Duration::minutes(1))
    }

    pub fn all() -> Vec<Timeframe> {
        vec![
            Timeframe::Tick,
            Timeframe::OneMin,
            Timeframe::FiveMin,
            Timeframe::FifteenMin,
            Timeframe::OneHour,
            Timeframe::FourHour,
            Timeframe::OneDay,
        ]
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Tick => "tick",
            Timeframe::OneMin => "M1",
            Timeframe::FiveMin => "M5",
            Timeframe::FifteenMin => "M15",
            Timeframe::OneHour => "H1",
            Timeframe::FourHour => "H4",
            Timeframe::OneDay => "D1",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tick" => Ok(Timeframe::Tick),
            "m1" | "1m" | "1min" => Ok(Timeframe::OneMin),
            "m5" | "5m" | "5min" => Ok(Timeframe::FiveMin),
            "m15" | "15m" | "15min" => Ok(Timeframe::FifteenMin),
            "h1" | "1h" | "1hour" => Ok(Timeframe::OneHour),
            "h4" | "4h" | "4hour" => Ok(Timeframe::FourHour),
            "d1" | "1d" | "1day" => Ok(Timeframe::OneDay),
            _ => Err(anyhow!(
                "Invalid timeframe: {}. Valid: tick, M1, M5, M15, H1, H4, D1",
                s
            )),
        }
    }
}
