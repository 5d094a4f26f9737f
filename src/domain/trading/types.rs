use crate::domain::market::indicator_frame::IndicatorSnapshot;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single bid/ask observation from the tick source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub bid: f64,
    pub ask: f64,
    pub timestamp: DateTime<Utc>,
    pub volume: f64,
}

impl Tick {
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

/// Fixed-interval OHLC aggregate.
///
/// Invariant: `low <= min(open, close)` and `high >= max(open, close)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Single-price candle (every OHLC field equal to `price`).
    pub fn flat(open_time: DateTime<Utc>, price: f64, volume: f64) -> Self {
        Self {
            open_time,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.low <= self.open.min(self.close) && self.high >= self.open.max(self.close)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl SignalKind {
    /// Position side this signal would open, if any.
    pub fn direction(&self) -> Option<PositionSide> {
        match self {
            SignalKind::StrongBuy | SignalKind::Buy => Some(PositionSide::Long),
            SignalKind::StrongSell | SignalKind::Sell => Some(PositionSide::Short),
            SignalKind::Hold => None,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.direction().is_some()
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::StrongBuy => write!(f, "STRONG_BUY"),
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Hold => write!(f, "HOLD"),
            SignalKind::Sell => write!(f, "SELL"),
            SignalKind::StrongSell => write!(f, "STRONG_SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Output of one evaluation cycle. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSignal {
    pub signal: SignalKind,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub strategy_name: String,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub reasoning: Vec<String>,
    pub indicator_snapshot: Option<IndicatorSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fibonacci_levels: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elliott_wave_count: Option<u32>,
}

impl TradingSignal {
    /// HOLD at zero confidence with every price level pinned to `price`.
    pub fn hold(strategy_name: impl Into<String>, price: f64, reason: impl Into<String>) -> Self {
        Self {
            signal: SignalKind::Hold,
            confidence: 0.0,
            risk_level: RiskLevel::High,
            strategy_name: strategy_name.into(),
            entry_price: price,
            stop_loss: price,
            take_profit: price,
            reasoning: vec![reason.into()],
            indicator_snapshot: None,
            fibonacci_levels: None,
            elliott_wave_count: None,
        }
    }

    /// Returned before any analyzer runs when history is too short.
    pub fn insufficient_data(entry_price: f64) -> Self {
        Self {
            signal: SignalKind::Hold,
            confidence: 0.0,
            risk_level: RiskLevel::High,
            strategy_name: "None".to_string(),
            entry_price,
            stop_loss: 0.0,
            take_profit: 0.0,
            reasoning: vec!["Insufficient data".to_string()],
            indicator_snapshot: None,
            fibonacci_levels: None,
            elliott_wave_count: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// Simulated open position. Only the position manager mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub symbol: String,
    pub entry_price: Decimal,
    pub side: PositionSide,
    pub size: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub entry_time: DateTime<Utc>,
    pub strategy_name: String,
    pub running_profit: Decimal,
}

impl Position {
    /// Profit at `price`, sign-flipped for shorts.
    pub fn profit_at(&self, price: Decimal) -> Decimal {
        match self.side {
            PositionSide::Long => (price - self.entry_price) * self.size,
            PositionSide::Short => (self.entry_price - price) * self.size,
        }
    }

    /// Exit reason if `price` has crossed the stop or the target.
    pub fn exit_trigger(&self, price: Decimal) -> Option<ExitReason> {
        match self.side {
            PositionSide::Long if price <= self.stop_loss => Some(ExitReason::StopLoss),
            PositionSide::Long if price >= self.take_profit => Some(ExitReason::TakeProfit),
            PositionSide::Short if price >= self.stop_loss => Some(ExitReason::StopLoss),
            PositionSide::Short if price <= self.take_profit => Some(ExitReason::TakeProfit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop-loss"),
            ExitReason::TakeProfit => write!(f, "take-profit"),
        }
    }
}

/// Immutable record of a closed position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,
    pub side: PositionSide,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub size: Decimal,
    pub profit: Decimal,
    pub exit_reason: ExitReason,
    pub strategy_name: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
}
