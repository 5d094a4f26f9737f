use super::scoring::protective_levels;
use super::traits::{AnalysisContext, TradingStrategy};
use crate::domain::errors::AnalysisError;
use crate::domain::trading::types::{RiskLevel, SignalKind, TradingSignal};
use std::collections::BTreeMap;

const RATIOS: [(&str, f64); 9] = [
    ("0.0", 0.0),
    ("23.6", 0.236),
    ("38.2", 0.382),
    ("50.0", 0.5),
    ("61.8", 0.618),
    ("78.6", 0.786),
    ("100.0", 1.0),
    ("161.8", 1.618),
    ("261.8", 2.618),
];

const GOLDEN_LEVELS: [&str; 3] = ["38.2", "50.0", "61.8"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingTrend {
    Up,
    Down,
}

/// Retracement/extension levels of a swing.
///
/// In an uptrend levels are measured up from the low; in a downtrend down from
/// the high. A zero-height swing is widened to 1e-8.
pub fn fibonacci_levels(high: f64, low: f64, trend: SwingTrend) -> BTreeMap<String, f64> {
    let diff = if high != low { high - low } else { 1e-8 };
    RATIOS
        .iter()
        .map(|&(name, ratio)| {
            let price = match trend {
                SwingTrend::Up => low + diff * ratio,
                SwingTrend::Down => high - diff * ratio,
            };
            (name.to_string(), price)
        })
        .collect()
}

/// Closest level to `price` with its distance in percent of `price`.
pub fn nearest_level(price: f64, levels: &BTreeMap<String, f64>) -> Option<(String, f64, f64)> {
    levels
        .iter()
        .min_by(|a, b| (a.1 - price).abs().total_cmp(&(b.1 - price).abs()))
        .map(|(name, &level)| {
            let distance_pct = if price != 0.0 {
                (price - level).abs() / price * 100.0
            } else {
                0.0
            };
            (name.clone(), level, distance_pct)
        })
}

/// Fibonacci retracement analyzer.
///
/// Trades only near a golden level (38.2 / 50 / 61.8): BUY in an uptrend swing,
/// SELL in a downtrend swing, both at confidence 85.
#[derive(Debug, Clone)]
pub struct FibonacciStrategy {
    pub lookback: usize,
    pub proximity_pct: f64,
}

impl Default for FibonacciStrategy {
    fn default() -> Self {
        Self {
            lookback: 50,
            proximity_pct: 0.5,
        }
    }
}

impl FibonacciStrategy {
    pub fn new(lookback: usize, proximity_pct: f64) -> Self {
        Self {
            lookback: lookback.max(1),
            proximity_pct,
        }
    }
}

impl TradingStrategy for FibonacciStrategy {
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<TradingSignal, AnalysisError> {
        let candles = ctx.frame.candles();
        if candles.is_empty() {
            return Err(AnalysisError::InsufficientData {
                required: 1,
                available: 0,
            });
        }
        let window = &candles[candles.len().saturating_sub(self.lookback.max(1))..];

        let (mut high_idx, mut low_idx) = (0, 0);
        for (i, c) in window.iter().enumerate() {
            if c.high > window[high_idx].high {
                high_idx = i;
            }
            if c.low < window[low_idx].low {
                low_idx = i;
            }
        }
        let swing_high = window[high_idx].high;
        let swing_low = window[low_idx].low;
        let trend = if low_idx <= high_idx {
            SwingTrend::Up
        } else {
            SwingTrend::Down
        };

        let price = ctx.current_price;
        let levels = fibonacci_levels(swing_high, swing_low, trend);
        let (level_name, level_price, distance_pct) =
            nearest_level(price, &levels).ok_or_else(|| AnalysisError::AnalyzerFailure {
                strategy: self.name().to_string(),
                reason: "no Fibonacci levels".to_string(),
            })?;

        let mut reasoning = vec![format!(
            "Swing {:.5} -> {:.5} ({})",
            swing_low,
            swing_high,
            match trend {
                SwingTrend::Up => "uptrend",
                SwingTrend::Down => "downtrend",
            }
        )];

        let golden = GOLDEN_LEVELS.contains(&level_name.as_str());
        let (kind, confidence, risk_level) = if golden && distance_pct < self.proximity_pct {
            reasoning.push(format!(
                "Price at {}% Fibonacci retracement (Golden Ratio)",
                level_name
            ));
            match trend {
                SwingTrend::Up => {
                    reasoning.push("Strong support level - High probability bounce".to_string());
                    (SignalKind::Buy, 85.0, RiskLevel::Medium)
                }
                SwingTrend::Down => {
                    reasoning
                        .push("Strong resistance level - High probability rejection".to_string());
                    (SignalKind::Sell, 85.0, RiskLevel::Medium)
                }
            }
        } else {
            reasoning.push(format!(
                "Nearest level {}% at {:.5} ({:.2}% away)",
                level_name, level_price, distance_pct
            ));
            (SignalKind::Hold, 50.0, RiskLevel::High)
        };

        let snapshot = ctx.frame.latest();
        let atr = snapshot.map(|s| s.atr).unwrap_or(0.0);
        let (stop_loss, mut take_profit) = protective_levels(kind, price, atr);
        // The swing extreme is the natural target when it lies beyond the entry
        match kind {
            SignalKind::Buy if swing_high > price => take_profit = swing_high,
            SignalKind::Sell if swing_low < price => take_profit = swing_low,
            _ => {}
        }

        Ok(TradingSignal {
            signal: kind,
            confidence,
            risk_level,
            strategy_name: self.name().to_string(),
            entry_price: price,
            stop_loss,
            take_profit,
            reasoning,
            indicator_snapshot: snapshot,
            fibonacci_levels: Some(levels),
            elliott_wave_count: None,
        })
    }

    fn name(&self) -> &str {
        "Fibonacci"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::indicator_frame::IndicatorFrame;
    use crate::domain::trading::types::Candle;
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
    fn test_levels_up_and_down() {
        let up = fibonacci_levels(200.0, 100.0, SwingTrend::Up);
        assert_eq!(up["0.0"], 100.0);
        assert_eq!(up["50.0"], 150.0);
        assert_eq!(up["100.0"], 200.0);
        assert!((up["161.8"] - 261.8).abs() < 1e-9);

        let down = fibonacci_levels(200.0, 100.0, SwingTrend::Down);
        assert_eq!(down["0.0"], 200.0);
        assert!((down["61.8"] - 138.2).abs() < 1e-9);
        assert_eq!(down["100.0"], 100.0);
    }

    #[test]
    fn test_buy_at_golden_level_in_uptrend() {
        // Low first, then high: uptrend from 100 to 196, 50% level at 148
        let mut closes: Vec<f64> = (0..=48).map(|i| 100.0 + i as f64 * 2.0).collect();
        closes.push(148.2);
        let frame = frame(&closes);
        let ctx = AnalysisContext::new("XAUUSD", &frame, 148.2);
        let signal = FibonacciStrategy::default().analyze(&ctx).unwrap();

        assert_eq!(signal.signal, SignalKind::Buy);
        assert_eq!(signal.confidence, 85.0);
        assert!(signal.fibonacci_levels.is_some());
        assert!(signal.stop_loss < 148.2);
        assert_eq!(signal.take_profit, 196.0);
    }

    #[test]
    fn test_sell_at_golden_level_in_downtrend() {
        // High first, then low: 50% level of 200 -> 104 sits at 152
        let mut closes: Vec<f64> = (0..=48).map(|i| 200.0 - i as f64 * 2.0).collect();
        closes.push(152.0);
        let frame = frame(&closes);
        let ctx = AnalysisContext::new("XAUUSD", &frame, 152.0);
        let signal = FibonacciStrategy::default().analyze(&ctx).unwrap();

        assert_eq!(signal.signal, SignalKind::Sell);
        assert_eq!(signal.confidence, 85.0);
        assert_eq!(signal.take_profit, 104.0);
    }

    #[test]
    fn test_zero_lookback_uses_last_candle() {
        assert_eq!(FibonacciStrategy::new(0, 0.5).lookback, 1);

        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let frame = frame(&closes);
        let ctx = AnalysisContext::new("XAUUSD", &frame, 129.0);
        let strategy = FibonacciStrategy {
            lookback: 0,
            proximity_pct: 0.5,
        };
        let signal = strategy.analyze(&ctx).unwrap();
        assert_eq!(signal.strategy_name, "Fibonacci");
        assert!(signal.reasoning[0].starts_with("Swing 129.00000 -> 129.00000"));
    }

    #[test]
    fn test_hold_away_from_golden_levels() {
        let closes: Vec<f64> = (0..=48).map(|i| 100.0 + i as f64 * 2.0).collect();
        let frame = frame(&closes);
        // At the swing high: nearest level is 100.0, not golden
        let ctx = AnalysisContext::new("XAUUSD", &frame, 196.0);
        let signal = FibonacciStrategy::default().analyze(&ctx).unwrap();
        assert_eq!(signal.signal, SignalKind::Hold);
        assert_eq!(signal.confidence, 50.0);
        assert_eq!(signal.stop_loss, signal.entry_price);
    }
}
