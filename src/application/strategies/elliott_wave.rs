use super::scoring::protective_levels;
use super::traits::{AnalysisContext, TradingStrategy};
use crate::domain::errors::AnalysisError;
use crate::domain::trading::types::{RiskLevel, SignalKind, TradingSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavePattern {
    Impulse,
    Corrective,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveCount {
    pub wave: u32,
    pub pattern: WavePattern,
    pub confidence: f64,
    pub trend_changes: usize,
}

/// Simplified Elliott-wave counter.
///
/// Counts direction changes over the trailing closes; the wave number is
/// `min(5, changes / 2 + 1)`. The window is an impulse when the net move exceeds
/// ten average steps.
#[derive(Debug, Clone)]
pub struct ElliottWaveStrategy {
    pub window: usize,
}

impl Default for ElliottWaveStrategy {
    fn default() -> Self {
        Self { window: 50 }
    }
}

impl ElliottWaveStrategy {
    pub fn identify_waves(&self, closes: &[f64]) -> WaveCount {
        if closes.len() < self.window || closes.len() < 2 {
            return WaveCount {
                wave: 0,
                pattern: WavePattern::Unknown,
                confidence: 0.0,
                trend_changes: 0,
            };
        }

        let recent = &closes[closes.len() - self.window..];
        let steps: Vec<f64> = recent.windows(2).map(|w| w[1] - w[0]).collect();
        // Zero steps count as their own direction
        let signs: Vec<i8> = steps
            .iter()
            .map(|s| match s.partial_cmp(&0.0) {
                Some(std::cmp::Ordering::Greater) => 1,
                Some(std::cmp::Ordering::Less) => -1,
                _ => 0,
            })
            .collect();
        let trend_changes = signs.windows(2).filter(|w| w[0] != w[1]).count();
        let wave = (trend_changes / 2 + 1).min(5) as u32;

        let total_move = recent[recent.len() - 1] - recent[0];
        let avg_move = steps.iter().map(|s| s.abs()).sum::<f64>() / steps.len() as f64;

        let (pattern, confidence) = if total_move.abs() > avg_move * 10.0 {
            (WavePattern::Impulse, 70.0)
        } else {
            (WavePattern::Corrective, 60.0)
        };

        WaveCount {
            wave,
            pattern,
            confidence,
            trend_changes,
        }
    }
}

impl TradingStrategy for ElliottWaveStrategy {
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<TradingSignal, AnalysisError> {
        let closes = ctx.frame.closes();
        let count = self.identify_waves(&closes);
        let mut reasoning = Vec::new();

        let (kind, confidence) = match (count.pattern, count.wave) {
            (WavePattern::Impulse, 1 | 3 | 5) => {
                reasoning.push(format!("Wave {} of impulse pattern", count.wave));
                reasoning.push("Trend continuation expected".to_string());
                (SignalKind::Buy, (count.confidence + 15.0).min(85.0))
            }
            (WavePattern::Impulse, wave) => {
                reasoning.push(format!("Wave {} correction in progress", wave));
                reasoning.push("Wait for wave completion".to_string());
                (SignalKind::Hold, count.confidence)
            }
            (WavePattern::Corrective, _) => {
                reasoning.push("ABC correction pattern detected".to_string());
                reasoning.push("Wait for new impulse wave".to_string());
                (SignalKind::Hold, count.confidence)
            }
            (WavePattern::Unknown, _) => {
                reasoning.push(format!(
                    "Insufficient data for wave count ({} < {})",
                    closes.len(),
                    self.window
                ));
                (SignalKind::Hold, 0.0)
            }
        };
        let risk_level = match kind {
            SignalKind::Hold => RiskLevel::High,
            _ => RiskLevel::Medium,
        };

        let price = ctx.current_price;
        let snapshot = ctx.frame.latest();
        let atr = snapshot.map(|s| s.atr).unwrap_or(0.0);
        let (stop_loss, take_profit) = protective_levels(kind, price, atr);

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
            fibonacci_levels: None,
            elliott_wave_count: Some(count.wave),
        })
    }

    fn name(&self) -> &str {
        "Elliott Wave"
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
    fn test_straight_line_is_impulse_wave_one() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let count = ElliottWaveStrategy::default().identify_waves(&closes);
        assert_eq!(count.trend_changes, 0);
        assert_eq!(count.wave, 1);
        assert_eq!(count.pattern, WavePattern::Impulse);

        let frame = frame(&closes);
        let signal = ElliottWaveStrategy::default()
            .analyze(&AnalysisContext::new("XAUUSD", &frame, 149.0))
            .unwrap();
        assert_eq!(signal.signal, SignalKind::Buy);
        assert_eq!(signal.confidence, 85.0);
        assert_eq!(signal.elliott_wave_count, Some(1));
    }

    #[test]
    fn test_impulse_wave_two_holds() {
        // Up 20, down 5, up 24: two direction changes -> wave 2
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        closes.extend((1..=5).map(|i| 119.0 - i as f64));
        closes.extend((1..=25).map(|i| 114.0 + i as f64));
        let count = ElliottWaveStrategy::default().identify_waves(&closes);
        assert_eq!(count.trend_changes, 2);
        assert_eq!(count.wave, 2);
        assert_eq!(count.pattern, WavePattern::Impulse);

        let frame = frame(&closes);
        let signal = ElliottWaveStrategy::default()
            .analyze(&AnalysisContext::new("XAUUSD", &frame, 139.0))
            .unwrap();
        assert_eq!(signal.signal, SignalKind::Hold);
        assert_eq!(signal.confidence, 70.0);
    }

    #[test]
    fn test_zigzag_is_corrective() {
        let closes: Vec<f64> = (0..50)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let count = ElliottWaveStrategy::default().identify_waves(&closes);
        assert_eq!(count.pattern, WavePattern::Corrective);
        assert_eq!(count.wave, 5);
    }

    #[test]
    fn test_short_history_holds_at_zero() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let frame = frame(&closes);
        let signal = ElliottWaveStrategy::default()
            .analyze(&AnalysisContext::new("XAUUSD", &frame, 129.0))
            .unwrap();
        assert_eq!(signal.signal, SignalKind::Hold);
        assert_eq!(signal.confidence, 0.0);
        assert_eq!(signal.elliott_wave_count, Some(0));
    }
}
