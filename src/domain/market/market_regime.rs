use crate::domain::market::indicator_frame::IndicatorFrame;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution};
use std::fmt;

/// Represents the current market regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegimeType {
    StrongTrend,
    Trending,
    Volatile,
    Ranging,
    Transitional,
    Unknown,
}

impl fmt::Display for MarketRegimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketRegimeType::StrongTrend => write!(f, "strong_trend"),
            MarketRegimeType::Trending => write!(f, "trending"),
            MarketRegimeType::Volatile => write!(f, "volatile"),
            MarketRegimeType::Ranging => write!(f, "ranging"),
            MarketRegimeType::Transitional => write!(f, "transitional"),
            MarketRegimeType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Regime classification of the trailing window. Recomputed on every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeAssessment {
    pub regime: MarketRegimeType,
    /// 0..=100
    pub confidence: f64,
    /// Std-dev of period returns, in percent
    pub volatility: f64,
    /// Latest ADX reading
    pub trend_strength: f64,
    /// |last / first - 1| over the window, in percent
    pub price_change_pct: f64,
}

impl RegimeAssessment {
    pub fn new(
        regime: MarketRegimeType,
        confidence: f64,
        volatility: f64,
        trend_strength: f64,
        price_change_pct: f64,
    ) -> Self {
        Self {
            regime,
            confidence: confidence.clamp(0.0, 100.0),
            volatility,
            trend_strength,
            price_change_pct,
        }
    }

    pub fn unknown() -> Self {
        Self {
            regime: MarketRegimeType::Unknown,
            confidence: 0.0,
            volatility: 0.0,
            trend_strength: 0.0,
            price_change_pct: 0.0,
        }
    }
}

/// Classifies the trailing window of an indicator frame.
#[derive(Debug, Clone)]
pub struct MarketRegimeDetector {
    window_size: usize,
    default_adx: f64,
}

impl Default for MarketRegimeDetector {
    fn default() -> Self {
        Self::new(50)
    }
}

impl MarketRegimeDetector {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(2),
            default_adx: 25.0,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// First matching branch wins:
    /// strong trend, trending, volatile, ranging, then transitional.
    pub fn detect(&self, frame: &IndicatorFrame) -> RegimeAssessment {
        let candles = frame.candles();
        if candles.len() < self.window_size {
            return RegimeAssessment::unknown();
        }

        let recent = &candles[candles.len() - self.window_size..];
        let first = recent[0].close;
        let last = recent[recent.len() - 1].close;

        let returns: Vec<f64> = recent
            .windows(2)
            .filter(|w| w[0].close != 0.0)
            .map(|w| w[1].close / w[0].close - 1.0)
            .collect();
        let volatility = Data::new(returns)
            .std_dev()
            .filter(|sd| sd.is_finite())
            .map(|sd| sd * 100.0)
            .unwrap_or(0.0);

        let price_change_pct = if first != 0.0 {
            ((last - first) / first).abs() * 100.0
        } else {
            0.0
        };

        let adx = frame
            .series()
            .and_then(|s| s.adx.last().copied())
            .filter(|v| !v.is_nan())
            .unwrap_or(self.default_adx);

        let (regime, confidence) = if adx > 40.0 && price_change_pct > 2.0 {
            (MarketRegimeType::StrongTrend, 85.0)
        } else if adx > 25.0 && price_change_pct > 1.0 {
            (MarketRegimeType::Trending, 75.0)
        } else if volatility > 3.0 {
            (MarketRegimeType::Volatile, 70.0)
        } else if volatility < 1.0 && price_change_pct < 0.5 {
            (MarketRegimeType::Ranging, 80.0)
        } else {
            (MarketRegimeType::Transitional, 60.0)
        };

        RegimeAssessment::new(regime, confidence, volatility, adx, price_change_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::indicator_frame::IndicatorSeries;
    use crate::domain::trading::types::Candle;
    use chrono::{Duration, TimeZone, Utc};

    fn frame_from_closes(closes: &[f64], adx: Option<f64>) -> IndicatorFrame {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::flat(t0 + Duration::minutes(i as i64), c, 1.0))
            .collect();
        let series = adx.map(|value| IndicatorSeries {
            adx: vec![value; closes.len()],
            ..Default::default()
        });
        IndicatorFrame::new(candles, series)
    }

    #[test]
    fn test_short_history_is_unknown() {
        let frame = frame_from_closes(&[100.0; 49], Some(50.0));
        let regime = MarketRegimeDetector::default().detect(&frame);
        assert_eq!(regime.regime, MarketRegimeType::Unknown);
        assert_eq!(regime.confidence, 0.0);
    }

    #[test]
    fn test_strong_trend_needs_adx_and_move() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.1).collect();
        let frame = frame_from_closes(&closes, Some(45.0));
        let regime = MarketRegimeDetector::default().detect(&frame);
        assert_eq!(regime.regime, MarketRegimeType::StrongTrend);
        assert_eq!(regime.confidence, 85.0);
        assert!(regime.price_change_pct > 2.0);
    }

    #[test]
    fn test_trending_branch() {
        // ~1.5% move over the window with moderate ADX
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64 * 0.03).collect();
        let frame = frame_from_closes(&closes, Some(30.0));
        let regime = MarketRegimeDetector::default().detect(&frame);
        assert_eq!(regime.regime, MarketRegimeType::Trending);
        assert_eq!(regime.confidence, 75.0);
    }

    #[test]
    fn test_flat_market_is_ranging_with_default_adx() {
        // No indicator series: ADX falls back to 25, which never satisfies "> 25"
        let frame = frame_from_closes(&[100.0; 50], None);
        let regime = MarketRegimeDetector::default().detect(&frame);
        assert_eq!(regime.regime, MarketRegimeType::Ranging);
        assert_eq!(regime.trend_strength, 25.0);
    }

    #[test]
    fn test_whipsaw_is_volatile() {
        let closes: Vec<f64> = (0..50)
            .map(|i| if i % 2 == 0 { 100.0 } else { 105.0 })
            .collect();
        let frame = frame_from_closes(&closes, Some(10.0));
        let regime = MarketRegimeDetector::default().detect(&frame);
        assert_eq!(regime.regime, MarketRegimeType::Volatile);
        assert!(regime.volatility > 3.0);
    }

    #[test]
    fn test_nan_adx_defaults_to_25() {
        let frame = frame_from_closes(&[100.0; 50], Some(f64::NAN));
        let regime = MarketRegimeDetector::default().detect(&frame);
        assert_eq!(regime.trend_strength, 25.0);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 / 5.0).sin()).collect();
        let frame = frame_from_closes(&closes, Some(20.0));
        let detector = MarketRegimeDetector::default();
        assert_eq!(detector.detect(&frame), detector.detect(&frame));
    }
}
