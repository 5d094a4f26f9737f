use super::scoring::{ScoreCard, SignalDraft};
use super::traits::{AnalysisContext, TradingStrategy};
use crate::domain::errors::AnalysisError;
use crate::domain::trading::types::TradingSignal;

/// Composite multi-indicator scoring.
///
/// Trend (EMA ordering), momentum (RSI), MACD crossover, Bollinger penetration,
/// stochastic extremes and ADX strength each add or subtract points; the total
/// goes through the shared score table.
///
/// An RSI reading strictly between 40 and 60 adds +5 regardless of direction.
#[derive(Debug, Clone)]
pub struct MultiIndicatorStrategy {
    pub min_candles: usize,
}

impl Default for MultiIndicatorStrategy {
    fn default() -> Self {
        Self { min_candles: 50 }
    }
}

impl MultiIndicatorStrategy {
    pub fn new(min_candles: usize) -> Self {
        Self { min_candles }
    }

    pub fn score(&self, ctx: &AnalysisContext<'_>) -> Result<ScoreCard, AnalysisError> {
        let current = ctx.latest(self.name())?;
        let previous = ctx.previous(self.name())?;
        let close = ctx.frame.last_close().unwrap_or(ctx.current_price);
        let mut card = ScoreCard::new();

        if current.ema_20 > current.ema_50 && current.ema_50 > current.ema_200 {
            card.add(25.0, "Strong Uptrend (EMA20 > EMA50 > EMA200)");
        } else if current.ema_20 < current.ema_50 && current.ema_50 < current.ema_200 {
            card.add(-25.0, "Strong Downtrend (EMA20 < EMA50 < EMA200)");
        } else if current.ema_20 > current.ema_50 {
            card.add(15.0, "Bullish Trend (EMA20 > EMA50)");
        } else {
            card.add(-15.0, "Bearish Trend (EMA20 <= EMA50)");
        }

        if current.rsi < 30.0 {
            card.add(20.0, format!("Oversold (RSI {:.1} < 30) - Potential Buy", current.rsi));
        } else if current.rsi > 70.0 {
            card.add(-20.0, format!("Overbought (RSI {:.1} > 70) - Potential Sell", current.rsi));
        } else if current.rsi > 40.0 && current.rsi < 60.0 {
            card.add(5.0, "RSI Neutral - No clear momentum");
        }

        if current.macd > current.macd_signal && previous.macd <= previous.macd_signal {
            card.add(20.0, "MACD Bullish Crossover");
        } else if current.macd < current.macd_signal && previous.macd >= previous.macd_signal {
            card.add(-20.0, "MACD Bearish Crossover");
        }

        if close < current.bb_lower {
            card.add(15.0, "Below Lower BB - Potential Rebound");
        } else if close > current.bb_upper {
            card.add(-15.0, "Above Upper BB - Potential Pullback");
        }

        if current.stoch_k < 20.0 && current.stoch_d < 20.0 {
            card.add(10.0, "Stochastic Oversold");
        } else if current.stoch_k > 80.0 && current.stoch_d > 80.0 {
            card.add(-10.0, "Stochastic Overbought");
        }

        if current.adx > 25.0 {
            card.add(5.0, format!("Strong Trend (ADX: {:.1})", current.adx));
        }

        Ok(card)
    }
}

impl TradingStrategy for MultiIndicatorStrategy {
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<TradingSignal, AnalysisError> {
        if ctx.frame.len() < self.min_candles {
            let mut signal =
                TradingSignal::hold(self.name(), ctx.current_price, "Insufficient data");
            signal.reasoning.push(format!(
                "Need {} candles, have {}",
                self.min_candles,
                ctx.frame.len()
            ));
            return Ok(signal);
        }

        let card = self.score(ctx)?;
        let snapshot = ctx.frame.latest();
        Ok(SignalDraft::from_score(card).finish(self.name(), ctx.current_price, snapshot))
    }

    fn name(&self) -> &str {
        "Multi-Indicator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::indicator_frame::{IndicatorFrame, IndicatorSeries};
    use crate::domain::trading::types::{Candle, RiskLevel, SignalKind};
    use chrono::{Duration, TimeZone, Utc};

    /// Frame of `len` flat candles at `close` whose last two indicator rows are given.
    fn frame_with(len: usize, close: f64, fill: impl Fn(&mut IndicatorSeries)) -> IndicatorFrame {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles = (0..len)
            .map(|i| Candle::flat(t0 + Duration::minutes(i as i64), close, 1.0))
            .collect();
        let mut series = IndicatorSeries {
            ema_20: vec![close; len],
            ema_50: vec![close; len],
            ema_200: vec![close; len],
            macd: vec![0.0; len],
            macd_signal: vec![0.0; len],
            macd_histogram: vec![0.0; len],
            rsi: vec![50.0; len],
            bb_middle: vec![close; len],
            bb_upper: vec![close + 10.0; len],
            bb_lower: vec![close - 10.0; len],
            stoch_k: vec![50.0; len],
            stoch_d: vec![50.0; len],
            atr: vec![1.0; len],
            adx: vec![20.0; len],
            tenkan_sen: vec![close; len],
            kijun_sen: vec![close; len],
        };
        fill(&mut series);
        IndicatorFrame::new(candles, Some(series))
    }

    #[test]
    fn test_uptrend_with_oversold_rsi_is_strong_buy() {
        let frame = frame_with(60, 100.0, |s| {
            *s.ema_20.last_mut().unwrap() = 103.0;
            *s.ema_50.last_mut().unwrap() = 102.0;
            *s.ema_200.last_mut().unwrap() = 101.0;
            *s.rsi.last_mut().unwrap() = 25.0;
        });
        let ctx = AnalysisContext::new("XAUUSD", &frame, 100.0);
        let signal = MultiIndicatorStrategy::default().analyze(&ctx).unwrap();

        // 25 (trend) + 20 (RSI) = 45
        assert_eq!(signal.signal, SignalKind::StrongBuy);
        assert_eq!(signal.confidence, 95.0);
        assert_eq!(signal.risk_level, RiskLevel::Low);
        assert_eq!(signal.stop_loss, 98.0);
        assert_eq!(signal.take_profit, 103.0);
        assert!(signal.reasoning.iter().any(|r| r.contains("Strong Uptrend")));
    }

    #[test]
    fn test_neutral_rsi_band_adds_in_buy_direction() {
        // Flat EMAs fall through to the bearish branch (-15); neutral RSI adds +5
        let frame = frame_with(60, 100.0, |_| {});
        let ctx = AnalysisContext::new("XAUUSD", &frame, 100.0);
        let card = MultiIndicatorStrategy::default().score(&ctx).unwrap();
        assert_eq!(card.score(), -10.0);
    }

    #[test]
    fn test_bearish_confluence_is_strong_sell() {
        let frame = frame_with(60, 100.0, |s| {
            *s.ema_20.last_mut().unwrap() = 97.0;
            *s.ema_50.last_mut().unwrap() = 98.0;
            *s.ema_200.last_mut().unwrap() = 99.0;
            *s.rsi.last_mut().unwrap() = 75.0;
            *s.macd.last_mut().unwrap() = -1.0;
            *s.stoch_k.last_mut().unwrap() = 90.0;
            *s.stoch_d.last_mut().unwrap() = 85.0;
        });
        let ctx = AnalysisContext::new("XAUUSD", &frame, 100.0);
        let signal = MultiIndicatorStrategy::default().analyze(&ctx).unwrap();

        // -25 - 20 - 20 (crossover) - 10 = -75
        assert_eq!(signal.signal, SignalKind::StrongSell);
        assert_eq!(signal.confidence, 95.0);
        assert!(signal.stop_loss > signal.entry_price);
        assert!(signal.take_profit < signal.entry_price);
    }

    #[test]
    fn test_short_history_holds() {
        let frame = frame_with(30, 100.0, |_| {});
        let ctx = AnalysisContext::new("XAUUSD", &frame, 100.0);
        let signal = MultiIndicatorStrategy::default().analyze(&ctx).unwrap();
        assert_eq!(signal.signal, SignalKind::Hold);
        assert_eq!(signal.confidence, 0.0);
    }

    #[test]
    fn test_missing_series_is_an_error() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles = (0..60)
            .map(|i| Candle::flat(t0 + Duration::minutes(i), 100.0, 1.0))
            .collect();
        let frame = IndicatorFrame::new(candles, None);
        let ctx = AnalysisContext::new("XAUUSD", &frame, 100.0);
        assert!(matches!(
            MultiIndicatorStrategy::default().analyze(&ctx),
            Err(AnalysisError::MissingIndicators { .. })
        ));
    }
}
