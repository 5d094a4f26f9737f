use super::scoring::{ScoreCard, SignalDraft};
use super::traits::{AnalysisContext, TradingStrategy};
use crate::domain::errors::AnalysisError;
use crate::domain::trading::types::TradingSignal;

/// Breakout Strategy
///
/// Scores a range break out of consolidation:
/// - Close outside the Bollinger bands
/// - Close beyond the prior `lookback` candles' high/low
/// - Volume above `volume_multiplier` x the prior average, in the candle's direction
/// - ADX above threshold, in the direction of the EMA20/EMA50 spread
/// - MACD histogram sign
#[derive(Debug, Clone)]
pub struct BreakoutStrategy {
    pub lookback_period: usize,
    pub volume_multiplier: f64,
    pub adx_threshold: f64,
}

impl Default for BreakoutStrategy {
    fn default() -> Self {
        Self {
            lookback_period: 20,
            volume_multiplier: 1.5,
            adx_threshold: 25.0,
        }
    }
}

impl BreakoutStrategy {
    pub fn new(lookback_period: usize, volume_multiplier: f64, adx_threshold: f64) -> Self {
        Self {
            lookback_period: lookback_period.max(1),
            volume_multiplier,
            adx_threshold,
        }
    }

    /// Highest high, lowest low and mean volume of the candles before the last one.
    fn prior_range(&self, ctx: &AnalysisContext<'_>) -> Option<(f64, f64, f64)> {
        let candles = ctx.frame.candles();
        let prior = &candles[..candles.len().checked_sub(1)?];
        if prior.is_empty() {
            return None;
        }
        let window = &prior[prior.len().saturating_sub(self.lookback_period)..];

        let highest_high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let lowest_low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        let avg_volume = window.iter().map(|c| c.volume).sum::<f64>() / window.len() as f64;
        Some((highest_high, lowest_low, avg_volume))
    }

    pub fn score(&self, ctx: &AnalysisContext<'_>) -> Result<ScoreCard, AnalysisError> {
        let current = ctx.latest(self.name())?;
        let last = ctx
            .frame
            .candles()
            .last()
            .ok_or(AnalysisError::InsufficientData {
                required: 2,
                available: 0,
            })?;
        let (highest_high, lowest_low, avg_volume) =
            self.prior_range(ctx).ok_or(AnalysisError::InsufficientData {
                required: 2,
                available: ctx.frame.len(),
            })?;
        let close = last.close;
        let mut card = ScoreCard::new();

        if close > current.bb_upper {
            card.add(
                30.0,
                format!("Close {:.5} above upper band {:.5}", close, current.bb_upper),
            );
        } else if close < current.bb_lower {
            card.add(
                -30.0,
                format!("Close {:.5} below lower band {:.5}", close, current.bb_lower),
            );
        }

        if close > highest_high {
            card.add(
                25.0,
                format!(
                    "Breakout: {:.5} > {}-bar high {:.5}",
                    close, self.lookback_period, highest_high
                ),
            );
        } else if close < lowest_low {
            card.add(
                -25.0,
                format!(
                    "Breakdown: {:.5} < {}-bar low {:.5}",
                    close, self.lookback_period, lowest_low
                ),
            );
        }

        if avg_volume > 0.0 && last.volume > avg_volume * self.volume_multiplier {
            let note = format!(
                "Volume {:.0} > {:.1}x avg {:.0}",
                last.volume, self.volume_multiplier, avg_volume
            );
            if last.close > last.open {
                card.add(15.0, note);
            } else if last.close < last.open {
                card.add(-15.0, note);
            }
        }

        if current.adx > self.adx_threshold {
            let spread = current.ema_20 - current.ema_50;
            if spread > 0.0 {
                card.add(
                    10.0,
                    format!("Trend strength ADX {:.1}, EMA20 > EMA50", current.adx),
                );
            } else if spread < 0.0 {
                card.add(
                    -10.0,
                    format!("Trend strength ADX {:.1}, EMA20 < EMA50", current.adx),
                );
            }
        }

        if current.macd_histogram > 0.0 {
            card.add(10.0, "MACD histogram positive");
        } else if current.macd_histogram < 0.0 {
            card.add(-10.0, "MACD histogram negative");
        }

        Ok(card)
    }
}

impl TradingStrategy for BreakoutStrategy {
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<TradingSignal, AnalysisError> {
        let card = self.score(ctx)?;
        let snapshot = ctx.frame.latest();
        Ok(SignalDraft::from_score(card).finish(self.name(), ctx.current_price, snapshot))
    }

    fn name(&self) -> &str {
        "Breakout"
    }
}
