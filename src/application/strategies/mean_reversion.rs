use super::scoring::{ScoreCard, SignalDraft};
use super::traits::{AnalysisContext, TradingStrategy};
use crate::domain::errors::AnalysisError;
use crate::domain::trading::types::TradingSignal;

/// Mean Reversion Strategy
///
/// Fades extremes: band penetration, RSI and stochastic extremes, and a close
/// stretched more than one ATR from the Kijun baseline all score toward the
/// opposite direction.
#[derive(Debug, Clone)]
pub struct MeanReversionStrategy {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub stoch_oversold: f64,
    pub stoch_overbought: f64,
}

impl Default for MeanReversionStrategy {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            stoch_oversold: 20.0,
            stoch_overbought: 80.0,
        }
    }
}

impl MeanReversionStrategy {
    pub fn score(&self, ctx: &AnalysisContext<'_>) -> Result<ScoreCard, AnalysisError> {
        let current = ctx.latest(self.name())?;
        let close = ctx.frame.last_close().unwrap_or(ctx.current_price);
        let mut card = ScoreCard::new();

        if close < current.bb_lower {
            card.add(
                30.0,
                format!(
                    "Close {:.5} below lower band - expect reversion to {:.5}",
                    close, current.bb_middle
                ),
            );
        } else if close > current.bb_upper {
            card.add(
                -30.0,
                format!(
                    "Close {:.5} above upper band - expect reversion to {:.5}",
                    close, current.bb_middle
                ),
            );
        }

        if current.rsi < self.rsi_oversold {
            card.add(25.0, format!("RSI oversold ({:.1})", current.rsi));
        } else if current.rsi > self.rsi_overbought {
            card.add(-25.0, format!("RSI overbought ({:.1})", current.rsi));
        }

        if current.stoch_k < self.stoch_oversold && current.stoch_d < self.stoch_oversold {
            card.add(15.0, "Stochastic oversold");
        } else if current.stoch_k > self.stoch_overbought && current.stoch_d > self.stoch_overbought
        {
            card.add(-15.0, "Stochastic overbought");
        }

        if current.atr > 0.0 {
            let stretch = (close - current.kijun_sen) / current.atr;
            if stretch < -1.0 {
                card.add(10.0, format!("Stretched {:.1} ATR below Kijun", -stretch));
            } else if stretch > 1.0 {
                card.add(-10.0, format!("Stretched {:.1} ATR above Kijun", stretch));
            }
        }

        Ok(card)
    }
}

impl TradingStrategy for MeanReversionStrategy {
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<TradingSignal, AnalysisError> {
        let card = self.score(ctx)?;
        let snapshot = ctx.frame.latest();
        Ok(SignalDraft::from_score(card).finish(self.name(), ctx.current_price, snapshot))
    }

    fn name(&self) -> &str {
        "Mean Reversion"
    }
}
