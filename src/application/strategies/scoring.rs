use crate::domain::market::indicator_frame::IndicatorSnapshot;
use crate::domain::trading::types::{RiskLevel, SignalKind, TradingSignal};

/// Additive score with the reasons that produced it.
#[derive(Debug, Clone, Default)]
pub struct ScoreCard {
    score: f64,
    reasoning: Vec<String>,
}

impl ScoreCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, points: f64, reason: impl Into<String>) {
        self.score += points;
        self.reasoning.push(reason.into());
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn into_reasoning(self) -> Vec<String> {
        self.reasoning
    }
}

/// Maps an additive score to `(signal, confidence, risk)`.
///
/// | score      | signal      | confidence      | risk   |
/// |------------|-------------|-----------------|--------|
/// | > 40       | STRONG_BUY  | min(95, 60 + s) | LOW    |
/// | > 20       | BUY         | min(85, 50 + s) | MEDIUM |
/// | < -40      | STRONG_SELL | min(95, 60 - s) | LOW    |
/// | < -20      | SELL        | min(85, 50 - s) | MEDIUM |
/// | otherwise  | HOLD        | 50              | HIGH   |
pub fn classify_score(score: f64) -> (SignalKind, f64, RiskLevel) {
    if score > 40.0 {
        (SignalKind::StrongBuy, (60.0 + score).min(95.0), RiskLevel::Low)
    } else if score > 20.0 {
        (SignalKind::Buy, (50.0 + score).min(85.0), RiskLevel::Medium)
    } else if score < -40.0 {
        (SignalKind::StrongSell, (60.0 - score).min(95.0), RiskLevel::Low)
    } else if score < -20.0 {
        (SignalKind::Sell, (50.0 - score).min(85.0), RiskLevel::Medium)
    } else {
        (SignalKind::Hold, 50.0, RiskLevel::High)
    }
}

/// Stop and target for an entry: 2 x ATR / 3 x ATR, or 1 % / 2 % of price
/// when ATR is unusable. HOLD pins both to the entry.
pub fn protective_levels(kind: SignalKind, entry: f64, atr: f64) -> (f64, f64) {
    let (stop_dist, target_dist) = if atr.is_finite() && atr > 0.0 {
        (2.0 * atr, 3.0 * atr)
    } else {
        (entry * 0.01, entry * 0.02)
    };
    match kind {
        SignalKind::StrongBuy | SignalKind::Buy => (entry - stop_dist, entry + target_dist),
        SignalKind::StrongSell | SignalKind::Sell => (entry + stop_dist, entry - target_dist),
        SignalKind::Hold => (entry, entry),
    }
}

pub struct SignalDraft {
    pub kind: SignalKind,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub reasoning: Vec<String>,
}

impl SignalDraft {
    pub fn from_score(card: ScoreCard) -> Self {
        let score = card.score();
        let (kind, confidence, risk_level) = classify_score(score);
        let mut reasoning = card.into_reasoning();
        reasoning.push(format!("Total score: {:+.0}", score));
        Self {
            kind,
            confidence,
            risk_level,
            reasoning,
        }
    }

    /// Finished signal with protective levels derived from the snapshot's ATR.
    pub fn finish(
        self,
        strategy_name: &str,
        entry: f64,
        snapshot: Option<IndicatorSnapshot>,
    ) -> TradingSignal {
        let atr = snapshot.map(|s| s.atr).unwrap_or(0.0);
        let (stop_loss, take_profit) = protective_levels(self.kind, entry, atr);
        TradingSignal {
            signal: self.kind,
            confidence: self.confidence.clamp(0.0, 100.0),
            risk_level: self.risk_level,
            strategy_name: strategy_name.to_string(),
            entry_price: entry,
            stop_loss,
            take_profit,
            reasoning: self.reasoning,
            indicator_snapshot: snapshot,
            fibonacci_levels: None,
            elliott_wave_count: None,
        }
    }
}
