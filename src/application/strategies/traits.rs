use crate::domain::errors::AnalysisError;
use crate::domain::market::indicator_frame::{IndicatorFrame, IndicatorSnapshot};
use crate::domain::trading::types::TradingSignal;

/// Everything an analyzer may look at for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub symbol: &'a str,
    pub frame: &'a IndicatorFrame,
    pub current_price: f64,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(symbol: &'a str, frame: &'a IndicatorFrame, current_price: f64) -> Self {
        Self {
            symbol,
            frame,
            current_price,
        }
    }

    /// Latest indicator row, or `MissingIndicators` when the frame has none.
    pub fn latest(&self, strategy: &str) -> Result<IndicatorSnapshot, AnalysisError> {
        self.frame
            .latest()
            .ok_or_else(|| AnalysisError::MissingIndicators {
                strategy: strategy.to_string(),
            })
    }

    pub fn previous(&self, strategy: &str) -> Result<IndicatorSnapshot, AnalysisError> {
        self.frame
            .previous()
            .ok_or_else(|| AnalysisError::MissingIndicators {
                strategy: strategy.to_string(),
            })
    }
}

/// A single analysis capability: indicator frame in, signal out.
pub trait TradingStrategy: Send + Sync {
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<TradingSignal, AnalysisError>;
    fn name(&self) -> &str;
}
