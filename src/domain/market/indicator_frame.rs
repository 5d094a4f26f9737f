use crate::domain::trading::types::Candle;
use serde::{Deserialize, Serialize};

/// Derived series aligned positionally with the candles of an [`IndicatorFrame`].
///
/// Every vector has exactly one value per candle. Gaps left by warm-up windows
/// have already been filled (forward, then backward, then zero).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorSeries {
    pub ema_20: Vec<f64>,
    pub ema_50: Vec<f64>,
    pub ema_200: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_histogram: Vec<f64>,
    pub rsi: Vec<f64>,
    pub bb_middle: Vec<f64>,
    pub bb_upper: Vec<f64>,
    pub bb_lower: Vec<f64>,
    pub stoch_k: Vec<f64>,
    pub stoch_d: Vec<f64>,
    pub atr: Vec<f64>,
    pub adx: Vec<f64>,
    pub tenkan_sen: Vec<f64>,
    pub kijun_sen: Vec<f64>,
}

impl IndicatorSeries {
    pub const COLUMNS: [&'static str; 16] = [
        "ema_20",
        "ema_50",
        "ema_200",
        "macd",
        "macd_signal",
        "macd_histogram",
        "rsi",
        "bb_middle",
        "bb_upper",
        "bb_lower",
        "stoch_k",
        "stoch_d",
        "atr",
        "adx",
        "tenkan_sen",
        "kijun_sen",
    ];

    /// Columns in [`Self::COLUMNS`] order.
    pub fn columns(&self) -> [&Vec<f64>; 16] {
        [
            &self.ema_20,
            &self.ema_50,
            &self.ema_200,
            &self.macd,
            &self.macd_signal,
            &self.macd_histogram,
            &self.rsi,
            &self.bb_middle,
            &self.bb_upper,
            &self.bb_lower,
            &self.stoch_k,
            &self.stoch_d,
            &self.atr,
            &self.adx,
            &self.tenkan_sen,
            &self.kijun_sen,
        ]
    }

    pub fn snapshot(&self, index: usize) -> Option<IndicatorSnapshot> {
        let at = |series: &Vec<f64>| series.get(index).copied();
        Some(IndicatorSnapshot {
            ema_20: at(&self.ema_20)?,
            ema_50: at(&self.ema_50)?,
            ema_200: at(&self.ema_200)?,
            macd: at(&self.macd)?,
            macd_signal: at(&self.macd_signal)?,
            macd_histogram: at(&self.macd_histogram)?,
            rsi: at(&self.rsi)?,
            bb_middle: at(&self.bb_middle)?,
            bb_upper: at(&self.bb_upper)?,
            bb_lower: at(&self.bb_lower)?,
            stoch_k: at(&self.stoch_k)?,
            stoch_d: at(&self.stoch_d)?,
            atr: at(&self.atr)?,
            adx: at(&self.adx)?,
            tenkan_sen: at(&self.tenkan_sen)?,
            kijun_sen: at(&self.kijun_sen)?,
        })
    }
}

/// One row of indicator values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ema_20: f64,
    pub ema_50: f64,
    pub ema_200: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub rsi: f64,
    pub bb_middle: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub atr: f64,
    pub adx: f64,
    pub tenkan_sen: f64,
    pub kijun_sen: f64,
}

/// Candles paired with their derived indicator series.
///
/// `series` is `None` when the candle history was too short to compute anything.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    candles: Vec<Candle>,
    series: Option<IndicatorSeries>,
}

impl IndicatorFrame {
    pub fn new(candles: Vec<Candle>, series: Option<IndicatorSeries>) -> Self {
        Self { candles, series }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn series(&self) -> Option<&IndicatorSeries> {
        self.series.as_ref()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    pub fn latest(&self) -> Option<IndicatorSnapshot> {
        let last = self.candles.len().checked_sub(1)?;
        self.series.as_ref()?.snapshot(last)
    }

    pub fn previous(&self) -> Option<IndicatorSnapshot> {
        let prev = self.candles.len().checked_sub(2)?;
        self.series.as_ref()?.snapshot(prev)
    }
}
