use crate::domain::errors::AnalysisError;
use crate::domain::market::indicator_frame::{IndicatorFrame, IndicatorSeries};
use crate::domain::trading::types::Candle;
use ta::Next;
use ta::indicators::{
    BollingerBands, ExponentialMovingAverage, Maximum, Minimum, SimpleMovingAverage,
};
use tracing::{debug, warn};

/// Partially available series: `None` marks a position before the warm-up window.
type Gapped = Vec<Option<f64>>;

/// Manual ADX using Wilder's smoothing.
///
/// The first `period` directional moves are summed, then smoothed. Yields `None`
/// until that initial window is complete.
pub struct ManualAdx {
    period: usize,
    prev: Option<(f64, f64, f64)>,
    tr_smooth: f64,
    plus_dm_smooth: f64,
    minus_dm_smooth: f64,
    adx_smooth: f64,
    count: usize,
}

impl ManualAdx {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
            prev: None,
            tr_smooth: 0.0,
            plus_dm_smooth: 0.0,
            minus_dm_smooth: 0.0,
            adx_smooth: 0.0,
            count: 0,
        }
    }

    pub fn next(&mut self, high: f64, low: f64, close: f64) -> Option<f64> {
        let Some((prev_high, prev_low, prev_close)) = self.prev.replace((high, low, close)) else {
            return None;
        };

        let tr = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());
        let up_move = high - prev_high;
        let down_move = prev_low - low;
        let plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        let minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };

        self.count += 1;
        let n = self.period as f64;

        if self.count <= self.period {
            self.tr_smooth += tr;
            self.plus_dm_smooth += plus_dm;
            self.minus_dm_smooth += minus_dm;
        } else {
            self.tr_smooth = self.tr_smooth - (self.tr_smooth / n) + tr;
            self.plus_dm_smooth = self.plus_dm_smooth - (self.plus_dm_smooth / n) + plus_dm;
            self.minus_dm_smooth = self.minus_dm_smooth - (self.minus_dm_smooth / n) + minus_dm;
        }

        if self.count < self.period {
            return None;
        }

        let dx = if self.tr_smooth > 0.0 {
            let plus_di = 100.0 * self.plus_dm_smooth / self.tr_smooth;
            let minus_di = 100.0 * self.minus_dm_smooth / self.tr_smooth;
            let sum_di = plus_di + minus_di;
            if sum_di > 0.0 {
                100.0 * (plus_di - minus_di).abs() / sum_di
            } else {
                0.0
            }
        } else {
            0.0
        };

        if self.count == self.period {
            self.adx_smooth = dx;
        } else {
            self.adx_smooth = ((self.adx_smooth * (n - 1.0)) + dx) / n;
        }
        Some(self.adx_smooth)
    }
}

/// Computes the fixed indicator battery over a candle sequence.
///
/// Stateless: every call recomputes from the candles it is given, so the output
/// never depends on previous calls.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    min_candles: usize,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self { min_candles: 10 }
    }
}

impl IndicatorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_candles(&self) -> usize {
        self.min_candles
    }

    pub fn compute(&self, candles: &[Candle]) -> IndicatorFrame {
        self.compute_owned(candles.to_vec())
    }

    /// Same as [`compute`](Self::compute), taking over an already-copied candle buffer.
    pub fn compute_owned(&self, candles: Vec<Candle>) -> IndicatorFrame {
        if candles.len() < self.min_candles {
            debug!(
                "IndicatorEngine: {} candles < {} required, skipping indicators",
                candles.len(),
                self.min_candles
            );
            return IndicatorFrame::new(candles, None);
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
        let n = candles.len();
        let observed: Gapped = closes.iter().copied().map(Some).collect();

        let ema_20 = best_effort("ema_20", n, || ema_series(&observed, 20));
        let ema_50 = best_effort("ema_50", n, || ema_series(&observed, 50));
        let ema_200 = best_effort("ema_200", n, || ema_series(&observed, 200));

        let (macd, macd_signal, macd_histogram) = match macd_series(&observed) {
            Ok(triple) => triple,
            Err(e) => {
                warn!("IndicatorEngine: {}", e);
                (vec![None; n], vec![None; n], vec![None; n])
            }
        };

        let rsi = best_effort("rsi", n, || rsi_series(&closes, 14));

        let (bb_middle, bb_upper, bb_lower) = match bollinger_series(&closes, 20, 2.0) {
            Ok(triple) => triple,
            Err(e) => {
                warn!("IndicatorEngine: {}", e);
                (vec![None; n], vec![None; n], vec![None; n])
            }
        };

        let stoch_k = best_effort("stoch_k", n, || stochastic_k(&highs, &lows, &closes, 14));
        let stoch_d = rolling_mean_strict(&stoch_k, 3);
        let atr = best_effort("atr", n, || atr_series(&candles, 14));
        let adx = adx_series(&candles, 14);
        let tenkan_sen = best_effort("tenkan_sen", n, || midpoint_series(&highs, &lows, 9));
        let kijun_sen = best_effort("kijun_sen", n, || midpoint_series(&highs, &lows, 26));

        let series = IndicatorSeries {
            ema_20: fill_gaps(&ema_20),
            ema_50: fill_gaps(&ema_50),
            ema_200: fill_gaps(&ema_200),
            macd: fill_gaps(&macd),
            macd_signal: fill_gaps(&macd_signal),
            macd_histogram: fill_gaps(&macd_histogram),
            rsi: fill_gaps(&rsi),
            bb_middle: fill_gaps(&bb_middle),
            bb_upper: fill_gaps(&bb_upper),
            bb_lower: fill_gaps(&bb_lower),
            stoch_k: fill_gaps(&stoch_k),
            stoch_d: fill_gaps(&stoch_d),
            atr: fill_gaps(&atr),
            adx: fill_gaps(&adx),
            tenkan_sen: fill_gaps(&tenkan_sen),
            kijun_sen: fill_gaps(&kijun_sen),
        };

        IndicatorFrame::new(candles, Some(series))
    }
}

/// Forward-fill, then backward-fill, then zero.
///
/// Non-finite values count as unavailable.
pub fn fill_gaps(values: &[Option<f64>]) -> Vec<f64> {
    let mut filled: Gapped = Vec::with_capacity(values.len());
    let mut carry = None;
    for value in values {
        let value = value.filter(|v| v.is_finite());
        if value.is_some() {
            carry = value;
        }
        filled.push(carry);
    }

    let first = filled.iter().flatten().next().copied();
    filled
        .into_iter()
        .map(|v| v.or(first).unwrap_or(0.0))
        .collect()
}

fn best_effort<F>(name: &str, len: usize, compute: F) -> Gapped
where
    F: FnOnce() -> Result<Gapped, AnalysisError>,
{
    match compute() {
        Ok(series) => series,
        Err(e) => {
            warn!("IndicatorEngine: {} left unavailable: {}", name, e);
            vec![None; len]
        }
    }
}

fn ta_failure(indicator: &str, e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::IndicatorComputation {
        indicator: indicator.to_string(),
        reason: e.to_string(),
    }
}

/// EMA seeded with the first available observation, reported once `period`
/// observations have been seen.
fn ema_series(values: &[Option<f64>], period: usize) -> Result<Gapped, AnalysisError> {
    let mut ema = ExponentialMovingAverage::new(period)
        .map_err(|e| ta_failure(&format!("ema_{}", period), e))?;
    let mut seen = 0;
    Ok(values
        .iter()
        .map(|value| {
            let v = (*value)?;
            seen += 1;
            let out = ema.next(v);
            (seen >= period).then_some(out)
        })
        .collect())
}

fn macd_series(closes: &[Option<f64>]) -> Result<(Gapped, Gapped, Gapped), AnalysisError> {
    let fast = ema_series(closes, 12)?;
    let slow = ema_series(closes, 26)?;
    let line: Gapped = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ema_series(&line, 9)?;
    let histogram = line
        .iter()
        .zip(&signal)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();
    Ok((line, signal, histogram))
}

/// RSI with Wilder smoothing (alpha = 1/period).
///
/// `ta`'s EMA with window `2 * period - 1` has exactly that smoothing factor.
fn rsi_series(closes: &[f64], period: usize) -> Result<Gapped, AnalysisError> {
    let window = 2 * period - 1;
    let mut avg_gain = ExponentialMovingAverage::new(window).map_err(|e| ta_failure("rsi", e))?;
    let mut avg_loss = ExponentialMovingAverage::new(window).map_err(|e| ta_failure("rsi", e))?;

    Ok(closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let delta = if i == 0 { 0.0 } else { close - closes[i - 1] };
            let gain = avg_gain.next(delta.max(0.0));
            let loss = avg_loss.next((-delta).max(0.0));
            if i + 1 < period {
                return None;
            }
            // No losses in the window reads as fully overbought, flat included
            Some(if loss <= 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + gain / loss)
            })
        })
        .collect())
}

fn bollinger_series(
    closes: &[f64],
    period: usize,
    multiplier: f64,
) -> Result<(Gapped, Gapped, Gapped), AnalysisError> {
    let mut bb = BollingerBands::new(period, multiplier).map_err(|e| ta_failure("bollinger", e))?;
    let mut middle = Vec::with_capacity(closes.len());
    let mut upper = Vec::with_capacity(closes.len());
    let mut lower = Vec::with_capacity(closes.len());
    for (i, &close) in closes.iter().enumerate() {
        let out = bb.next(close);
        let ready = i + 1 >= period;
        middle.push(ready.then_some(out.average));
        upper.push(ready.then_some(out.upper));
        lower.push(ready.then_some(out.lower));
    }
    Ok((middle, upper, lower))
}

fn stochastic_k(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Result<Gapped, AnalysisError> {
    let mut max = Maximum::new(period).map_err(|e| ta_failure("stoch_k", e))?;
    let mut min = Minimum::new(period).map_err(|e| ta_failure("stoch_k", e))?;
    Ok(closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let highest = max.next(highs[i]);
            let lowest = min.next(lows[i]);
            let range = highest - lowest;
            // Degenerate range: left unavailable
            (i + 1 >= period && range > 0.0).then(|| 100.0 * (close - lowest) / range)
        })
        .collect())
}

/// Rolling mean that is only defined when every value in the window is.
fn rolling_mean_strict(values: &[Option<f64>], period: usize) -> Gapped {
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            let sum = window.iter().copied().sum::<Option<f64>>()?;
            Some(sum / period as f64)
        })
        .collect()
}

fn atr_series(candles: &[Candle], period: usize) -> Result<Gapped, AnalysisError> {
    let mut sma = SimpleMovingAverage::new(period).map_err(|e| ta_failure("atr", e))?;
    Ok(candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let tr = match i.checked_sub(1).map(|p| candles[p].close) {
                Some(prev_close) => (c.high - c.low)
                    .max((c.high - prev_close).abs())
                    .max((c.low - prev_close).abs()),
                None => c.high - c.low,
            };
            let out = sma.next(tr);
            (i + 1 >= period).then_some(out)
        })
        .collect())
}

fn adx_series(candles: &[Candle], period: usize) -> Gapped {
    let mut adx = ManualAdx::new(period);
    candles
        .iter()
        .map(|c| adx.next(c.high, c.low, c.close))
        .collect()
}

fn midpoint_series(highs: &[f64], lows: &[f64], period: usize) -> Result<Gapped, AnalysisError> {
    let name = format!("midpoint_{}", period);
    let mut max = Maximum::new(period).map_err(|e| ta_failure(&name, e))?;
    let mut min = Minimum::new(period).map_err(|e| ta_failure(&name, e))?;
    Ok(highs
        .iter()
        .zip(lows)
        .enumerate()
        .map(|(i, (&h, &l))| {
            let mid = (max.next(h) + min.next(l)) / 2.0;
            (i + 1 >= period).then_some(mid)
        })
        .collect())
}
