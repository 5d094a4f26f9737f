use crate::config::SymbolProfiles;
use crate::domain::errors::MarketDataError;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::TickSource;
use crate::domain::trading::types::{Candle, Tick};
use chrono::{DateTime, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::{debug, info};

/// Micro-structure jitter steps (in units of the symbol's volatility) and their weights.
const JITTER_STEPS: [(f64, f64); 5] = [
    (-0.1, 0.20),
    (-0.05, 0.25),
    (0.0, 0.10),
    (0.05, 0.25),
    (0.1, 0.20),
];

/// Random-walk market used when no live feed is configured.
///
/// Prices drift with session-dependent volatility and are pulled back once they
/// leave a ±15% band around the symbol's base price.
pub struct SyntheticMarket {
    profiles: SymbolProfiles,
    rng: StdRng,
    prices: HashMap<String, f64>,
    last_tick: HashMap<String, DateTime<Utc>>,
}

impl SyntheticMarket {
    /// `seed` makes the run reproducible; `None` draws from OS entropy.
    pub fn new(profiles: SymbolProfiles, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => {
                info!("SyntheticMarket: Using RNG seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_os_rng(),
        };
        Self {
            profiles,
            rng,
            prices: HashMap::new(),
            last_tick: HashMap::new(),
        }
    }

    pub fn current_price(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    /// Seed history ending at `end`, one candle per `timeframe` spacing.
    pub fn generate_history(
        &mut self,
        symbol: &str,
        periods: usize,
        timeframe: Timeframe,
        end: DateTime<Utc>,
    ) -> Vec<Candle> {
        let profile = self.profiles.get(symbol);
        let volatility = profile.volatility;
        let spacing = timeframe.seed_spacing();

        let mut candles: Vec<Candle> = Vec::with_capacity(periods);
        let mut close = profile.base_price;
        for i in 0..periods {
            let open_time = end - spacing * (periods - i) as i32;
            let open = close;
            let trend = (i as f64 / 20.0).sin() * volatility * 0.5;
            let mut next_close = open + self.gaussian(trend, volatility * 0.5);
            if next_close <= 0.0 {
                next_close = open;
            }
            let mut high = open.max(next_close) + self.gaussian(0.0, volatility * 0.3).abs();
            let low = (open.min(next_close) - self.gaussian(0.0, volatility * 0.3).abs())
                .max(open.min(next_close) * 0.5);
            high = high.max(low + volatility * 0.01);

            candles.push(Candle {
                open_time,
                open: round5(open),
                high: round5(high),
                low: round5(low),
                close: round5(next_close),
                volume: self.rng.random_range(1000..10000) as f64,
            });
            close = next_close;
        }

        if let Some(last) = candles.last() {
            self.prices.insert(symbol.to_string(), last.close);
        }
        candles
    }

    /// Next tick for `symbol` stamped at `now` (clamped to be non-decreasing).
    pub fn generate_tick(&mut self, symbol: &str, now: DateTime<Utc>) -> Tick {
        let profile = self.profiles.get(symbol);
        let base = profile.base_price;
        let current = match self.prices.get(symbol) {
            Some(&price) if price > 0.0 => price,
            _ => base,
        };

        let change = self.gaussian(0.0, profile.volatility * session_factor(now.hour()) * 0.1);
        let jitter = self.jitter() * profile.volatility;
        let mut price = current + change + jitter;
        if price < base * 0.85 {
            price += change.abs() * 2.0;
        } else if price > base * 1.15 {
            price -= change.abs() * 2.0;
        }
        if !(price.is_finite() && price > 0.0) {
            price = current;
        }
        self.prices.insert(symbol.to_string(), price);

        let timestamp = match self.last_tick.get(symbol) {
            Some(&last) if last > now => last,
            _ => now,
        };
        self.last_tick.insert(symbol.to_string(), timestamp);

        let spread = (base.abs() * 0.0001).max(0.00001);
        let tick = Tick {
            symbol: symbol.to_string(),
            bid: round5(price - spread),
            ask: round5(price),
            timestamp,
            volume: self.rng.random_range(100..2000) as f64,
        };
        debug!(
            "SyntheticMarket: {} bid {:.5} ask {:.5}",
            symbol, tick.bid, tick.ask
        );
        tick
    }

    /// Box-Muller normal draw.
    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev <= 0.0 {
            return mean;
        }
        let u1: f64 = 1.0 - self.rng.random::<f64>();
        let u2: f64 = self.rng.random::<f64>();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + z * std_dev
    }

    fn jitter(&mut self) -> f64 {
        let mut roll: f64 = self.rng.random();
        for (step, weight) in JITTER_STEPS {
            if roll < weight {
                return step;
            }
            roll -= weight;
        }
        0.0
    }
}

impl TickSource for SyntheticMarket {
    fn seed_history(
        &mut self,
        symbol: &str,
        periods: usize,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, MarketDataError> {
        Ok(self.generate_history(symbol, periods, timeframe, Utc::now()))
    }

    fn next_tick(&mut self, symbol: &str) -> Result<Tick, MarketDataError> {
        Ok(self.generate_tick(symbol, Utc::now()))
    }
}

/// Volatility multiplier by UTC hour: US session, then EU session, then quiet hours.
pub fn session_factor(hour: u32) -> f64 {
    if (14..=22).contains(&hour) {
        1.8
    } else if (8..=17).contains(&hour) {
        1.3
    } else {
        0.8
    }
}

fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}
