use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SizingConfig {
    /// Fraction of the balance put at risk per trade, in (0, 1]
    pub risk_per_trade: f64,
    /// Decimal places kept on the computed size
    pub size_precision: u32,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            risk_per_trade: 0.01,
            size_precision: 4,
        }
    }
}

pub struct SizingEngine;

impl SizingEngine {
    /// Size such that hitting the stop loses `balance * risk_per_trade`.
    ///
    /// Returns zero when the stop distance or the balance is not positive.
    pub fn calculate_quantity(
        config: &SizingConfig,
        balance: Decimal,
        entry: Decimal,
        stop: Decimal,
        symbol: &str,
    ) -> Decimal {
        let distance = (entry - stop).abs();
        if balance <= Decimal::ZERO || distance.is_zero() {
            info!(
                "SizingEngine: Cannot size {} - Balance={}, StopDistance={}",
                symbol, balance, distance
            );
            return Decimal::ZERO;
        }

        let risk = Decimal::from_f64(config.risk_per_trade).unwrap_or(Decimal::ZERO);
        let risk_amount = balance * risk;
        let quantity = (risk_amount / distance).round_dp(config.size_precision);

        debug!(
            "SizingEngine: {} risk ${} over stop distance {} -> size {}",
            symbol, risk_amount, distance, quantity
        );
        quantity
    }
}
