use crate::application::risk_management::sizing_engine::{SizingConfig, SizingEngine};
use crate::domain::trading::types::{Position, PositionSide, Tick, TradeRecord, TradingSignal};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PositionConfig {
    /// Minimum signal confidence (0..=100) required to open a position
    pub min_confidence: f64,
    pub max_positions_per_symbol: usize,
    pub sizing: SizingConfig,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 70.0,
            max_positions_per_symbol: 1,
            sizing: SizingConfig::default(),
        }
    }
}

/// Simulated book: open positions, closed trades and the account balance.
///
/// The only owner allowed to mutate positions.
pub struct PositionManager {
    config: PositionConfig,
    initial_balance: Decimal,
    balance: Decimal,
    open: Vec<Position>,
    history: Vec<TradeRecord>,
}

impl PositionManager {
    pub fn new(config: PositionConfig, balance: Decimal) -> Self {
        Self {
            config,
            initial_balance: balance,
            balance,
            open: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &PositionConfig {
        &self.config
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn initial_balance(&self) -> Decimal {
        self.initial_balance
    }

    pub fn open_positions(&self) -> &[Position] {
        &self.open
    }

    pub fn positions_for<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a Position> {
        self.open.iter().filter(move |p| p.symbol == symbol)
    }

    pub fn trade_history(&self) -> &[TradeRecord] {
        &self.history
    }

    pub fn realized_pnl(&self) -> Decimal {
        self.history.iter().map(|t| t.profit).sum()
    }

    pub fn unrealized_pnl(&self) -> Decimal {
        self.open.iter().map(|p| p.running_profit).sum()
    }

    /// Opens a position from an actionable signal.
    ///
    /// Returns `None` for HOLD, for confidence below the threshold, when the
    /// symbol is already at its position cap, or when the stop distance is zero.
    pub fn place(
        &mut self,
        symbol: &str,
        signal: &TradingSignal,
        time: DateTime<Utc>,
    ) -> Option<Position> {
        let side = signal.signal.direction()?;
        if signal.confidence < self.config.min_confidence {
            return None;
        }
        if self.positions_for(symbol).count() >= self.config.max_positions_per_symbol {
            return None;
        }

        let (Some(entry), Some(stop), Some(target)) = (
            Decimal::from_f64(signal.entry_price),
            Decimal::from_f64(signal.stop_loss),
            Decimal::from_f64(signal.take_profit),
        ) else {
            warn!(
                "PositionManager: {} signal carries non-representable prices, not opening",
                symbol
            );
            return None;
        };

        let size = SizingEngine::calculate_quantity(
            &self.config.sizing,
            self.balance,
            entry,
            stop,
            symbol,
        );
        if size <= Decimal::ZERO {
            return None;
        }

        let position = Position {
            id: Uuid::new_v4().to_string(),
            symbol: symbol.to_string(),
            entry_price: entry,
            side,
            size,
            stop_loss: stop,
            take_profit: target,
            entry_time: time,
            strategy_name: signal.strategy_name.clone(),
            running_profit: Decimal::ZERO,
        };
        info!(
            "PositionManager: Opened {} {} {} @ {} (SL {}, TP {}) via {}",
            position.side,
            position.size,
            symbol,
            position.entry_price,
            position.stop_loss,
            position.take_profit,
            position.strategy_name
        );
        self.open.push(position.clone());
        Some(position)
    }

    /// Marks every open position of `symbol` to `price`.
    pub fn update_pnl(&mut self, symbol: &str, price: f64) {
        let Some(price) = Decimal::from_f64(price) else {
            return;
        };
        for position in self.open.iter_mut().filter(|p| p.symbol == symbol) {
            position.running_profit = position.profit_at(price);
        }
    }

    /// Closes positions whose stop or target the tick has crossed.
    ///
    /// Longs are evaluated (and exit) at the bid, shorts at the ask.
    pub fn evaluate(&mut self, tick: &Tick) -> Vec<TradeRecord> {
        let (Some(bid), Some(ask)) = (Decimal::from_f64(tick.bid), Decimal::from_f64(tick.ask))
        else {
            return Vec::new();
        };

        let mut closed = Vec::new();
        let mut still_open = Vec::with_capacity(self.open.len());
        for position in self.open.drain(..) {
            if position.symbol != tick.symbol {
                still_open.push(position);
                continue;
            }
            let exit_price = match position.side {
                PositionSide::Long => bid,
                PositionSide::Short => ask,
            };
            match position.exit_trigger(exit_price) {
                Some(reason) => {
                    let profit = position.profit_at(exit_price);
                    info!(
                        "PositionManager: Closed {} {} @ {} ({}) P&L {}",
                        position.side, position.symbol, exit_price, reason, profit
                    );
                    closed.push(TradeRecord {
                        symbol: position.symbol,
                        side: position.side,
                        entry_price: position.entry_price,
                        exit_price,
                        size: position.size,
                        profit,
                        exit_reason: reason,
                        strategy_name: position.strategy_name,
                        entry_time: position.entry_time,
                        exit_time: tick.timestamp,
                    });
                }
                None => still_open.push(position),
            }
        }
        self.open = still_open;

        for trade in &closed {
            self.balance += trade.profit;
        }
        self.history.extend(closed.iter().cloned());
        closed
    }
}
