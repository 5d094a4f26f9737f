use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub mod shutdown_service;
pub mod signal_engine;

use crate::application::risk_management::position_manager::{PositionConfig, PositionManager};
use crate::application::risk_management::sizing_engine::SizingConfig;
use crate::application::strategies::StrategyFactory;
use crate::application::system::shutdown_service::ShutdownService;
use crate::application::system::signal_engine::SignalEngine;
use crate::config::{Config, SymbolProfiles};
use crate::domain::errors::MarketDataError;
use crate::domain::market::strategy_config::StrategyMode;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::{ReportSink, TickSource, TradeHistoryStore};
use crate::domain::trading::types::{Tick, TradingSignal};

/// Everything the run loop needs, resolved from `Config`.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub symbols: Vec<String>,
    pub strategy_mode: StrategyMode,
    pub timeframe: Timeframe,
    pub seed_periods: usize,
    pub max_history: usize,
    pub update_interval: Duration,
    pub chart_every: u64,
    pub max_iterations: Option<u64>,
    pub account_balance: Decimal,
    pub positions: PositionConfig,
    pub profiles: SymbolProfiles,
}

impl BotSettings {
    pub fn from_config(config: &Config, profiles: SymbolProfiles) -> Self {
        Self {
            symbols: config.market.symbols.clone(),
            strategy_mode: config.market.strategy_mode,
            timeframe: config.market.timeframe,
            seed_periods: config.market.seed_periods,
            max_history: config.market.max_history,
            update_interval: Duration::from_secs_f64(config.session.update_interval_secs),
            chart_every: config.session.chart_every,
            max_iterations: config.session.max_iterations,
            account_balance: config.risk.account_balance,
            positions: PositionConfig {
                min_confidence: config.risk.min_confidence,
                max_positions_per_symbol: config.risk.max_positions_per_symbol,
                sizing: SizingConfig {
                    risk_per_trade: config.risk.risk_per_trade,
                    ..SizingConfig::default()
                },
            },
            profiles,
        }
    }
}

/// End-of-session statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    /// Percentage of closed trades with positive profit
    pub win_rate: f64,
    pub realized_pnl: Decimal,
    pub open_positions: usize,
    pub unrealized_pnl: Decimal,
    pub final_balance: Decimal,
}

/// Sequential multi-symbol loop over one `SignalEngine` per symbol.
pub struct TradingBot {
    settings: BotSettings,
    source: Box<dyn TickSource>,
    engines: Vec<SignalEngine>,
    positions: PositionManager,
    report_sink: Option<Box<dyn ReportSink>>,
    history_store: Option<Box<dyn TradeHistoryStore>>,
    report_counters: HashMap<String, u64>,
    iteration: u64,
}

impl TradingBot {
    pub fn new(settings: BotSettings, source: Box<dyn TickSource>) -> Self {
        let strategy = StrategyFactory::create(settings.strategy_mode);
        let engines = settings
            .symbols
            .iter()
            .map(|symbol| {
                SignalEngine::new(
                    settings.profiles.series_for(symbol, settings.max_history),
                    settings.timeframe,
                    strategy.clone(),
                )
            })
            .collect();
        let positions = PositionManager::new(settings.positions.clone(), settings.account_balance);

        Self {
            settings,
            source,
            engines,
            positions,
            report_sink: None,
            history_store: None,
            report_counters: HashMap::new(),
            iteration: 0,
        }
    }

    pub fn with_report_sink(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.report_sink = Some(sink);
        self
    }

    pub fn with_history_store(mut self, store: Box<dyn TradeHistoryStore>) -> Self {
        self.history_store = Some(store);
        self
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    pub fn positions(&self) -> &PositionManager {
        &self.positions
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn engine(&self, symbol: &str) -> Option<&SignalEngine> {
        self.engines.iter().find(|e| e.symbol() == symbol)
    }

    /// Most recent signal for `symbol`; `None` before its first evaluation.
    pub fn latest_signal(&self, symbol: &str) -> Option<&TradingSignal> {
        self.engine(symbol).and_then(|e| e.latest_signal())
    }

    /// Most recent signal per symbol, in configured symbol order.
    pub fn latest_signals(&self) -> Vec<(&str, &TradingSignal)> {
        self.engines
            .iter()
            .filter_map(|e| e.latest_signal().map(|s| (e.symbol(), s)))
            .collect()
    }

    /// Seeds every symbol's history from the tick source.
    pub fn initialize(&mut self) -> Result<()> {
        for engine in &mut self.engines {
            let symbol = engine.symbol().to_string();
            let candles = self
                .source
                .seed_history(&symbol, self.settings.seed_periods, self.settings.timeframe)
                .with_context(|| format!("Failed to seed history for {}", symbol))?;
            engine.series_mut().seed(candles);
            info!(
                "TradingBot: Seeded history for {} with {} periods ({})",
                symbol,
                engine.series().len(),
                self.settings.timeframe
            );
        }
        Ok(())
    }

    /// One pass over all symbols. Returns the number of symbols processed.
    ///
    /// A failing symbol is logged and skipped; cancellation is honoured between symbols.
    pub fn run_cycle(&mut self, token: &CancellationToken) -> usize {
        let mut processed = 0;
        for idx in 0..self.engines.len() {
            if token.is_cancelled() {
                debug!("TradingBot: Cancellation observed mid-cycle, stopping");
                break;
            }
            match self.process_symbol(idx) {
                Ok(()) => processed += 1,
                Err(e) => error!(
                    "TradingBot: Symbol {} failed this cycle: {:#}",
                    self.engines[idx].symbol(),
                    e
                ),
            }
        }
        self.iteration += 1;
        processed
    }

    fn process_symbol(&mut self, idx: usize) -> Result<()> {
        let symbol = self.engines[idx].symbol().to_string();
        let tick = self.source.next_tick(&symbol)?;

        let engine = &mut self.engines[idx];
        match engine.ingest(&tick) {
            Ok(_) => {}
            Err(e @ MarketDataError::OutOfOrderTick { .. }) => {
                debug!("TradingBot: Dropping tick: {}", e);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        let signal = engine.analyze();

        self.positions.update_pnl(&symbol, tick.bid);
        self.positions.evaluate(&tick);
        display_signal(&symbol, &signal, &tick);
        self.positions.place(&symbol, &signal, tick.timestamp);

        self.maybe_publish(idx, &signal);
        Ok(())
    }

    fn maybe_publish(&mut self, idx: usize, signal: &TradingSignal) {
        let Some(sink) = self.report_sink.as_mut() else {
            return;
        };
        let engine = &self.engines[idx];
        let counter = self
            .report_counters
            .entry(engine.symbol().to_string())
            .or_insert(0);
        *counter += 1;
        if *counter < self.settings.chart_every {
            return;
        }
        *counter = 0;

        if let Some(frame) = engine.latest_frame() {
            if let Err(e) = sink.publish(engine.symbol(), frame, signal) {
                error!("TradingBot: Report for {} failed: {}", engine.symbol(), e);
            }
        }
    }

    /// Runs cycles until cancelled or `max_iterations` is reached, then summarises.
    pub async fn run(&mut self, token: CancellationToken) -> Result<SessionSummary> {
        info!(
            "TradingBot: Starting - Symbols: {} | Strategy: {} | Timeframe: {}",
            self.settings.symbols.join(", "),
            self.settings.strategy_mode,
            self.settings.timeframe
        );

        loop {
            if token.is_cancelled() {
                info!("TradingBot: Received stop signal, shutting down gracefully...");
                break;
            }
            if self.max_iterations_reached() {
                break;
            }

            self.run_cycle(&token);
            if self.max_iterations_reached() {
                break;
            }

            tokio::select! {
                _ = token.cancelled() => {
                    info!("TradingBot: Received stop signal, shutting down gracefully...");
                    break;
                }
                _ = tokio::time::sleep(self.settings.update_interval) => {}
            }
        }

        Ok(self.show_final_summary())
    }

    fn max_iterations_reached(&self) -> bool {
        match self.settings.max_iterations {
            Some(max) if self.iteration >= max => {
                info!("TradingBot: Reached max iterations ({}), stopping.", max);
                true
            }
            _ => false,
        }
    }

    /// Logs the session statistics and persists the trade history.
    pub fn show_final_summary(&self) -> SessionSummary {
        let trades = self.positions.trade_history();
        let winning_trades = trades.iter().filter(|t| t.profit > Decimal::ZERO).count();
        let win_rate = if trades.is_empty() {
            0.0
        } else {
            winning_trades as f64 / trades.len() as f64 * 100.0
        };

        let summary = SessionSummary {
            total_trades: trades.len(),
            winning_trades,
            win_rate,
            realized_pnl: self.positions.realized_pnl(),
            open_positions: self.positions.open_positions().len(),
            unrealized_pnl: self.positions.unrealized_pnl(),
            final_balance: self.positions.balance(),
        };

        info!("=== FINAL TRADING SUMMARY ===");
        info!(
            "Total Trades: {} | Winning: {} | Win Rate: {:.1}%",
            summary.total_trades, summary.winning_trades, summary.win_rate
        );
        info!(
            "Realized P&L: ${} | Open Positions: {} | Unrealized P&L: ${}",
            summary.realized_pnl.round_dp(2),
            summary.open_positions,
            summary.unrealized_pnl.round_dp(2)
        );
        info!(
            "Final Balance: ${} (started at ${})",
            summary.final_balance.round_dp(2),
            self.positions.initial_balance()
        );

        ShutdownService::new(self.history_store.as_deref()).shutdown(trades);
        summary
    }
}

fn display_signal(symbol: &str, signal: &TradingSignal, tick: &Tick) {
    info!(
        "{} @ {:.5} | Bid {:.5} Ask {:.5} Spread {:.5} | {} ({:.0}%, risk {}) via {}",
        symbol,
        tick.mid(),
        tick.bid,
        tick.ask,
        tick.spread(),
        signal.signal,
        signal.confidence,
        signal.risk_level,
        signal.strategy_name
    );
    if signal.signal.is_actionable() {
        info!(
            "{} levels: entry {:.5} | SL {:.5} | TP {:.5}",
            symbol, signal.entry_price, signal.stop_loss, signal.take_profit
        );
    }
    for reason in &signal.reasoning {
        debug!("{}   - {}", symbol, reason);
    }
}
