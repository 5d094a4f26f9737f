//! aurum - real-time market-signal engine
//!
//! Runs the multi-symbol signal loop against the synthetic market and prints a
//! session summary on exit (Ctrl+C, SIGTERM or `--max-iterations`).
//!
//! # Usage
//! ```sh
//! SYMBOLS=XAUUSD,EURUSD cargo run -- --strategy adaptive --interval 1
//! ```

use anyhow::{Context, Result};
use aurum::application::system::{BotSettings, TradingBot};
use aurum::config::{Config, parse_symbols};
use aurum::domain::market::strategy_config::StrategyMode;
use aurum::domain::market::timeframe::Timeframe;
use aurum::infrastructure::{CsvReportSink, JsonTradeHistoryStore, SyntheticMarket};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Real-time market-signal engine", long_about = None)]
struct Cli {
    /// Comma-separated symbols (overrides SYMBOLS)
    #[arg(short, long)]
    symbols: Option<String>,

    /// adaptive, fibonacci, elliott_wave, breakout, mean_reversion or multi_timeframe
    #[arg(long)]
    strategy: Option<StrategyMode>,

    /// tick, M1, M5, M15, H1, H4 or D1
    #[arg(short, long)]
    timeframe: Option<Timeframe>,

    /// Seconds between cycles
    #[arg(short, long)]
    interval: Option<f64>,

    #[arg(long)]
    max_iterations: Option<u64>,

    /// RNG seed for a reproducible synthetic market
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for periodic reports; an empty value disables them
    #[arg(long)]
    report_dir: Option<String>,

    /// Disable trade history persistence
    #[arg(long)]
    no_history: bool,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(symbols) = self.symbols {
            config.market.symbols = parse_symbols(&symbols);
        }
        if let Some(mode) = self.strategy {
            config.market.strategy_mode = mode;
        }
        if let Some(timeframe) = self.timeframe {
            config.market.timeframe = timeframe;
        }
        if let Some(interval) = self.interval {
            config.session.update_interval_secs = interval;
        }
        if self.max_iterations.is_some() {
            config.session.max_iterations = self.max_iterations;
        }
        if self.seed.is_some() {
            config.market.rng_seed = self.seed;
        }
        if let Some(dir) = self.report_dir {
            config.session.report_dir = Some(dir)
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from);
        }
        if self.no_history {
            config.session.trade_history_path = None;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("aurum {} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env()?;
    Cli::parse().apply(&mut config);
    config.validate().context("Invalid configuration")?;
    info!(
        "Configuration loaded: Symbols={:?}, Strategy={}, Timeframe={}, Interval={}s",
        config.market.symbols,
        config.market.strategy_mode,
        config.market.timeframe,
        config.session.update_interval_secs
    );

    let profiles = config.symbol_profiles()?;
    let market = SyntheticMarket::new(profiles.clone(), config.market.rng_seed);
    let mut bot = TradingBot::new(BotSettings::from_config(&config, profiles), Box::new(market));
    if let Some(dir) = &config.session.report_dir {
        bot = bot.with_report_sink(Box::new(CsvReportSink::new(dir)));
    }
    if let Some(path) = &config.session.trade_history_path {
        bot = bot.with_history_store(Box::new(JsonTradeHistoryStore::new(path)));
    }
    bot.initialize()?;

    let token = CancellationToken::new();
    spawn_signal_handler(token.clone());

    info!("Running. Press Ctrl+C to shutdown.");
    let summary = bot.run(token).await?;
    info!("Session summary: {}", serde_json::to_string(&summary)?);

    Ok(())
}

fn spawn_signal_handler(token: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
        info!("Shutdown signal received. Stopping after the current symbol...");
        token.cancel();
    });
}
