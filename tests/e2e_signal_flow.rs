use aurum::application::market_data::indicator_engine::IndicatorEngine;
use aurum::application::strategies::{
    AdaptiveStrategy, AnalysisContext, MultiIndicatorStrategy, Route, StrategyFactory,
    TradingStrategy,
};
use aurum::application::system::signal_engine::SignalEngine;
use aurum::domain::market::strategy_config::StrategyMode;
use aurum::domain::market::timeframe::Timeframe;
use aurum::domain::trading::symbol_series::SymbolSeries;
use aurum::domain::trading::types::{Candle, RiskLevel, SignalKind, Tick};
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

/// Candles following `closes`, opening at the previous close with a half-point wick.
fn candles_from(closes: &[f64]) -> Vec<Candle> {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                open_time: t0 + Duration::minutes(i as i64),
                open,
                high: open.max(close) + 0.5,
                low: open.min(close) - 0.5,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// 188 rising candles followed by a 12-candle sell-off: EMAs still stacked
/// bullishly while RSI is deeply oversold.
fn oversold_uptrend() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..188).map(|i| 100.0 + i as f64).collect();
    for _ in 0..12 {
        let last = closes[closes.len() - 1];
        closes.push(last - 3.0);
    }
    closes
}

#[test]
fn oversold_uptrend_yields_confident_buy() {
    let candles = candles_from(&oversold_uptrend());
    assert_eq!(candles.len(), 200);

    let mut series = SymbolSeries::new("XAUUSD", 500);
    series.seed(candles);
    let mut engine = SignalEngine::new(
        series,
        Timeframe::OneMin,
        Arc::new(MultiIndicatorStrategy::default()),
    );

    let signal = engine.analyze();
    let snapshot = signal.indicator_snapshot.expect("snapshot attached");
    assert!(snapshot.ema_20 > snapshot.ema_50 && snapshot.ema_50 > snapshot.ema_200);
    assert!(snapshot.rsi < 30.0);

    assert!(matches!(signal.signal, SignalKind::Buy | SignalKind::StrongBuy));
    assert!(signal.confidence > 70.0);
    assert_eq!(signal.strategy_name, "Multi-Indicator");
    assert_eq!(signal.entry_price, 251.0);
    assert!(signal.stop_loss < signal.entry_price && signal.entry_price < signal.take_profit);
    assert!(signal.reasoning.iter().any(|r| r.contains("Strong Uptrend")));
    assert!(signal.reasoning.iter().any(|r| r.starts_with("Oversold")));
}

#[test]
fn short_history_is_held_before_any_analyzer_runs() {
    for mode in StrategyMode::all() {
        let mut series = SymbolSeries::new("XAUUSD", 500);
        series.seed(candles_from(&[2000.0; 19]));
        let mut engine =
            SignalEngine::new(series, Timeframe::OneMin, StrategyFactory::create(mode));

        let signal = engine.analyze();
        assert_eq!(signal.signal, SignalKind::Hold, "mode {}", mode);
        assert_eq!(signal.confidence, 0.0);
        assert_eq!(signal.risk_level, RiskLevel::High);
        assert_eq!(signal.reasoning, vec!["Insufficient data".to_string()]);
    }
}

#[test]
fn ticks_flow_into_the_latest_signal() {
    let closes = oversold_uptrend();
    let mut series = SymbolSeries::new("XAUUSD", 500);
    series.seed(candles_from(&closes));
    let mut engine = SignalEngine::new(
        series,
        Timeframe::OneMin,
        StrategyFactory::create(StrategyMode::Adaptive),
    );
    assert!(engine.latest_signal().is_none());

    let last_open = engine.series().last().unwrap().open_time;
    let tick = Tick {
        symbol: "XAUUSD".to_string(),
        bid: 249.5,
        ask: 250.5,
        timestamp: last_open + Duration::seconds(90),
        volume: 300.0,
    };
    engine.ingest(&tick).unwrap();
    assert_eq!(engine.series().len(), 201);

    let signal = engine.analyze();
    assert_eq!(signal.entry_price, 250.0);
    assert_eq!(
        engine.latest_signal().map(|s| s.strategy_name.clone()),
        Some(signal.strategy_name.clone())
    );
    assert_eq!(engine.latest_frame().unwrap().len(), 201);
}

fn analyzer_name(route: Route) -> &'static str {
    match route {
        Route::ElliottWave => "Elliott Wave",
        Route::MeanReversion => "Mean Reversion",
        Route::Breakout => "Breakout",
        Route::Fibonacci => "Fibonacci",
    }
}

#[test]
fn dispatcher_delegates_to_exactly_one_analyzer() {
    let uptrend: Vec<f64> = (0..120).map(|i| 100.0 + i as f64 * 0.8).collect();
    let downtrend: Vec<f64> = (0..120).map(|i| 300.0 - i as f64 * 0.8).collect();
    let ranging: Vec<f64> = (0..120)
        .map(|i| 100.0 + (i as f64 * 0.7).sin() * 0.3)
        .collect();
    let whipsaw: Vec<f64> = (0..120)
        .map(|i| if i % 2 == 0 { 100.0 } else { 112.0 })
        .collect();

    let adaptive = AdaptiveStrategy::new();
    let engine = IndicatorEngine::new();
    for closes in [uptrend, downtrend, ranging, whipsaw, oversold_uptrend()] {
        let frame = engine.compute(&candles_from(&closes));
        let price = *closes.last().unwrap();
        let ctx = AnalysisContext::new("XAUUSD", &frame, price);

        let first = adaptive.dispatch(&ctx);
        let second = adaptive.dispatch(&ctx);
        assert_eq!(first.regime, second.regime);
        assert_eq!(first.signal.signal, second.signal.signal);

        assert_eq!(first.route, Route::for_regime(first.regime.regime));
        if first.delegated {
            assert_eq!(first.signal.strategy_name, analyzer_name(first.route));
            assert!(first.signal.reasoning[0].starts_with("Market regime: "));
        } else {
            assert_eq!(first.signal.strategy_name, "Adaptive (fallback)");
            assert_eq!(first.signal.confidence, 0.0);
        }
        assert!((0.0..=100.0).contains(&first.signal.confidence));
    }
}

#[test]
fn flat_market_reads_overbought_and_composite_sells() {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
    let candles: Vec<Candle> = (0..60)
        .map(|i| Candle::flat(t0 + Duration::minutes(i), 100.0, 1.0))
        .collect();
    let frame = IndicatorEngine::new().compute(&candles);
    let ctx = AnalysisContext::new("XAUUSD", &frame, 100.0);

    let snapshot = frame.latest().unwrap();
    assert_eq!(snapshot.rsi, 100.0);
    assert_eq!(snapshot.stoch_k, 0.0);

    // Bearish fall-through, overbought RSI, oversold stochastic
    let strategy = MultiIndicatorStrategy::default();
    assert_eq!(strategy.score(&ctx).unwrap().score(), -25.0);
    let signal = strategy.analyze(&ctx).unwrap();
    assert_eq!(signal.signal, SignalKind::Sell);
    assert_eq!(signal.confidence, 75.0);
    assert!(signal.reasoning.iter().any(|r| r.starts_with("Overbought")));
}
