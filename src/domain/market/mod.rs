// Market analysis domain
pub mod indicator_frame;
pub mod market_regime;
pub mod strategy_config;
pub mod timeframe;
