// Tick aggregation and indicator computation
pub mod market_data;

// Position sizing and simulated position book
pub mod risk_management;

// Signal analyzers and regime dispatch
pub mod strategies;

// Run loop orchestrator
pub mod system;
