pub mod trade_history;

pub use trade_history::JsonTradeHistoryStore;
