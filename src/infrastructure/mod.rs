pub mod mock;
pub mod observability;
pub mod persistence;
pub mod replay;

pub use mock::SyntheticMarket;
pub use observability::CsvReportSink;
pub use persistence::JsonTradeHistoryStore;
pub use replay::ReplayTickSource;
