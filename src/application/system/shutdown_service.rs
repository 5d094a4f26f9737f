use crate::domain::ports::{TradeHistoryDocument, TradeHistoryStore};
use crate::domain::trading::types::TradeRecord;
use chrono::Utc;
use tracing::{error, info};

/// End-of-session bookkeeping. Every step is best-effort.
pub struct ShutdownService<'a> {
    history_store: Option<&'a dyn TradeHistoryStore>,
}

impl<'a> ShutdownService<'a> {
    pub fn new(history_store: Option<&'a dyn TradeHistoryStore>) -> Self {
        Self { history_store }
    }

    /// Persists the closed trades. Returns whether the document was written.
    pub fn shutdown(&self, trades: &[TradeRecord]) -> bool {
        info!("Initiating Graceful Shutdown Sequence...");

        let Some(store) = self.history_store else {
            info!("Step 1: Trade history persistence disabled, skipping.");
            return false;
        };

        info!("Step 1: Saving trade history ({} trades)...", trades.len());
        let document = TradeHistoryDocument {
            summary_time: Utc::now(),
            trades: trades.to_vec(),
        };
        match store.save(&document) {
            Ok(()) => {
                info!("Trade history saved.");
                true
            }
            Err(e) => {
                error!("Failed to save trade history during shutdown: {}", e);
                false
            }
        }
    }
}
