use crate::domain::errors::PersistenceError;
use crate::domain::ports::{TradeHistoryDocument, TradeHistoryStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Pretty-printed JSON document, replaced atomically on each save.
pub struct JsonTradeHistoryStore {
    file_path: PathBuf,
}

impl JsonTradeHistoryStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn load(&self) -> Result<Option<TradeHistoryDocument>, PersistenceError> {
        if !self.file_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.file_path).map_err(|source| self.io(source))?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn io(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.file_path.display().to_string(),
            source,
        }
    }
}

impl TradeHistoryStore for JsonTradeHistoryStore {
    fn save(&self, document: &TradeHistoryDocument) -> Result<(), PersistenceError> {
        let content = serde_json::to_string_pretty(document)?;

        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io(source))?;
        }

        // Atomic write: write to temp file then rename
        let temp_path = self.file_path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(|source| self.io(source))?;
        fs::rename(&temp_path, &self.file_path).map_err(|source| self.io(source))?;

        info!(
            "JsonTradeHistoryStore: Saved {} trades to {:?}",
            document.trades.len(),
            self.file_path
        );
        Ok(())
    }
}
