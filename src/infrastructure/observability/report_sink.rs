use crate::domain::errors::PersistenceError;
use crate::domain::market::indicator_frame::{IndicatorFrame, IndicatorSeries};
use crate::domain::ports::ReportSink;
use crate::domain::trading::types::TradingSignal;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const CANDLE_COLUMNS: [&str; 6] = ["open_time", "open", "high", "low", "close", "volume"];

/// Writes `<dir>/<symbol>_<timestamp>.csv` (candles plus every indicator column)
/// and the matching `<dir>/<symbol>_<timestamp>.signal.json`.
pub struct CsvReportSink {
    dir: PathBuf,
}

impl CsvReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_frame(&self, path: &Path, frame: &IndicatorFrame) -> Result<(), PersistenceError> {
        let mut wtr = csv::Writer::from_path(path)?;

        let series = frame.series();
        let mut header: Vec<&str> = CANDLE_COLUMNS.to_vec();
        if series.is_some() {
            header.extend(IndicatorSeries::COLUMNS);
        }
        wtr.write_record(&header)?;

        for (i, candle) in frame.candles().iter().enumerate() {
            let mut row = vec![
                candle.open_time.to_rfc3339(),
                candle.open.to_string(),
                candle.high.to_string(),
                candle.low.to_string(),
                candle.close.to_string(),
                candle.volume.to_string(),
            ];
            if let Some(series) = series {
                row.extend(series.columns().iter().map(|col| col[i].to_string()));
            }
            wtr.write_record(&row)?;
        }

        wtr.flush().map_err(|source| PersistenceError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl ReportSink for CsvReportSink {
    fn publish(
        &mut self,
        symbol: &str,
        frame: &IndicatorFrame,
        signal: &TradingSignal,
    ) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let stem = format!("{}_{}", symbol, Utc::now().format("%Y%m%d_%H%M%S_%3f"));
        let csv_path = self.dir.join(format!("{}.csv", stem));
        let json_path = self.dir.join(format!("{}.signal.json", stem));

        self.write_frame(&csv_path, frame)?;
        let json = serde_json::to_string_pretty(signal)?;
        fs::write(&json_path, json).map_err(|source| PersistenceError::Io {
            path: json_path.display().to_string(),
            source,
        })?;

        info!(
            "CsvReportSink: Wrote {} rows for {} to {}",
            frame.len(),
            symbol,
            csv_path.display()
        );
        Ok(())
    }
}
