//! Outbound-only session artefacts: periodic frame/signal reports.

pub mod report_sink;

pub use report_sink::CsvReportSink;
