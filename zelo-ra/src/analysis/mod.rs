//! Recurrence analysis pipeline
//!
//! Pure text processing (keywords, frequency) feeding the ledger-updating
//! analyzer and the company-wide sweep driver.

pub mod analyzer;
pub mod frequency;
pub mod keywords;
pub mod sweep;

pub use analyzer::{AssetAnalysis, RecurrenceAnalyzer};
pub use sweep::{sweep_company, SweepSummary};
