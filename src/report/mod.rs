pub mod facts;
pub mod parser;
pub mod reader;
pub mod records;
pub mod section;

use serde::Serialize;
use thiserror::Error;

pub use parser::{load_full_report, load_summary, PowercfgSource, ReportSource};

/// One sample of the high-resolution charge-over-time series embedded in the
/// report document. `percentage` is already scaled to 0.0..=100.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrainPoint {
    pub timestamp: String,
    pub percentage: f64,
}

/// One row of the power-state history table. All fields are markup-stripped
/// and whitespace-normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord {
    pub start_time: String,
    pub state: String,
    pub source: String,
    pub capacity_percent: String,
    pub remaining_energy: String,
}

/// One observation of full-charge capacity against design capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityRecord {
    pub period: String,
    pub full_charge_capacity: String,
    pub design_capacity: String,
}

/// The three headline facts, normalized to digit-and-decimal strings so the
/// frontend can do arithmetic without guarding against missing values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub design_capacity: String,
    pub full_charge_capacity: String,
    pub cycle_count: String,
}

impl Default for ReportSummary {
    fn default() -> Self {
        Self {
            design_capacity: "0".into(),
            full_charge_capacity: "0".into(),
            cycle_count: "0".into(),
        }
    }
}

/// Everything extracted from one report document. Usage and capacity rows are
/// newest-first; the drain series keeps the document's oldest-first order
/// because the chart consumes it left to right.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FullReport {
    pub drain_series: Vec<DrainPoint>,
    pub usage_records: Vec<UsageRecord>,
    pub capacity_records: Vec<CapacityRecord>,
}

/// Failures obtaining the report document. A missing label, section or row is
/// never an error; the extractors return defaults for those.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read report document: {0}")]
    Io(#[from] std::io::Error),
    #[error("report generator failed: {0}")]
    Generator(String),
    #[error("battery reports are only available on Windows")]
    Unsupported,
}
