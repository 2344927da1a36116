//! Orchestration of the report pipeline: obtain the raw document, decode it,
//! and run the extractors. Failures to obtain or read the document are
//! contained here; callers always get a (possibly defaulted) result.

use log::error;

use super::facts::{clean_number, simple_fact};
use super::reader::decode_report;
use super::records::{capacity_records, drain_series, usage_records};
use super::section::section;
use super::{FullReport, ReportError, ReportSummary};

const RECENT_USAGE_START: &str = "Recent usage";
const RECENT_USAGE_END: &str = "Battery usage";
const CAPACITY_START: &str = "Battery capacity history";
const CAPACITY_END: &str = "Battery life estimates";

/// Source of raw report bytes. The production implementation shells out to
/// the host report generator; tests substitute canned documents.
pub trait ReportSource {
    fn fetch(&self) -> Result<Vec<u8>, ReportError>;
}

/// Generates a battery report with `powercfg /batteryreport` into a temp
/// file and reads it back. The temp file is removed when the handle drops,
/// so no report ever lingers on disk.
pub struct PowercfgSource;

#[cfg(target_os = "windows")]
impl ReportSource for PowercfgSource {
    fn fetch(&self) -> Result<Vec<u8>, ReportError> {
        use std::process::Command;

        let file = tempfile::Builder::new()
            .prefix("battery_report")
            .suffix(".html")
            .tempfile()?;

        let status = Command::new("powercfg")
            .arg("/batteryreport")
            .arg("/output")
            .arg(file.path())
            .status()?;
        if !status.success() {
            return Err(ReportError::Generator(format!(
                "powercfg exited with {status}"
            )));
        }

        Ok(std::fs::read(file.path())?)
    }
}

#[cfg(not(target_os = "windows"))]
impl ReportSource for PowercfgSource {
    fn fetch(&self) -> Result<Vec<u8>, ReportError> {
        Err(ReportError::Unsupported)
    }
}

/// Extracts the three headline facts from a decoded document.
pub fn parse_summary(document: &str) -> ReportSummary {
    ReportSummary {
        design_capacity: clean_number(&simple_fact(document, "DESIGN CAPACITY")),
        full_charge_capacity: clean_number(&simple_fact(document, "FULL CHARGE CAPACITY")),
        cycle_count: clean_number(&simple_fact(document, "CYCLE COUNT")),
    }
}

/// Extracts the drain series and both record tables from a decoded document.
pub fn parse_full(document: &str) -> FullReport {
    FullReport {
        drain_series: drain_series(document),
        usage_records: section(document, RECENT_USAGE_START, RECENT_USAGE_END)
            .map(usage_records)
            .unwrap_or_default(),
        capacity_records: section(document, CAPACITY_START, CAPACITY_END)
            .map(capacity_records)
            .unwrap_or_default(),
    }
}

/// Fetches and parses the headline facts. An unobtainable document is logged
/// and surfaces as the defaulted summary, never as an error.
pub fn load_summary<S: ReportSource + ?Sized>(source: &S) -> ReportSummary {
    match source.fetch() {
        Ok(bytes) => parse_summary(&decode_report(&bytes)),
        Err(err) => {
            error!("battery report unavailable: {err}");
            ReportSummary::default()
        }
    }
}

/// Fetches and parses the full report, with the same no-data fallback as
/// [`load_summary`].
pub fn load_full_report<S: ReportSource + ?Sized>(source: &S) -> FullReport {
    match source.fetch() {
        Ok(bytes) => parse_full(&decode_report(&bytes)),
        Err(err) => {
            error!("battery report unavailable: {err}");
            FullReport::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource(&'static str);

    impl ReportSource for StaticSource {
        fn fetch(&self) -> Result<Vec<u8>, ReportError> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    struct FailingSource;

    impl ReportSource for FailingSource {
        fn fetch(&self) -> Result<Vec<u8>, ReportError> {
            Err(ReportError::Generator("boom".into()))
        }
    }

    const DOC: &str = r#"
        <h1>Battery report</h1>
        <table>
            <tr><td>DESIGN CAPACITY</td><td>57,027 mWh</td></tr>
            <tr><td>FULL CHARGE CAPACITY</td><td>49,111 mWh</td></tr>
            <tr><td>CYCLE COUNT</td><td>312</td></tr>
        </table>
        <script>
            var drainGraphData = [
                { x0: "2025-01-01T00:00:00", y0: 0.5 },
                { x0: "2025-01-01T01:00:00", y0: 0.42 }
            ];
        </script>
        <h2>Recent usage</h2>
        <table>
            <tr><td><span class="date">2025-01-01</span> <span class="time">08:00:00</span></td>
                <td class="state">Active</td><td class="acdc">AC</td>
                <td class="percent">90 %</td><td class="mw">50,000 mWh</td></tr>
            <tr><td><span class="date"></span> <span class="time">12:00:00</span></td>
                <td class="state">Suspended</td><td class="acdc">Battery</td>
                <td class="percent">85 %</td><td class="mw">47,000 mWh</td></tr>
        </table>
        <h2>Battery usage</h2>
        <h2>Battery capacity history</h2>
        <table>
            <tr><td class="dateTime">2025-01-01 - 2025-01-07</td>
                <td class="mw">49,500 mWh</td><td class="mw">57,027 mWh</td></tr>
        </table>
        <h2>Battery life estimates</h2>"#;

    #[test]
    fn summary_facts_are_numeric_normalized() {
        let summary = parse_summary(DOC);
        assert_eq!(summary.design_capacity, "57027");
        assert_eq!(summary.full_charge_capacity, "49111");
        assert_eq!(summary.cycle_count, "312");
    }

    #[test]
    fn full_report_combines_all_three_extractors() {
        let report = parse_full(DOC);
        assert_eq!(report.drain_series.len(), 2);
        assert_eq!(report.drain_series[0].percentage, 50.0);
        assert_eq!(report.usage_records.len(), 2);
        assert_eq!(report.usage_records[0].start_time, "2025-01-01 12:00:00");
        assert_eq!(report.capacity_records.len(), 1);
        assert_eq!(report.capacity_records[0].full_charge_capacity, "49,500 mWh");
    }

    #[test]
    fn parsing_is_deterministic() {
        assert_eq!(parse_full(DOC), parse_full(DOC));
        assert_eq!(parse_summary(DOC), parse_summary(DOC));
    }

    #[test]
    fn missing_sections_leave_empty_tables() {
        let report = parse_full("<h1>nothing of interest</h1>");
        assert!(report.drain_series.is_empty());
        assert!(report.usage_records.is_empty());
        assert!(report.capacity_records.is_empty());
    }

    #[test]
    fn loaders_parse_through_a_source() {
        let summary = load_summary(&StaticSource(DOC));
        assert_eq!(summary.cycle_count, "312");
        let report = load_full_report(&StaticSource(DOC));
        assert_eq!(report.usage_records.len(), 2);
    }

    #[test]
    fn unobtainable_report_falls_back_to_defaults() {
        let summary = load_summary(&FailingSource);
        assert_eq!(summary, ReportSummary::default());
        assert_eq!(summary.design_capacity, "0");
        assert_eq!(load_full_report(&FailingSource), FullReport::default());
    }
}
