//! Live battery telemetry from the host power subsystem.
//!
//! The probes shell out to the WMI battery class the same way the report
//! generator is shelled out to. They are synchronous and cheap; the alarm
//! loop calls them from a blocking worker each tick.

use serde::Serialize;
use thiserror::Error;

/// One live sample consumed by the alarm state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatterySample {
    pub level: u8,
    pub plugged_in: bool,
}

/// Failure to read the live sample. The alarm loop skips the tick on this,
/// leaving the trigger latches untouched.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("battery query failed: {0}")]
    Probe(#[from] std::io::Error),
    #[error("battery telemetry missing from query output")]
    Missing,
    #[error("live battery telemetry is only available on Windows")]
    Unsupported,
}

/// WMI reports BatteryStatus 2 when running on AC power.
#[cfg(target_os = "windows")]
const AC_CONNECTED: u64 = 2;

/// Reads the current charge level and power-source state.
#[cfg(target_os = "windows")]
pub fn read_sample() -> Result<BatterySample, SampleError> {
    let level = query_battery_field("EstimatedChargeRemaining")?;
    let status = query_battery_field("BatteryStatus")?;

    Ok(BatterySample {
        level: level.min(100) as u8,
        plugged_in: status == AC_CONNECTED,
    })
}

#[cfg(not(target_os = "windows"))]
pub fn read_sample() -> Result<BatterySample, SampleError> {
    Err(SampleError::Unsupported)
}

/// Design voltage formatted for display, `"N/A"` when it can't be read.
pub fn live_voltage() -> String {
    match design_voltage_mv() {
        Some(mv) => format!("{:.2} V", mv as f64 / 1000.0),
        None => "N/A".to_string(),
    }
}

#[cfg(target_os = "windows")]
fn design_voltage_mv() -> Option<u64> {
    let output = std::process::Command::new("wmic")
        .args(["path", "Win32_Battery", "get", "DesignVoltage"])
        .output()
        .ok()?;
    first_numeric_line(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(not(target_os = "windows"))]
fn design_voltage_mv() -> Option<u64> {
    None
}

#[cfg(target_os = "windows")]
fn query_battery_field(field: &str) -> Result<u64, SampleError> {
    let output = std::process::Command::new("wmic")
        .args(["path", "Win32_Battery", "get", field])
        .output()?;
    first_numeric_line(&String::from_utf8_lossy(&output.stdout)).ok_or(SampleError::Missing)
}

/// The query output is a header line followed by the value; pick the first
/// line that is purely digits.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn first_numeric_line(output: &str) -> Option<u64> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && line.chars().all(|c| c.is_ascii_digit()))
        .and_then(|line| line.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_first_numeric_line() {
        let output = "EstimatedChargeRemaining  \r\n87  \r\n\r\n";
        assert_eq!(first_numeric_line(output), Some(87));
    }

    #[test]
    fn ignores_headers_and_blank_lines() {
        assert_eq!(first_numeric_line("DesignVoltage\r\n\r\n11400\r\n"), Some(11400));
        assert_eq!(first_numeric_line("DesignVoltage\r\n\r\n"), None);
        assert_eq!(first_numeric_line(""), None);
    }
}
