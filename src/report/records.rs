//! Repeating record extraction: usage rows, capacity rows and the embedded
//! drain series. The report markup is a third-party format, so every pattern
//! tolerates arbitrary intervening tags and whitespace and zero matches just
//! produce an empty sequence.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use super::{CapacityRecord, DrainPoint, UsageRecord};

/// Six-field power-state row: date span, time span, then state / power
/// source / capacity / energy cells, with anything in between.
static USAGE_ROW: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(concat!(
        r#"<span class="date">([\s\S]*?)</span>\s*<span class="time">([\s\S]*?)</span>"#,
        r#"[\s\S]*?class="state">\s*([\s\S]*?)\s*</td>"#,
        r#"[\s\S]*?class="acdc">\s*([\s\S]*?)\s*</td>"#,
        r#"[\s\S]*?class="percent">\s*([\s\S]*?)\s*</td>"#,
        r#"[\s\S]*?class="mw">\s*([\s\S]*?)\s*</td>"#
    ))
    .case_insensitive(true)
    .build()
    .expect("usage row pattern")
});

/// Three-field capacity row: period cell followed by two energy cells.
static CAPACITY_ROW: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(concat!(
        r#"<td[^>]*class="dateTime"[^>]*>([\s\S]*?)</td>\s*"#,
        r#"<td[^>]*class="mw"[^>]*>([\s\S]*?)</td>\s*"#,
        r#"<td[^>]*class="mw"[^>]*>([\s\S]*?)</td>"#
    ))
    .case_insensitive(true)
    .build()
    .expect("capacity row pattern")
});

/// One point of the scripted drain-series literal: a quoted timestamp under
/// `x0` and a 0..1 level fraction under `y0`.
static DRAIN_POINT: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r#"x0:\s*"(.*?)".*?y0:\s*([0-9.]+)"#)
        .dot_matches_new_line(true)
        .build()
        .expect("drain point pattern")
});

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Collapses entity spaces and whitespace runs left behind by the markup.
fn clean_markup(raw: &str) -> String {
    let text = raw.replace("&nbsp;", " ");
    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}

/// Extracts power-state history rows from the "Recent usage" section.
///
/// The source table groups rows by day and only the first row of a group
/// carries the date, so a blank date cell inherits the last one seen. Rows
/// are prepended one at a time, turning the document's oldest-first order
/// into the newest-first order the history table displays.
pub fn usage_records(section: &str) -> Vec<UsageRecord> {
    let mut records = Vec::new();
    let mut last_date = String::new();

    for caps in USAGE_ROW.captures_iter(section) {
        let date = caps[1].trim();
        let time = caps[2].trim();
        let date = if date.is_empty() {
            last_date.clone()
        } else {
            last_date = date.to_string();
            last_date.clone()
        };

        records.insert(
            0,
            UsageRecord {
                start_time: clean_markup(&format!("{date} {time}")),
                state: clean_markup(&caps[3]),
                source: clean_markup(&caps[4]),
                capacity_percent: clean_markup(&caps[5]),
                remaining_energy: clean_markup(&caps[6]),
            },
        );
    }

    records
}

/// Extracts capacity-over-time rows, newest-first like the usage rows. The
/// period cell is always populated here, so there is no carry-forward.
pub fn capacity_records(section: &str) -> Vec<CapacityRecord> {
    let mut records = Vec::new();

    for caps in CAPACITY_ROW.captures_iter(section) {
        records.insert(
            0,
            CapacityRecord {
                period: clean_markup(&caps[1]),
                full_charge_capacity: clean_markup(&caps[2]),
                design_capacity: clean_markup(&caps[3]),
            },
        );
    }

    records
}

/// Extracts the drain series from the `drainGraphData` script literal.
///
/// The array literal is isolated by index lookup (`[` to the first `];`) and
/// points are matched inside it one object at a time. A point that fails to
/// parse is skipped rather than aborting the series. Points stay in document
/// order: the chart wants oldest-first.
pub fn drain_series(document: &str) -> Vec<DrainPoint> {
    let mut points = Vec::new();

    let Some(var_at) = document.find("drainGraphData") else {
        return points;
    };
    let tail = &document[var_at..];
    let Some(open) = tail.find('[') else {
        return points;
    };
    let Some(close) = tail[open..].find("];") else {
        return points;
    };
    let block = &tail[open..open + close + 1];

    for caps in DRAIN_POINT.captures_iter(block) {
        if let Ok(fraction) = caps[2].parse::<f64>() {
            points.push(DrainPoint {
                timestamp: caps[1].to_string(),
                // The literal stores the level as a 0..1 fraction.
                percentage: fraction * 100.0,
            });
        }
    }

    points
}
