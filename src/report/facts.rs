//! Single labeled values ("simple facts") pulled from anywhere in the report.

use regex::RegexBuilder;

/// Finds `label` anywhere in the document and returns the text of the second
/// cell of the nearest following two-cell table row. Returns `"0"` when the
/// label or the row shape is absent, so callers never deal with a missing
/// value.
pub fn simple_fact(document: &str, label: &str) -> String {
    let pattern = format!(
        r#"{}[\s\S]*?</td>\s*<td>\s*([\s\S]*?)\s*</td>"#,
        regex::escape(label)
    );
    let Ok(re) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
        return "0".to_string();
    };
    re.captures(document)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_else(|| "0".to_string())
}

/// Strips everything that is not a digit or a decimal point. An empty result
/// normalizes to `"0"` so downstream arithmetic stays safe.
pub fn clean_number(raw: &str) -> String {
    let clean: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if clean.is_empty() {
        "0".to_string()
    } else {
        clean
    }
}
