use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A", "-",
];

/// NFKC, trimmed, whitespace runs collapsed to a single space.
pub fn normalize_column_name(raw: &str) -> String {
    let composed: String = raw.nfkc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes every header, names blank ones by position, and suffixes
/// duplicates (`_2`, `_3`, ...) in order of appearance.
pub fn normalize_headers(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for (idx, header) in raw.iter().enumerate() {
        let mut name = normalize_column_name(header);
        if name.is_empty() {
            name = format!("column_{}", idx + 1);
        }
        let mut candidate = name.clone();
        let mut suffix = 2;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{name}_{suffix}");
            suffix += 1;
        }
        out.push(candidate);
    }
    out
}

pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

/// Parses a numeric cell, accepting a lone decimal comma (`3,5`).
pub fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    let value = match trimmed.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            if trimmed.matches(',').count() == 1 && !trimmed.contains('.') {
                trimmed.replace(',', ".").parse::<f64>().ok()?
            } else {
                return None;
            }
        }
    };
    value.is_finite().then_some(value)
}

/// Label used when a numeric column serves as a grouping variable.
pub fn format_label(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
