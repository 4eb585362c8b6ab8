use crate::dataset::Dataset;
use statsheet_core::{AppError, AppResult};

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn parse_delimited(bytes: &[u8]) -> AppResult<Dataset> {
    let text = decode_text(bytes);
    let delimiter = sniff_delimiter(&text);
    tracing::debug!(delimiter = %(delimiter as char).escape_default(), "parsing delimited text");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| AppError::load(format!("csv parse error at row {}: {e}", idx + 1)))?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        records.push(cells);
    }

    let mut rows = records.into_iter();
    let headers = rows
        .next()
        .ok_or_else(|| AppError::load("source contains no rows"))?;
    let rows: Vec<Vec<String>> = rows.collect();
    Dataset::from_text_rows(&headers, &rows)
}

fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "source is not valid UTF-8; decoding lossily");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Most frequent candidate outside quotes on the first non-blank line; comma on ties.
pub fn sniff_delimiter(text: &str) -> u8 {
    let header = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for byte in header.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(pos) = CANDIDATE_DELIMITERS.iter().position(|d| *d == byte) {
            counts[pos] += 1;
        }
    }
    let mut best = 0;
    for (pos, count) in counts.iter().enumerate() {
        if *count > counts[best] {
            best = pos;
        }
    }
    CANDIDATE_DELIMITERS[best]
}
