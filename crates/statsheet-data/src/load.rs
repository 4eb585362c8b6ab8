use crate::dataset::Dataset;
use crate::delimited::parse_delimited;
use crate::fetch::{fetch_source, FetchedSource};
use crate::source::SourceLocator;
use crate::xlsx::parse_xlsx;
use statsheet_core::config::LoaderConfig;
use statsheet_core::json::sha256_hex;
use statsheet_core::{AppError, AppResult};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE2_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub locator: SourceLocator,
    pub format: SourceFormat,
    pub sha256: String,
    pub dataset: Dataset,
}

pub fn load_dataset(raw_locator: &str, config: &LoaderConfig) -> AppResult<LoadedSource> {
    let locator = SourceLocator::parse(raw_locator)?;
    tracing::info!(source = %locator, "loading dataset");
    let fetched = fetch_source(&locator, config)?;
    let format = detect_format(&locator, &fetched)?;
    let dataset = match format {
        SourceFormat::Xlsx => parse_xlsx(&fetched.bytes)?,
        SourceFormat::Csv => parse_delimited(&fetched.bytes)?,
    };
    tracing::info!(
        format = ?format,
        rows = dataset.row_count(),
        columns = dataset.columns().len(),
        "dataset loaded"
    );
    Ok(LoadedSource {
        sha256: sha256_hex(&fetched.bytes),
        locator,
        format,
        dataset,
    })
}

pub fn detect_format(locator: &SourceLocator, fetched: &FetchedSource) -> AppResult<SourceFormat> {
    let bytes = fetched.bytes.as_slice();
    if bytes.starts_with(ZIP_MAGIC) {
        return Ok(SourceFormat::Xlsx);
    }
    if bytes.starts_with(OLE2_MAGIC) {
        return Err(AppError::load(
            "legacy .xls workbooks are not supported; save the file as .xlsx or .csv",
        ));
    }
    if looks_like_html(bytes, fetched.content_type.as_deref()) {
        return Err(AppError::load(
            "source returned an HTML page instead of a data file; check that the link is shared publicly",
        ));
    }
    match locator.extension().as_deref() {
        Some("xlsx") => return Ok(SourceFormat::Xlsx),
        Some("csv" | "tsv" | "txt") => return Ok(SourceFormat::Csv),
        _ => {}
    }
    if fetched
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.contains("spreadsheetml"))
    {
        return Ok(SourceFormat::Xlsx);
    }
    Ok(SourceFormat::Csv)
}

fn looks_like_html(bytes: &[u8], content_type: Option<&str>) -> bool {
    if content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html")) {
        return true;
    }
    let head: Vec<u8> = bytes
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take(15)
        .map(u8::to_ascii_lowercase)
        .collect();
    head.starts_with(b"<!doctype html") || head.starts_with(b"<html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::tests::{workbook_bytes, SURVEY_SHEET};
    use statsheet_core::ErrorKind;

    fn fetched(bytes: &[u8], content_type: Option<&str>) -> FetchedSource {
        FetchedSource {
            bytes: bytes.to_vec(),
            content_type: content_type.map(str::to_string),
        }
    }

    fn url(raw: &str) -> SourceLocator {
        SourceLocator::Url(raw.to_string())
    }

    #[test]
    fn magic_bytes_win_over_extension() {
        let locator = url("https://example.com/data.csv");
        assert_eq!(
            detect_format(&locator, &fetched(b"PK\x03\x04rest", None)).unwrap(),
            SourceFormat::Xlsx
        );
        let err = detect_format(&locator, &fetched(OLE2_MAGIC, None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
    }

    #[test]
    fn content_type_identifies_spreadsheets() {
        let locator = url("https://drive.google.com/uc?export=download&id=abc");
        let ct = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
        assert_eq!(
            detect_format(&locator, &fetched(b"a,b", Some(ct))).unwrap(),
            SourceFormat::Xlsx
        );
        assert_eq!(
            detect_format(&locator, &fetched(b"a,b", None)).unwrap(),
            SourceFormat::Csv
        );
    }

    #[test]
    fn html_pages_are_rejected() {
        let locator = url("https://drive.google.com/uc?export=download&id=abc");
        let err = detect_format(&locator, &fetched(b"  <!DOCTYPE html><html>", None)).unwrap_err();
        assert!(err.message().contains("HTML"));
        assert!(detect_format(&locator, &fetched(b"a,b", Some("text/html; charset=utf-8"))).is_err());
    }

    #[test]
    fn loads_local_csv_and_records_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.csv");
        std::fs::write(&path, "group,satisfaction\nA,3\nB,4\n").unwrap();
        let loaded = load_dataset(path.to_str().unwrap(), &LoaderConfig::default()).unwrap();
        assert_eq!(loaded.format, SourceFormat::Csv);
        assert_eq!(loaded.dataset.row_count(), 2);
        assert_eq!(
            loaded.sha256,
            sha256_hex(b"group,satisfaction\nA,3\nB,4\n")
        );
    }

    #[test]
    fn loads_local_xlsx_without_extension_hint() {
        let sheet = r#"<worksheet><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>group</t></is></c><c r="B1" t="inlineStr"><is><t>score</t></is></c></row>
<row r="2"><c r="A2"><v>1</v></c><c r="B2"><v>2.5</v></c></row>
<row r="3"><c r="A3"><v>2</v></c><c r="B3"><v>4</v></c></row>
</sheetData></worksheet>"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("download");
        std::fs::write(&path, workbook_bytes(&[("xl/worksheets/sheet1.xml", sheet)])).unwrap();
        let loaded = load_dataset(path.to_str().unwrap(), &LoaderConfig::default()).unwrap();
        assert_eq!(loaded.format, SourceFormat::Xlsx);
        assert_eq!(loaded.dataset.numeric("score").unwrap(), &[Some(2.5), Some(4.0)]);
        assert_eq!(
            loaded.dataset.labels("group").unwrap(),
            vec![Some("1".to_string()), Some("2".to_string())]
        );
    }

    #[test]
    fn shared_string_reference_without_table_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.xlsx");
        std::fs::write(&path, workbook_bytes(&[("xl/worksheets/sheet1.xml", SURVEY_SHEET)])).unwrap();
        let err = load_dataset(path.to_str().unwrap(), &LoaderConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
    }
}
