use crate::dataset::Dataset;
use crate::normalize::format_label;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use statsheet_core::{AppError, AppResult};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

const WORKBOOK_PATH: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PATH: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";
/// Column count of a worksheet (`A` through `XFD`).
const MAX_COLUMNS: usize = 16_384;

pub fn parse_xlsx(bytes: &[u8]) -> AppResult<Dataset> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::load(format!("invalid xlsx archive: {e}")))?;

    let shared = match read_entry(&mut archive, SHARED_STRINGS_PATH)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };
    let sheet_path = first_sheet_path(&mut archive)?;
    tracing::debug!(sheet = %sheet_path, shared_strings = shared.len(), "reading worksheet");
    let sheet_xml = read_entry(&mut archive, &sheet_path)?
        .ok_or_else(|| AppError::load(format!("worksheet {sheet_path} missing from workbook")))?;

    let mut rows = parse_sheet(&sheet_xml, &shared)?
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()));
    let headers = rows
        .next()
        .ok_or_else(|| AppError::load("worksheet contains no rows"))?;
    let rows: Vec<Vec<String>> = rows.collect();
    Dataset::from_text_rows(&headers, &rows)
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> AppResult<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(AppError::load(format!("failed to open {name}: {e}"))),
    };
    let mut text = String::new();
    file.read_to_string(&mut text)
        .map_err(|e| AppError::load(format!("failed to read {name}: {e}")))?;
    Ok(Some(text))
}

fn xml_error(part: &str, e: impl std::fmt::Display) -> AppError {
    AppError::load(format!("malformed {part}: {e}"))
}

fn attribute(e: &BytesStart<'_>, part: &str, key: &[u8]) -> AppResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_error(part, err))?;
        if attr.key.as_ref() == key || attr.key.local_name().as_ref() == key {
            let value = attr.unescape_value().map_err(|err| xml_error(part, err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Worksheet path of the first sheet in workbook order.
fn first_sheet_path(archive: &mut ZipArchive<Cursor<&[u8]>>) -> AppResult<String> {
    let ordered = match (
        read_entry(archive, WORKBOOK_PATH)?,
        read_entry(archive, WORKBOOK_RELS_PATH)?,
    ) {
        (Some(workbook), Some(rels)) => {
            let first_id = first_sheet_relationship(&workbook)?;
            let targets = relationship_targets(&rels)?;
            first_id.and_then(|id| targets.get(&id).cloned())
        }
        _ => None,
    };
    if let Some(target) = ordered {
        return Ok(resolve_target(&target));
    }

    archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix("xl/worksheets/sheet")?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((number, name.to_string()))
        })
        .min()
        .map(|(_, name)| name)
        .ok_or_else(|| AppError::load("workbook contains no worksheets"))
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

fn first_sheet_relationship(xml: &str) -> AppResult<Option<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"sheet" =>
            {
                return attribute(e, "workbook", b"r:id");
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(xml_error("workbook", e)),
            _ => {}
        }
        buf.clear();
    }
}

fn relationship_targets(xml: &str) -> AppResult<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut targets = HashMap::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attribute(e, "relationships", b"Id")?;
                let target = attribute(e, "relationships", b"Target")?;
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("relationships", e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(targets)
}

/// Concatenated `<t>` runs of each `<si>`, skipping phonetic runs.
fn parse_shared_strings(xml: &str) -> AppResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    let mut phonetic_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" => in_text = true,
                b"rPh" => phonetic_depth += 1,
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Ok(Event::Text(ref e)) if in_text && phonetic_depth == 0 => {
                if let Some(current) = current.as_mut() {
                    let text = e.unescape().map_err(|err| xml_error("shared strings", err))?;
                    current.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) if in_text && phonetic_depth == 0 => {
                if let Some(current) = current.as_mut() {
                    current.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    if let Some(done) = current.take() {
                        strings.push(done);
                    }
                }
                b"t" => in_text = false,
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("shared strings", e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

#[derive(Debug, Default)]
struct PendingCell {
    column: usize,
    kind: Option<String>,
    value: String,
}

fn parse_sheet(xml: &str, shared: &[String]) -> AppResult<Vec<Vec<String>>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Option<Vec<String>> = None;
    let mut cell: Option<PendingCell> = None;
    let mut in_value = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"row" => row = Some(Vec::new()),
                b"c" => cell = Some(start_cell(e, row.as_ref().map_or(0, Vec::len))?),
                b"v" | b"t" => in_value = cell.is_some(),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"row" => rows.push(Vec::new()),
                b"c" => {
                    let pending = start_cell(e, row.as_ref().map_or(0, Vec::len))?;
                    if let Some(row) = row.as_mut() {
                        place(row, pending.column, String::new());
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_value => {
                if let Some(cell) = cell.as_mut() {
                    let text = e.unescape().map_err(|err| xml_error("worksheet", err))?;
                    cell.value.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    if let (Some(pending), Some(row)) = (cell.take(), row.as_mut()) {
                        let column = pending.column;
                        place(row, column, cell_text(pending, shared)?);
                    }
                }
                b"row" => {
                    if let Some(done) = row.take() {
                        rows.push(done);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("worksheet", e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}

fn start_cell(e: &BytesStart<'_>, next_column: usize) -> AppResult<PendingCell> {
    let reference = attribute(e, "worksheet", b"r")?;
    let column = match reference.as_deref() {
        Some(reference) => column_index(reference).unwrap_or(Some(next_column)),
        None => Some(next_column),
    };
    let column = column.filter(|column| *column < MAX_COLUMNS).ok_or_else(|| {
        AppError::load(format!(
            "cell reference '{}' out of range",
            reference.as_deref().unwrap_or_default()
        ))
    })?;
    Ok(PendingCell {
        column,
        kind: attribute(e, "worksheet", b"t")?,
        value: String::new(),
    })
}

fn place(row: &mut Vec<String>, column: usize, value: String) {
    if row.len() <= column {
        row.resize(column + 1, String::new());
    }
    row[column] = value;
}

fn cell_text(cell: PendingCell, shared: &[String]) -> AppResult<String> {
    match cell.kind.as_deref() {
        Some("s") => {
            let idx: usize = cell.value.trim().parse().map_err(|_| {
                AppError::load(format!("invalid shared string index '{}'", cell.value))
            })?;
            shared
                .get(idx)
                .cloned()
                .ok_or_else(|| AppError::load(format!("shared string {idx} out of range")))
        }
        Some("b") => Ok(match cell.value.trim() {
            "1" => "TRUE".to_string(),
            "0" => "FALSE".to_string(),
            other => other.to_string(),
        }),
        Some("n") | None => Ok(match cell.value.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => format_label(number),
            _ => cell.value,
        }),
        _ => Ok(cell.value),
    }
}

/// Zero-based column index of an A1-style reference (`"C7"` is 2).
///
/// `None` when the reference has no column letters, `Some(None)` when the
/// letters overflow.
fn column_index(reference: &str) -> Option<Option<usize>> {
    let letters: Vec<char> = reference
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect();
    if letters.is_empty() {
        return None;
    }
    let index = letters.iter().try_fold(0usize, |index, ch| {
        let digit = ch.to_ascii_uppercase() as usize - 'A' as usize + 1;
        index.checked_mul(26)?.checked_add(digit)
    });
    Some(index.map(|index| index - 1))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dataset::ColumnData;
    use statsheet_core::ErrorKind;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    pub(crate) fn workbook_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Survey" sheetId="2" r:id="rId7"/><sheet name="Old" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId7" Type="worksheet" Target="/xl/worksheets/sheet2.xml"/>
</Relationships>"#;

    const SHARED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="4" uniqueCount="4">
<si><t>group</t></si><si><t>score</t></si><si><r><t>Gr</t></r><r><t xml:space="preserve">oup A</t></r><rPh><t>x</t></rPh></si><si><t>B &amp; C</t></si>
</sst>"#;

    pub(crate) const SURVEY_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="inlineStr"><is><t>passed</t></is></c></row>
<row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>3.5</v></c><c r="C2" t="b"><v>1</v></c></row>
<row r="4"><c r="A4" t="s"><v>3</v></c><c r="C4" t="b"><v>0</v></c></row>
</sheetData></worksheet>"#;

    const OLD_SHEET: &str = r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>old</t></is></c></row><row r="2"><c r="A2"><v>1</v></c></row></sheetData></worksheet>"#;

    #[test]
    fn reads_first_sheet_in_workbook_order() {
        let bytes = workbook_bytes(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELS),
            ("xl/sharedStrings.xml", SHARED),
            ("xl/worksheets/sheet1.xml", OLD_SHEET),
            ("xl/worksheets/sheet2.xml", SURVEY_SHEET),
        ]);
        let dataset = parse_xlsx(&bytes).unwrap();
        assert_eq!(dataset.column_names(), vec!["group", "score", "passed"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.numeric("score").unwrap(), &[Some(3.5), None]);
        match dataset.column("group").unwrap().data() {
            ColumnData::Categorical(values) => assert_eq!(
                values,
                &vec![Some("Group A".to_string()), Some("B & C".to_string())]
            ),
            other => panic!("unexpected column {other:?}"),
        }
        assert_eq!(
            dataset.labels("passed").unwrap(),
            vec![Some("TRUE".to_string()), Some("FALSE".to_string())]
        );
    }

    #[test]
    fn falls_back_to_lowest_numbered_sheet() {
        let bytes = workbook_bytes(&[
            ("xl/worksheets/sheet3.xml", SURVEY_SHEET),
            ("xl/worksheets/sheet1.xml", OLD_SHEET),
        ]);
        let dataset = parse_xlsx(&bytes).unwrap();
        assert_eq!(dataset.column_names(), vec!["old"]);
        assert_eq!(dataset.numeric("old").unwrap(), &[Some(1.0)]);
    }

    #[test]
    fn workbook_without_sheets_is_a_load_error() {
        let bytes = workbook_bytes(&[("docProps/app.xml", "<Properties/>")]);
        assert_eq!(parse_xlsx(&bytes).unwrap_err().kind(), ErrorKind::Load);
        assert_eq!(
            parse_xlsx(b"PK\x03\x04broken").unwrap_err().kind(),
            ErrorKind::Load
        );
    }

    #[test]
    fn column_references_map_to_indices() {
        assert_eq!(column_index("A1"), Some(Some(0)));
        assert_eq!(column_index("c7"), Some(Some(2)));
        assert_eq!(column_index("AA10"), Some(Some(26)));
        assert_eq!(column_index("XFD1"), Some(Some(16_383)));
        assert_eq!(column_index("12"), None);
        assert_eq!(column_index("ZZZZZZZZZZZZZZ1"), Some(None));
    }

    #[test]
    fn out_of_range_cell_references_are_load_errors() {
        for reference in ["ZZZZZZZZZZZZZZ1", "ZZZZZZ1", "XFE1"] {
            let sheet = format!(
                r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>score</t></is></c><c r="{reference}"><v>1</v></c></row></sheetData></worksheet>"#
            );
            let bytes = workbook_bytes(&[("xl/worksheets/sheet1.xml", sheet.as_str())]);
            let err = parse_xlsx(&bytes).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Load);
            assert!(err.message().contains("out of range"), "{}", err.message());
        }
    }

    #[test]
    fn last_excel_column_is_accepted() {
        let sheet = r#"<worksheet><sheetData><row r="1"><c r="XFD1" t="inlineStr"><is><t>far</t></is></c></row><row r="2"><c r="XFD2"><v>2</v></c></row></sheetData></worksheet>"#;
        let bytes = workbook_bytes(&[("xl/worksheets/sheet1.xml", sheet)]);
        let dataset = parse_xlsx(&bytes).unwrap();
        assert_eq!(dataset.numeric("far").unwrap(), &[Some(2.0)]);
    }
}
