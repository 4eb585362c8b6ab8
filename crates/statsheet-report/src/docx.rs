use crate::labels::Labels;
use crate::layout::{layout, Block, ReportDocument, Table};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use statsheet_analyzer::AnalysisOutcome;
use statsheet_core::{AppError, AppResult, Language};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const FONT: &str = "Times New Roman";
// A4 in twentieths of a point
const PAGE_WIDTH: u32 = 11906;
const PAGE_HEIGHT: u32 = 16838;
const MARGIN_VERTICAL: u32 = 1440;
const MARGIN_HORIZONTAL: u32 = 1800;
const TEXT_WIDTH: u32 = PAGE_WIDTH - 2 * MARGIN_HORIZONTAL;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

/// Renders the outcome as a .docx package held in memory.
pub fn render_docx(outcome: &AnalysisOutcome, language: Language) -> AppResult<Vec<u8>> {
    let document = layout(outcome, Labels::for_language(language));
    let document_xml = document_xml(&document, language)?;
    let styles_xml = styles_xml(language)?;

    let fixed_time = DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0)
        .map_err(|_| AppError::internal("failed to build fixed zip timestamp"))?;
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(fixed_time);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let parts: [(&str, &[u8]); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes()),
        ("word/document.xml", &document_xml),
        ("word/styles.xml", &styles_xml),
    ];
    for (name, data) in parts {
        zip.start_file(name, options)
            .map_err(|e| AppError::internal(format!("docx entry {name} error: {e}")))?;
        zip.write_all(data)
            .map_err(|e| AppError::internal(format!("docx write {name} error: {e}")))?;
    }
    let cursor = zip
        .finish()
        .map_err(|e| AppError::internal(format!("docx finish error: {e}")))?;
    let bytes = cursor.into_inner();
    tracing::debug!(test = %outcome.kind(), bytes = bytes.len(), "rendered docx");
    Ok(bytes)
}

struct Xml {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl Xml {
    fn new() -> AppResult<Self> {
        let mut xml = Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        };
        xml.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(xml)
    }

    fn event(&mut self, event: Event<'_>) -> AppResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| AppError::internal(format!("docx xml error: {e}")))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> AppResult<()> {
        let mut tag = BytesStart::new(name);
        for attr in attrs {
            tag.push_attribute(*attr);
        }
        self.event(Event::Start(tag))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> AppResult<()> {
        let mut tag = BytesStart::new(name);
        for attr in attrs {
            tag.push_attribute(*attr);
        }
        self.event(Event::Empty(tag))
    }

    fn end(&mut self, name: &str) -> AppResult<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> AppResult<()> {
        self.event(Event::Text(BytesText::new(text)))
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }
}

#[derive(Clone, Copy)]
struct ParagraphStyle<'a> {
    style: Option<&'a str>,
    align: Option<&'a str>,
    bold: bool,
}

const PLAIN: ParagraphStyle<'static> = ParagraphStyle {
    style: None,
    align: None,
    bold: false,
};

fn paragraph(xml: &mut Xml, text: &str, format: ParagraphStyle<'_>, rtl: bool) -> AppResult<()> {
    xml.start("w:p", &[])?;
    xml.start("w:pPr", &[])?;
    if let Some(style) = format.style {
        xml.empty("w:pStyle", &[("w:val", style)])?;
    }
    if rtl {
        xml.empty("w:bidi", &[])?;
    }
    if let Some(align) = format.align {
        xml.empty("w:jc", &[("w:val", align)])?;
    }
    xml.end("w:pPr")?;
    if !text.is_empty() {
        xml.start("w:r", &[])?;
        if format.bold || rtl {
            xml.start("w:rPr", &[])?;
            if format.bold {
                xml.empty("w:b", &[])?;
                xml.empty("w:bCs", &[])?;
            }
            if rtl {
                xml.empty("w:rtl", &[])?;
            }
            xml.end("w:rPr")?;
        }
        xml.start("w:t", &[("xml:space", "preserve")])?;
        xml.text(text)?;
        xml.end("w:t")?;
        xml.end("w:r")?;
    }
    xml.end("w:p")
}

fn table(xml: &mut Xml, table: &Table, rtl: bool) -> AppResult<()> {
    let columns = table.headers.len().max(1);
    let cell_width = (TEXT_WIDTH / columns as u32).to_string();

    xml.start("w:tbl", &[])?;
    xml.start("w:tblPr", &[])?;
    if rtl {
        xml.empty("w:bidiVisual", &[])?;
    }
    xml.empty("w:tblW", &[("w:w", "0"), ("w:type", "auto")])?;
    xml.empty("w:jc", &[("w:val", "center")])?;
    xml.start("w:tblBorders", &[])?;
    for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
        xml.empty(
            edge,
            &[("w:val", "single"), ("w:sz", "4"), ("w:space", "0"), ("w:color", "000000")],
        )?;
    }
    xml.end("w:tblBorders")?;
    xml.end("w:tblPr")?;

    xml.start("w:tblGrid", &[])?;
    for _ in 0..columns {
        xml.empty("w:gridCol", &[("w:w", cell_width.as_str())])?;
    }
    xml.end("w:tblGrid")?;

    let header = ParagraphStyle {
        style: None,
        align: Some("center"),
        bold: true,
    };
    let body = ParagraphStyle {
        bold: false,
        ..header
    };
    table_row(xml, &table.headers, columns, &cell_width, header, rtl)?;
    for row in &table.rows {
        table_row(xml, row, columns, &cell_width, body, rtl)?;
    }
    xml.end("w:tbl")?;
    // Word merges adjacent tables without a paragraph between them
    paragraph(xml, "", PLAIN, rtl)
}

fn table_row(
    xml: &mut Xml,
    cells: &[String],
    columns: usize,
    cell_width: &str,
    format: ParagraphStyle<'_>,
    rtl: bool,
) -> AppResult<()> {
    xml.start("w:tr", &[])?;
    if format.bold {
        xml.start("w:trPr", &[])?;
        xml.empty("w:tblHeader", &[])?;
        xml.end("w:trPr")?;
    }
    for idx in 0..columns {
        xml.start("w:tc", &[])?;
        xml.start("w:tcPr", &[])?;
        xml.empty("w:tcW", &[("w:w", cell_width), ("w:type", "dxa")])?;
        xml.end("w:tcPr")?;
        let text = cells.get(idx).map(String::as_str).unwrap_or("");
        paragraph(xml, text, format, rtl)?;
        xml.end("w:tc")?;
    }
    xml.end("w:tr")
}

fn document_xml(document: &ReportDocument, language: Language) -> AppResult<Vec<u8>> {
    let rtl = language.is_rtl();
    let mut xml = Xml::new()?;
    xml.start("w:document", &[("xmlns:w", WORD_NS)])?;
    xml.start("w:body", &[])?;

    let title = ParagraphStyle {
        style: Some("Title"),
        align: Some("center"),
        bold: false,
    };
    paragraph(&mut xml, &document.title, title, rtl)?;
    let heading = ParagraphStyle {
        style: Some("Heading1"),
        ..PLAIN
    };
    for block in &document.blocks {
        match block {
            Block::Heading(text) => paragraph(&mut xml, text, heading, rtl)?,
            Block::Paragraph(text) => paragraph(&mut xml, text, PLAIN, rtl)?,
            Block::Table(t) => table(&mut xml, t, rtl)?,
        }
    }

    xml.start("w:sectPr", &[])?;
    if rtl {
        xml.empty("w:bidi", &[])?;
    }
    let (width, height) = (PAGE_WIDTH.to_string(), PAGE_HEIGHT.to_string());
    xml.empty("w:pgSz", &[("w:w", width.as_str()), ("w:h", height.as_str())])?;
    let (vertical, horizontal) = (MARGIN_VERTICAL.to_string(), MARGIN_HORIZONTAL.to_string());
    xml.empty(
        "w:pgMar",
        &[
            ("w:top", vertical.as_str()),
            ("w:right", horizontal.as_str()),
            ("w:bottom", vertical.as_str()),
            ("w:left", horizontal.as_str()),
            ("w:header", "708"),
            ("w:footer", "708"),
            ("w:gutter", "0"),
        ],
    )?;
    xml.end("w:sectPr")?;

    xml.end("w:body")?;
    xml.end("w:document")?;
    Ok(xml.finish())
}

fn run_properties(xml: &mut Xml, size: &str, language: Language) -> AppResult<()> {
    xml.start("w:rPr", &[])?;
    xml.empty(
        "w:rFonts",
        &[
            ("w:ascii", FONT),
            ("w:hAnsi", FONT),
            ("w:eastAsia", FONT),
            ("w:cs", FONT),
        ],
    )?;
    xml.empty("w:sz", &[("w:val", size)])?;
    xml.empty("w:szCs", &[("w:val", size)])?;
    let lang = match language {
        Language::Ar => "ar-DZ",
        Language::En => "en-US",
    };
    xml.empty("w:lang", &[("w:val", "en-US"), ("w:bidi", lang)])?;
    xml.end("w:rPr")
}

fn styles_xml(language: Language) -> AppResult<Vec<u8>> {
    let mut xml = Xml::new()?;
    xml.start("w:styles", &[("xmlns:w", WORD_NS)])?;

    xml.start("w:docDefaults", &[])?;
    xml.start("w:rPrDefault", &[])?;
    run_properties(&mut xml, "24", language)?;
    xml.end("w:rPrDefault")?;
    xml.start("w:pPrDefault", &[])?;
    xml.start("w:pPr", &[])?;
    xml.empty("w:spacing", &[("w:after", "120"), ("w:line", "276"), ("w:lineRule", "auto")])?;
    xml.end("w:pPr")?;
    xml.end("w:pPrDefault")?;
    xml.end("w:docDefaults")?;

    xml.start("w:style", &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")])?;
    xml.empty("w:name", &[("w:val", "Normal")])?;
    xml.empty("w:qFormat", &[])?;
    xml.end("w:style")?;

    for (id, name, size, color, after) in [
        ("Title", "Title", "32", "000000", "240"),
        ("Heading1", "heading 1", "28", "00008B", "120"),
    ] {
        xml.start("w:style", &[("w:type", "paragraph"), ("w:styleId", id)])?;
        xml.empty("w:name", &[("w:val", name)])?;
        xml.empty("w:basedOn", &[("w:val", "Normal")])?;
        xml.empty("w:next", &[("w:val", "Normal")])?;
        xml.empty("w:qFormat", &[])?;
        xml.start("w:pPr", &[])?;
        xml.empty("w:keepNext", &[])?;
        xml.empty("w:spacing", &[("w:before", "240"), ("w:after", after)])?;
        xml.end("w:pPr")?;
        xml.start("w:rPr", &[])?;
        xml.empty("w:b", &[])?;
        xml.empty("w:bCs", &[])?;
        xml.empty("w:color", &[("w:val", color)])?;
        xml.empty("w:sz", &[("w:val", size)])?;
        xml.empty("w:szCs", &[("w:val", size)])?;
        xml.end("w:rPr")?;
        xml.end("w:style")?;
    }

    xml.end("w:styles")?;
    Ok(xml.finish())
}
