use crate::output::{check_output, write_output};
use crate::request::{handle_request, parse_param_args};
use crate::ReportFormat;
use statsheet_analyzer::{AnalysisKind, AnalysisOutcome};
use statsheet_core::config::Config;
use statsheet_core::{AppError, AppResult, Language};
use statsheet_report::{render_docx, render_text, AnalysisResponse};
use std::path::Path;

pub fn report_command(
    source: &str,
    test: &str,
    params: &[String],
    out: &Path,
    format: ReportFormat,
    overwrite: bool,
    config: &Config,
) -> AppResult<()> {
    let kind: AnalysisKind = test.parse()?;
    let params = parse_param_args(params)?;
    check_output(out, overwrite)?;

    let response = handle_request(source, kind, &params, config)?;
    let bytes = render(&response.result, format, config.report.language)?;
    write_output(out, &bytes)
}

pub fn render_command(
    analysis: &Path,
    out: &Path,
    format: ReportFormat,
    overwrite: bool,
    config: &Config,
) -> AppResult<()> {
    check_output(out, overwrite)?;
    let data = std::fs::read_to_string(analysis).map_err(|e| {
        AppError::usage(format!("failed to read {}: {e}", analysis.display()))
    })?;
    let response: AnalysisResponse = serde_json::from_str(&data).map_err(|e| {
        AppError::validation(format!(
            "{} is not an analysis response: {e}",
            analysis.display()
        ))
    })?;
    response.result.check_shape()?;
    tracing::info!(test = %response.test, source = %response.source, "rendering saved analysis");
    let bytes = render(&response.result, format, config.report.language)?;
    write_output(out, &bytes)
}

fn render(outcome: &AnalysisOutcome, format: ReportFormat, language: Language) -> AppResult<Vec<u8>> {
    match format {
        ReportFormat::Docx => render_docx(outcome, language),
        ReportFormat::Text => {
            let mut text = render_text(outcome, language);
            if !text.ends_with('\n') {
                text.push('\n');
            }
            Ok(text.into_bytes())
        }
    }
}
