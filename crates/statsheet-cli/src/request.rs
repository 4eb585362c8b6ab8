use statsheet_analyzer::{run_analysis, AnalysisKind, AnalysisParams};
use statsheet_core::config::Config;
use statsheet_core::{AppError, AppResult};
use statsheet_data::load_dataset;
use statsheet_report::AnalysisResponse;

/// Load, analyze and describe one source. Analyzer failures come back inside the response.
pub fn handle_request(
    source: &str,
    kind: AnalysisKind,
    params: &[(String, String)],
    config: &Config,
) -> AppResult<AnalysisResponse> {
    let params = AnalysisParams::from_pairs(kind, params)?;
    let loaded = load_dataset(source, &config.loader)?;
    let outcome = run_analysis(&loaded.dataset, &params, &config.analysis);
    Ok(AnalysisResponse::new(
        source,
        loaded.sha256,
        outcome,
        config.report.language,
    ))
}

/// Splits repeated `--param key=value` arguments at the first `=`.
pub fn parse_param_args(raw: &[String]) -> AppResult<Vec<(String, String)>> {
    raw.iter()
        .map(|arg| {
            let (key, value) = arg.split_once('=').ok_or_else(|| {
                AppError::usage(format!("invalid --param '{arg}'; expected key=value"))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(AppError::usage(format!("invalid --param '{arg}'; empty key")));
            }
            Ok((key.to_string(), value.trim().to_string()))
        })
        .collect()
}
