use crate::output::{check_output, write_output};
use crate::request::{handle_request, parse_param_args};
use statsheet_analyzer::AnalysisKind;
use statsheet_core::config::Config;
use statsheet_core::json::to_pretty_json;
use statsheet_core::AppResult;
use std::path::PathBuf;

pub fn analyze_command(
    source: &str,
    test: &str,
    params: &[String],
    out: Option<PathBuf>,
    overwrite: bool,
    config: &Config,
) -> AppResult<()> {
    let kind: AnalysisKind = test.parse()?;
    let params = parse_param_args(params)?;
    if let Some(path) = &out {
        check_output(path, overwrite)?;
    }

    let response = handle_request(source, kind, &params, config)?;
    if !response.success {
        tracing::warn!(test = %kind, "analysis returned a failure record");
    }
    let mut json = to_pretty_json(&response)?;
    json.push('\n');
    match out {
        Some(path) => write_output(&path, json.as_bytes()),
        None => {
            print!("{json}");
            Ok(())
        }
    }
}

pub fn list_tests() -> String {
    let mut out = String::new();
    for kind in AnalysisKind::ALL {
        let required = kind.required_params();
        let optional = kind.optional_params();
        out.push_str(kind.as_str());
        out.push('\n');
        out.push_str(&format!(
            "  required: {}\n",
            if required.is_empty() { "-".to_string() } else { required.join(", ") }
        ));
        out.push_str(&format!(
            "  optional: {}\n",
            if optional.is_empty() { "-".to_string() } else { optional.join(", ") }
        ));
    }
    out
}
