use crate::source::SourceLocator;
use statsheet_core::config::LoaderConfig;
use statsheet_core::{AppError, AppResult};
use std::io::Read;

#[derive(Debug, Clone)]
pub struct FetchedSource {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

pub fn fetch_source(locator: &SourceLocator, config: &LoaderConfig) -> AppResult<FetchedSource> {
    match locator {
        SourceLocator::Url(url) => fetch_url(url, config),
        SourceLocator::Path(path) => {
            let meta = std::fs::metadata(path)
                .map_err(|e| AppError::load(format!("failed to read {}: {e}", path.display())))?;
            if meta.len() > config.max_bytes {
                return Err(too_large(config.max_bytes));
            }
            let bytes = std::fs::read(path)
                .map_err(|e| AppError::load(format!("failed to read {}: {e}", path.display())))?;
            Ok(FetchedSource {
                bytes,
                content_type: None,
            })
        }
    }
}

fn fetch_url(url: &str, config: &LoaderConfig) -> AppResult<FetchedSource> {
    let response = ureq::get(url)
        .timeout(config.timeout())
        .set("User-Agent", &config.user_agent)
        .call()
        .map_err(|e| match e {
            ureq::Error::Status(code, _) => {
                AppError::load(format!("source returned HTTP {code}"))
            }
            ureq::Error::Transport(t) => AppError::load(format!("failed to fetch source: {t}")),
        })?;

    let content_type = response.header("Content-Type").map(str::to_string);
    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(config.max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| AppError::load(format!("failed to read response body: {e}")))?;
    if bytes.len() as u64 > config.max_bytes {
        return Err(too_large(config.max_bytes));
    }
    tracing::debug!(bytes = bytes.len(), content_type = ?content_type, "fetched source");
    Ok(FetchedSource {
        bytes,
        content_type,
    })
}

fn too_large(limit: u64) -> AppError {
    AppError::load(format!("source exceeds the {limit} byte limit"))
}
