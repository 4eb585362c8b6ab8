use regex::Regex;
use statsheet_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    Url(String),
    Path(PathBuf),
}

impl SourceLocator {
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::usage("source locator is empty"));
        }
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(SourceLocator::Url(rewrite_drive_url(trimmed)?));
        }
        if let Some(rest) = trimmed.strip_prefix("file://") {
            if rest.is_empty() {
                return Err(AppError::usage("file:// locator has no path"));
            }
            return Ok(SourceLocator::Path(PathBuf::from(rest)));
        }
        if lower.contains("://") {
            return Err(AppError::usage(format!(
                "unsupported source scheme: {trimmed}"
            )));
        }
        Ok(SourceLocator::Path(PathBuf::from(trimmed)))
    }

    /// Lowercased file extension of the locator, ignoring any query string.
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            SourceLocator::Url(url) => {
                let without_query = url.split(['?', '#']).next().unwrap_or(url);
                without_query.rsplit('/').next().unwrap_or("").to_string()
            }
            SourceLocator::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        Path::new(&name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }
}

impl std::fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLocator::Url(url) => write!(f, "{url}"),
            SourceLocator::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
struct DriveRule {
    name: &'static str,
    regex: Regex,
    template: &'static str,
}

impl DriveRule {
    fn new(name: &'static str, pattern: &str, template: &'static str) -> AppResult<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| AppError::internal(format!("invalid drive rule {name}: {e}")))?;
        Ok(Self {
            name,
            regex,
            template,
        })
    }

    fn apply(&self, url: &str) -> Option<String> {
        let caps = self.regex.captures(url)?;
        Some(self.template.replace("{id}", &caps[1]))
    }
}

fn drive_rules() -> AppResult<Vec<DriveRule>> {
    Ok(vec![
        DriveRule::new(
            "drive_file",
            r"^https?://drive\.google\.com/file/d/([A-Za-z0-9_-]+)",
            "https://drive.google.com/uc?export=download&id={id}",
        )?,
        DriveRule::new(
            "drive_query",
            r"^https?://drive\.google\.com/(?:open|uc)\?(?:.*&)?id=([A-Za-z0-9_-]+)",
            "https://drive.google.com/uc?export=download&id={id}",
        )?,
        DriveRule::new(
            "sheets",
            r"^https?://docs\.google\.com/spreadsheets/d/([A-Za-z0-9_-]+)",
            "https://docs.google.com/spreadsheets/d/{id}/export?format=xlsx",
        )?,
    ])
}

/// Turns Drive and Sheets share links into direct-download URLs.
pub fn rewrite_drive_url(url: &str) -> AppResult<String> {
    for rule in drive_rules()? {
        if let Some(rewritten) = rule.apply(url) {
            tracing::debug!(rule = rule.name, from = url, to = %rewritten, "rewrote share link");
            return Ok(rewritten);
        }
    }
    Ok(url.to_string())
}
