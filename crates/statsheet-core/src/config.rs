use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_SOURCE_BYTES: u64 = 50 * 1024 * 1024;
pub const DEFAULT_TOP_CATEGORIES: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub loader: LoaderConfig,
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
}

impl Config {
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let config = if let Some(path) = path {
            let data = std::fs::read_to_string(path).map_err(|e| {
                AppError::usage(format!("failed to read config {}: {e}", path.display()))
            })?;
            serde_yaml::from_str::<Config>(&data).map_err(|e| {
                AppError::usage(format!("failed to parse config {}: {e}", path.display()))
            })?
        } else {
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.loader.validate()?;
        self.analysis.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub timeout_secs: u64,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_bytes: DEFAULT_MAX_SOURCE_BYTES,
            user_agent: concat!("statsheet/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl LoaderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> AppResult<()> {
        if self.timeout_secs == 0 {
            return Err(AppError::usage("loader.timeout_secs must be > 0"));
        }
        if self.max_bytes == 0 {
            return Err(AppError::usage("loader.max_bytes must be > 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Leading categories kept in each categorical frequency table.
    pub top_categories: usize,
    /// Continuity correction for 2x2 chi-square tables.
    pub yates_correction: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_categories: DEFAULT_TOP_CATEGORIES,
            yates_correction: true,
        }
    }
}

impl AnalysisConfig {
    fn validate(&self) -> AppResult<()> {
        if self.top_categories == 0 {
            return Err(AppError::usage("analysis.top_categories must be > 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReportConfig {
    pub language: Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Ar,
    En,
}

impl Language {
    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.report.language, Language::Ar);
        assert!(config.analysis.yates_correction);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("report:\n  language: en\n").unwrap();
        assert_eq!(config.report.language, Language::En);
        assert_eq!(config.loader.timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
        assert_eq!(config.analysis.top_categories, DEFAULT_TOP_CATEGORIES);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = Config::default();
        config.loader.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Usage);
    }

    #[test]
    fn missing_config_file_is_usage_error() {
        let err = Config::load(Some(Path::new("/nonexistent/statsheet.yaml"))).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Usage);
    }
}
