use crate::model::{AnalysisKind, CorrelationMethod};
use serde::{Deserialize, Serialize};
use statsheet_core::{AppError, AppResult};
use std::collections::BTreeMap;
use std::str::FromStr;

impl FromStr for AnalysisKind {
    type Err = AppError;

    fn from_str(raw: &str) -> AppResult<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "descriptive" => Ok(AnalysisKind::Descriptive),
            "ttest" => Ok(AnalysisKind::TTest),
            "anova" => Ok(AnalysisKind::Anova),
            "correlation" => Ok(AnalysisKind::Correlation),
            "regression" => Ok(AnalysisKind::Regression),
            "chi_square" | "chisquare" => Ok(AnalysisKind::ChiSquare),
            "cronbach" | "cronbach_alpha" => Ok(AnalysisKind::Cronbach),
            _ => Err(AppError::usage(format!(
                "unknown analysis kind '{raw}'; expected one of: {}",
                AnalysisKind::ALL
                    .iter()
                    .map(|kind| kind.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

impl AnalysisKind {
    pub fn required_params(self) -> &'static [&'static str] {
        match self {
            AnalysisKind::Descriptive => &[],
            AnalysisKind::TTest => &["group", "value"],
            AnalysisKind::Anova => &["dependent", "factor"],
            AnalysisKind::Correlation => &["variables"],
            AnalysisKind::Regression => &["dependent", "independents"],
            AnalysisKind::ChiSquare => &["var1", "var2"],
            AnalysisKind::Cronbach => &["items"],
        }
    }

    pub fn optional_params(self) -> &'static [&'static str] {
        match self {
            AnalysisKind::Descriptive => &["columns"],
            AnalysisKind::Correlation => &["method"],
            _ => &[],
        }
    }
}

impl FromStr for CorrelationMethod {
    type Err = AppError;

    fn from_str(raw: &str) -> AppResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pearson" => Ok(CorrelationMethod::Pearson),
            "spearman" => Ok(CorrelationMethod::Spearman),
            other => Err(AppError::usage(format!(
                "unknown correlation method '{other}'; expected pearson or spearman"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptiveParams {
    pub columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TTestParams {
    pub group: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnovaParams {
    pub dependent: String,
    pub factor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationParams {
    pub variables: Vec<String>,
    pub method: CorrelationMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionParams {
    pub dependent: String,
    pub independents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChiSquareParams {
    pub var1: String,
    pub var2: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronbachParams {
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "test", rename_all = "snake_case")]
pub enum AnalysisParams {
    Descriptive(DescriptiveParams),
    #[serde(rename = "ttest")]
    TTest(TTestParams),
    Anova(AnovaParams),
    Correlation(CorrelationParams),
    Regression(RegressionParams),
    ChiSquare(ChiSquareParams),
    Cronbach(CronbachParams),
}

impl AnalysisParams {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisParams::Descriptive(_) => AnalysisKind::Descriptive,
            AnalysisParams::TTest(_) => AnalysisKind::TTest,
            AnalysisParams::Anova(_) => AnalysisKind::Anova,
            AnalysisParams::Correlation(_) => AnalysisKind::Correlation,
            AnalysisParams::Regression(_) => AnalysisKind::Regression,
            AnalysisParams::ChiSquare(_) => AnalysisKind::ChiSquare,
            AnalysisParams::Cronbach(_) => AnalysisKind::Cronbach,
        }
    }

    /// Builds the typed parameter set from `key=value` pairs. Lists are comma-separated.
    pub fn from_pairs<S: AsRef<str>>(kind: AnalysisKind, pairs: &[(S, S)]) -> AppResult<Self> {
        let mut map = ParamMap::new(kind, pairs)?;
        let params = match kind {
            AnalysisKind::Descriptive => AnalysisParams::Descriptive(DescriptiveParams {
                columns: map.optional_list("columns")?,
            }),
            AnalysisKind::TTest => AnalysisParams::TTest(TTestParams {
                group: map.required("group")?,
                value: map.required("value")?,
            }),
            AnalysisKind::Anova => AnalysisParams::Anova(AnovaParams {
                dependent: map.required("dependent")?,
                factor: map.required("factor")?,
            }),
            AnalysisKind::Correlation => AnalysisParams::Correlation(CorrelationParams {
                variables: map.required_list("variables")?,
                method: match map.optional("method") {
                    Some(raw) => raw.parse()?,
                    None => CorrelationMethod::Pearson,
                },
            }),
            AnalysisKind::Regression => AnalysisParams::Regression(RegressionParams {
                dependent: map.required("dependent")?,
                independents: map.required_list("independents")?,
            }),
            AnalysisKind::ChiSquare => AnalysisParams::ChiSquare(ChiSquareParams {
                var1: map.required("var1")?,
                var2: map.required("var2")?,
            }),
            AnalysisKind::Cronbach => AnalysisParams::Cronbach(CronbachParams {
                items: map.required_list("items")?,
            }),
        };
        Ok(params)
    }
}

struct ParamMap {
    kind: AnalysisKind,
    values: BTreeMap<String, String>,
}

impl ParamMap {
    fn new<S: AsRef<str>>(kind: AnalysisKind, pairs: &[(S, S)]) -> AppResult<Self> {
        let mut values = BTreeMap::new();
        for (key, value) in pairs {
            let key = key.as_ref().trim().to_string();
            let allowed = kind.required_params().contains(&key.as_str())
                || kind.optional_params().contains(&key.as_str());
            if !allowed {
                return Err(AppError::usage(format!(
                    "unknown parameter '{key}' for {kind}"
                )));
            }
            if values
                .insert(key.clone(), value.as_ref().trim().to_string())
                .is_some()
            {
                return Err(AppError::usage(format!(
                    "parameter '{key}' given more than once"
                )));
            }
        }
        Ok(Self { kind, values })
    }

    fn optional(&mut self, key: &str) -> Option<String> {
        self.values.remove(key).filter(|value| !value.is_empty())
    }

    fn required(&mut self, key: &str) -> AppResult<String> {
        self.optional(key).ok_or_else(|| {
            AppError::usage(format!(
                "{} requires parameter '{key}'",
                self.kind
            ))
        })
    }

    fn optional_list(&mut self, key: &str) -> AppResult<Option<Vec<String>>> {
        match self.optional(key) {
            None => Ok(None),
            Some(raw) => split_list(key, &raw).map(Some),
        }
    }

    fn required_list(&mut self, key: &str) -> AppResult<Vec<String>> {
        let raw = self.required(key)?;
        split_list(key, &raw)
    }
}

fn split_list(key: &str, raw: &str) -> AppResult<Vec<String>> {
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        return Err(AppError::usage(format!("parameter '{key}' is an empty list")));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use statsheet_core::ErrorKind;

    #[test]
    fn kind_parsing_accepts_aliases() {
        assert_eq!("TTest".parse::<AnalysisKind>().unwrap(), AnalysisKind::TTest);
        assert_eq!("chisquare".parse::<AnalysisKind>().unwrap(), AnalysisKind::ChiSquare);
        assert_eq!("chi-square".parse::<AnalysisKind>().unwrap(), AnalysisKind::ChiSquare);
        assert_eq!(
            "Cronbach_Alpha".parse::<AnalysisKind>().unwrap(),
            AnalysisKind::Cronbach
        );
        let err = "manova".parse::<AnalysisKind>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.message().contains("chi_square"));
    }

    #[test]
    fn builds_typed_params() {
        let params = AnalysisParams::from_pairs(
            AnalysisKind::Regression,
            &[("dependent", "y"), ("independents", "x1, x2,")],
        )
        .unwrap();
        assert_eq!(
            params,
            AnalysisParams::Regression(RegressionParams {
                dependent: "y".to_string(),
                independents: vec!["x1".to_string(), "x2".to_string()],
            })
        );

        let params = AnalysisParams::from_pairs(
            AnalysisKind::Correlation,
            &[("variables", "a,b"), ("method", "Spearman")],
        )
        .unwrap();
        match params {
            AnalysisParams::Correlation(p) => assert_eq!(p.method, CorrelationMethod::Spearman),
            other => panic!("unexpected params {other:?}"),
        }

        let empty: [(&str, &str); 0] = [];
        let params = AnalysisParams::from_pairs(AnalysisKind::Descriptive, &empty).unwrap();
        assert_eq!(params, AnalysisParams::Descriptive(DescriptiveParams { columns: None }));
    }

    #[test]
    fn rejects_unknown_missing_and_repeated_keys() {
        let err = AnalysisParams::from_pairs(
            AnalysisKind::TTest,
            &[("group", "g"), ("value", "v"), ("variables", "x")],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);

        let err = AnalysisParams::from_pairs(AnalysisKind::TTest, &[("group", "g")]).unwrap_err();
        assert!(err.message().contains("'value'"));

        let err = AnalysisParams::from_pairs(
            AnalysisKind::ChiSquare,
            &[("var1", "a"), ("var1", "b"), ("var2", "c")],
        )
        .unwrap_err();
        assert!(err.message().contains("more than once"));

        let err = AnalysisParams::from_pairs(AnalysisKind::Cronbach, &[("items", " , ")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}
