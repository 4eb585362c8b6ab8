use serde::{Deserialize, Serialize};
use statsheet_core::{AppError, AppResult};

pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

pub fn is_significant(p_value: f64) -> bool {
    p_value < SIGNIFICANCE_LEVEL
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Descriptive,
    #[serde(rename = "ttest")]
    TTest,
    Anova,
    Correlation,
    Regression,
    ChiSquare,
    Cronbach,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 7] = [
        AnalysisKind::Descriptive,
        AnalysisKind::TTest,
        AnalysisKind::Anova,
        AnalysisKind::Correlation,
        AnalysisKind::Regression,
        AnalysisKind::ChiSquare,
        AnalysisKind::Cronbach,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::Descriptive => "descriptive",
            AnalysisKind::TTest => "ttest",
            AnalysisKind::Anova => "anova",
            AnalysisKind::Correlation => "correlation",
            AnalysisKind::Regression => "regression",
            AnalysisKind::ChiSquare => "chi_square",
            AnalysisKind::Cronbach => "cronbach",
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    /// Cohen's conventions for |d|.
    pub fn from_cohens_d(d: f64) -> Self {
        Self::bucket(d.abs(), [0.2, 0.5, 0.8])
    }

    pub fn from_eta_squared(eta: f64) -> Self {
        Self::bucket(eta, [0.01, 0.06, 0.14])
    }

    pub fn from_cramers_v(v: f64) -> Self {
        Self::bucket(v, [0.10, 0.30, 0.50])
    }

    fn bucket(value: f64, cuts: [f64; 3]) -> Self {
        if value < cuts[0] {
            EffectMagnitude::Negligible
        } else if value < cuts[1] {
            EffectMagnitude::Small
        } else if value < cuts[2] {
            EffectMagnitude::Medium
        } else {
            EffectMagnitude::Large
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    pub fn from_r(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude < 0.3 {
            CorrelationStrength::Weak
        } else if magnitude < 0.5 {
            CorrelationStrength::Moderate
        } else if magnitude < 0.7 {
            CorrelationStrength::Strong
        } else {
            CorrelationStrength::VeryStrong
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityBand {
    Unacceptable,
    Poor,
    Acceptable,
    Good,
    VeryGood,
    Excellent,
}

impl ReliabilityBand {
    pub fn from_alpha(alpha: f64) -> Self {
        if alpha < 0.50 {
            ReliabilityBand::Unacceptable
        } else if alpha < 0.60 {
            ReliabilityBand::Poor
        } else if alpha < 0.70 {
            ReliabilityBand::Acceptable
        } else if alpha < 0.80 {
            ReliabilityBand::Good
        } else if alpha < 0.90 {
            ReliabilityBand::VeryGood
        } else {
            ReliabilityBand::Excellent
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub label: String,
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableStats {
    pub name: String,
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFrequency {
    pub value: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub n: usize,
    pub distinct: usize,
    pub frequencies: Vec<CategoryFrequency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveResult {
    pub row_count: usize,
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<CategoricalSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    pub group_column: String,
    pub value_column: String,
    pub groups: Vec<GroupStats>,
    pub mean_difference: f64,
    /// `None` when both groups are constant with different means.
    pub t_statistic: Option<f64>,
    pub df: f64,
    pub p_value: f64,
    pub significant: bool,
    pub significance_level: f64,
    pub cohens_d: f64,
    pub effect_size: EffectMagnitude,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceComponent {
    pub sum_of_squares: f64,
    pub df: f64,
    pub mean_square: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostHocComparison {
    pub group1: String,
    pub group2: String,
    pub mean_difference: f64,
    pub std_error: f64,
    pub t_statistic: Option<f64>,
    pub p_value: f64,
    pub significant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnovaResult {
    pub dependent: String,
    pub factor: String,
    pub n: usize,
    pub groups: Vec<GroupStats>,
    pub grand_mean: f64,
    pub between: VarianceComponent,
    pub within: VarianceComponent,
    pub total: VarianceComponent,
    /// `None` when every group is constant but the group means differ.
    pub f_statistic: Option<f64>,
    pub p_value: f64,
    pub significant: bool,
    pub significance_level: f64,
    pub eta_squared: f64,
    pub effect_size: EffectMagnitude,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_hoc: Option<Vec<PostHocComparison>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationCell {
    pub r: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub var1: String,
    pub var2: String,
    pub r: f64,
    pub p_value: f64,
    pub strength: CorrelationStrength,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub method: CorrelationMethod,
    pub variables: Vec<String>,
    pub n: usize,
    pub descriptives: Vec<VariableStats>,
    pub matrix: Vec<Vec<CorrelationCell>>,
    pub significant_pairs: Vec<CorrelationPair>,
    pub significance_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_statistic: Option<f64>,
    pub p_value: Option<f64>,
    pub significant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub dependent: String,
    pub independents: Vec<String>,
    pub n: usize,
    pub r: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub std_error_estimate: f64,
    pub ss_regression: f64,
    pub ss_residual: f64,
    pub df_regression: f64,
    pub df_residual: f64,
    pub f_statistic: f64,
    pub p_value: f64,
    pub significant: bool,
    pub significance_level: f64,
    pub coefficients: Vec<Coefficient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    pub var1: String,
    pub var2: String,
    pub row_categories: Vec<String>,
    pub column_categories: Vec<String>,
    pub observed: Vec<Vec<u64>>,
    pub row_totals: Vec<u64>,
    pub column_totals: Vec<u64>,
    pub grand_total: u64,
    pub expected: Vec<Vec<f64>>,
    pub low_expected_cells: usize,
    pub chi_square: f64,
    pub df: f64,
    pub p_value: f64,
    pub significant: bool,
    pub significance_level: f64,
    pub yates_corrected: bool,
    pub cramers_v: f64,
    pub effect_size: EffectMagnitude,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
    pub item: String,
    pub mean: f64,
    pub std_dev: f64,
    pub item_total_correlation: Option<f64>,
    pub alpha_if_deleted: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CronbachResult {
    pub items: Vec<String>,
    pub n: usize,
    pub n_items: usize,
    pub alpha: f64,
    pub reliability: ReliabilityBand,
    pub item_stats: Vec<ItemStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "test", rename_all = "snake_case")]
pub enum ResultRecord {
    Descriptive(DescriptiveResult),
    #[serde(rename = "ttest")]
    TTest(TTestResult),
    Anova(AnovaResult),
    Correlation(CorrelationResult),
    Regression(RegressionResult),
    ChiSquare(ChiSquareResult),
    Cronbach(CronbachResult),
}

impl ResultRecord {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            ResultRecord::Descriptive(_) => AnalysisKind::Descriptive,
            ResultRecord::TTest(_) => AnalysisKind::TTest,
            ResultRecord::Anova(_) => AnalysisKind::Anova,
            ResultRecord::Correlation(_) => AnalysisKind::Correlation,
            ResultRecord::Regression(_) => AnalysisKind::Regression,
            ResultRecord::ChiSquare(_) => AnalysisKind::ChiSquare,
            ResultRecord::Cronbach(_) => AnalysisKind::Cronbach,
        }
    }

    /// Checks that the tables of a record agree with its category and
    /// variable lists. Records read back from disk are not guaranteed to.
    pub fn check_shape(&self) -> AppResult<()> {
        match self {
            ResultRecord::Correlation(result) => {
                let size = result.variables.len();
                expect_len("correlation matrix", result.matrix.len(), size)?;
                for row in &result.matrix {
                    expect_len("correlation matrix row", row.len(), size)?;
                }
                Ok(())
            }
            ResultRecord::ChiSquare(result) => {
                let rows = result.row_categories.len();
                let columns = result.column_categories.len();
                expect_len("observed", result.observed.len(), rows)?;
                expect_len("expected", result.expected.len(), rows)?;
                expect_len("row_totals", result.row_totals.len(), rows)?;
                expect_len("column_totals", result.column_totals.len(), columns)?;
                for row in result.observed.iter() {
                    expect_len("observed row", row.len(), columns)?;
                }
                for row in result.expected.iter() {
                    expect_len("expected row", row.len(), columns)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn expect_len(field: &str, found: usize, expected: usize) -> AppResult<()> {
    if found == expected {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "{field} has {found} entries, expected {expected}"
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisFailure {
    pub test: AnalysisKind,
    pub error: String,
}

/// Failure is tried first when reading back, since it carries only `test` and `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Failed(AnalysisFailure),
    Completed(ResultRecord),
}

impl AnalysisOutcome {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisOutcome::Failed(failure) => failure.test,
            AnalysisOutcome::Completed(record) => record.kind(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Completed(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AnalysisOutcome::Failed(failure) => Some(&failure.error),
            AnalysisOutcome::Completed(_) => None,
        }
    }

    pub fn check_shape(&self) -> AppResult<()> {
        match self {
            AnalysisOutcome::Failed(_) => Ok(()),
            AnalysisOutcome::Completed(record) => record.check_shape(),
        }
    }
}
