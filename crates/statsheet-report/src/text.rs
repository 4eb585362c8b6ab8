use crate::labels::Labels;
use crate::layout::{layout, Block, ReportDocument, Table};
use serde::{Deserialize, Serialize};
use statsheet_analyzer::{AnalysisKind, AnalysisOutcome};
use statsheet_core::Language;

/// JSON payload returned for one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub test: AnalysisKind,
    pub source: String,
    pub source_sha256: String,
    pub result: AnalysisOutcome,
    pub report: String,
}

impl AnalysisResponse {
    pub fn new(
        source: impl Into<String>,
        source_sha256: impl Into<String>,
        result: AnalysisOutcome,
        language: Language,
    ) -> Self {
        let report = render_text(&result, language);
        Self {
            success: result.is_success(),
            test: result.kind(),
            source: source.into(),
            source_sha256: source_sha256.into(),
            result,
            report,
        }
    }
}

pub fn render_text(outcome: &AnalysisOutcome, language: Language) -> String {
    let labels = Labels::for_language(language);
    if let AnalysisOutcome::Failed(failure) = outcome {
        return format!(
            "{}: {}: {}",
            labels.title(failure.test),
            labels.error,
            failure.error
        );
    }
    render_document(&layout(outcome, labels))
}

fn render_document(document: &ReportDocument) -> String {
    let mut out = String::new();
    out.push_str(&document.title);
    out.push('\n');
    out.push_str(&"=".repeat(width(&document.title)));
    out.push('\n');
    for block in &document.blocks {
        out.push('\n');
        match block {
            Block::Heading(text) => {
                out.push_str(text);
                out.push('\n');
                out.push_str(&"-".repeat(width(text)));
                out.push('\n');
            }
            Block::Paragraph(text) => {
                out.push_str(text);
                out.push('\n');
            }
            Block::Table(table) => out.push_str(&ascii_table(table)),
        }
    }
    out
}

fn width(text: &str) -> usize {
    text.chars().count()
}

/// Box-drawn table with `+---+` borders; every line ends with a newline.
pub fn ascii_table(table: &Table) -> String {
    let columns = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(&table.headers).chain(&table.rows) {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(width(cell));
        }
    }

    let border = {
        let mut line = String::from("+");
        for w in &widths {
            line.push_str(&"-".repeat(w + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };
    let render_row = |row: &[String]| {
        let mut line = String::from("|");
        for (idx, w) in widths.iter().enumerate() {
            let cell = row.get(idx).map(String::as_str).unwrap_or("");
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(w - width(cell) + 1));
            line.push('|');
        }
        line.push('\n');
        line
    };

    let mut out = border.clone();
    out.push_str(&render_row(&table.headers));
    out.push_str(&border);
    for row in &table.rows {
        out.push_str(&render_row(row));
    }
    if !table.rows.is_empty() {
        out.push_str(&border);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use statsheet_analyzer::model::{EffectMagnitude, GroupStats, TTestResult};
    use statsheet_analyzer::{AnalysisFailure, ResultRecord};

    fn ttest_outcome() -> AnalysisOutcome {
        let group = |label: &str, mean: f64| GroupStats {
            label: label.to_string(),
            n: 4,
            mean,
            std_dev: 1.29,
        };
        AnalysisOutcome::Completed(ResultRecord::TTest(TTestResult {
            group_column: "group".to_string(),
            value_column: "satisfaction".to_string(),
            groups: vec![group("A", 3.5), group("B", 4.0)],
            mean_difference: -0.5,
            t_statistic: Some(-0.654653670707977),
            df: 6.0,
            p_value: 0.5369633243867582,
            significant: false,
            significance_level: 0.05,
            cohens_d: -0.4629100498862757,
            effect_size: EffectMagnitude::Small,
        }))
    }

    #[test]
    fn table_is_box_drawn() {
        let table = Table {
            headers: vec!["Group".to_string(), "N".to_string()],
            rows: vec![
                vec!["A".to_string(), "4".to_string()],
                vec!["long label".to_string(), "12".to_string()],
            ],
        };
        let expected = "\
+------------+----+
| Group      | N  |
+------------+----+
| A          | 4  |
| long label | 12 |
+------------+----+
";
        assert_eq!(ascii_table(&table), expected);
    }

    #[test]
    fn ttest_report_carries_statistics() {
        let report = render_text(&ttest_outcome(), Language::En);
        assert!(report.starts_with("Independent Samples T-Test\n"));
        assert!(report.contains("| A     | 4 | 3.50 | 1.29           |"));
        assert!(report.contains("t(6) = -0.655, p = 0.5370"));
        assert!(report.contains("Cohen's d = -0.463 (small)"));
        assert!(report.contains("not statistically significant"));
    }

    #[test]
    fn failure_report_is_one_line() {
        let outcome = AnalysisOutcome::Failed(AnalysisFailure {
            test: AnalysisKind::Regression,
            error: "dependent 'y' has zero variance".to_string(),
        });
        let report = render_text(&outcome, Language::En);
        assert_eq!(
            report,
            "Linear Regression: Error: dependent 'y' has zero variance"
        );
        assert_eq!(report.lines().count(), 1);
    }

    #[test]
    fn response_mirrors_outcome() {
        let response = AnalysisResponse::new("data.csv", "ab12", ttest_outcome(), Language::Ar);
        assert!(response.success);
        assert_eq!(response.test, AnalysisKind::TTest);
        assert!(response.report.starts_with("اختبار ت للعينات المستقلة"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["test"], "ttest");
        assert_eq!(json["result"]["test"], "ttest");
        assert_eq!(json["result"]["groups"][0]["n"], 4);
        let back: AnalysisResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn failed_response_round_trips() {
        let outcome = AnalysisOutcome::Failed(AnalysisFailure {
            test: AnalysisKind::ChiSquare,
            error: "no rows have values for both 'a' and 'b'".to_string(),
        });
        let response = AnalysisResponse::new("data.csv", "ab12", outcome, Language::En);
        assert!(!response.success);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["result"].as_object().unwrap().len(), 2);
        let back: AnalysisResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back.result.error(), Some("no rows have values for both 'a' and 'b'"));
    }
}
