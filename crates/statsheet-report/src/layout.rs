use crate::labels::Labels;
use statsheet_analyzer::model::{
    AnovaResult, ChiSquareResult, CorrelationResult, CronbachResult, DescriptiveResult,
    GroupStats, RegressionResult, TTestResult,
};
use statsheet_analyzer::{AnalysisOutcome, ResultRecord};

/// Renderer-neutral report: one title followed by headings, paragraphs and tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(String),
    Paragraph(String),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }
}

struct Builder {
    blocks: Vec<Block>,
}

impl Builder {
    fn heading(&mut self, text: &str) {
        self.blocks.push(Block::Heading(text.to_string()));
    }

    fn paragraph(&mut self, text: impl Into<String>) {
        self.blocks.push(Block::Paragraph(text.into()));
    }

    fn table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }
}

pub fn layout(outcome: &AnalysisOutcome, labels: &Labels) -> ReportDocument {
    let title = labels.title(outcome.kind()).to_string();
    let mut out = Builder { blocks: Vec::new() };
    match outcome {
        AnalysisOutcome::Failed(failure) => {
            out.paragraph(format!("{}: {}", labels.error, failure.error));
        }
        AnalysisOutcome::Completed(record) => match record {
            ResultRecord::Descriptive(result) => descriptive(&mut out, result, labels),
            ResultRecord::TTest(result) => ttest(&mut out, result, labels),
            ResultRecord::Anova(result) => anova(&mut out, result, labels),
            ResultRecord::Correlation(result) => correlation(&mut out, result, labels),
            ResultRecord::Regression(result) => regression(&mut out, result, labels),
            ResultRecord::ChiSquare(result) => chi_square(&mut out, result, labels),
            ResultRecord::Cronbach(result) => cronbach(&mut out, result, labels),
        },
    }
    ReportDocument {
        title,
        blocks: out.blocks,
    }
}

pub fn fixed(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

/// `-` for a statistic that is undefined.
pub fn fixed_or_dash(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |value| fixed(value, decimals))
}

pub fn p_text(p: f64) -> String {
    if p < 0.0001 {
        "< 0.0001".to_string()
    } else {
        fixed(p, 4)
    }
}

pub fn df_text(df: f64) -> String {
    if df.fract() == 0.0 {
        fixed(df, 0)
    } else {
        fixed(df, 2)
    }
}

pub fn stars(p: f64) -> &'static str {
    if p < 0.001 {
        "***"
    } else if p < 0.01 {
        "**"
    } else if p < 0.05 {
        "*"
    } else {
        ""
    }
}

fn marked(p: f64, significant: bool) -> String {
    if significant {
        format!("{}*", p_text(p))
    } else {
        p_text(p)
    }
}

fn descriptive(out: &mut Builder, result: &DescriptiveResult, labels: &Labels) {
    out.paragraph(format!("{}: {}", labels.rows, result.row_count));
    if !result.numeric.is_empty() {
        out.heading(labels.numeric_variables);
        let mut table = Table::new([
            labels.variable,
            labels.n,
            labels.mean,
            labels.median,
            labels.std_dev,
            labels.min,
            labels.max,
        ]);
        for summary in &result.numeric {
            table.row(vec![
                summary.column.clone(),
                summary.n.to_string(),
                fixed(summary.mean, 2),
                fixed(summary.median, 2),
                fixed(summary.std_dev, 2),
                fixed(summary.min, 2),
                fixed(summary.max, 2),
            ]);
        }
        out.table(table);
    }
    if !result.categorical.is_empty() {
        out.heading(labels.categorical_variables);
        for summary in &result.categorical {
            out.paragraph(format!(
                "{} ({} = {}, {} = {})",
                summary.column, labels.n, summary.n, labels.distinct, summary.distinct
            ));
            let mut table = Table::new([labels.category, labels.count, labels.percent]);
            for freq in &summary.frequencies {
                table.row(vec![
                    freq.value.clone(),
                    freq.count.to_string(),
                    format!("{}%", fixed(freq.percent, 1)),
                ]);
            }
            out.table(table);
        }
    }
}

fn group_table(groups: &[GroupStats], labels: &Labels) -> Table {
    let mut table = Table::new([labels.group, labels.n, labels.mean, labels.std_dev]);
    for group in groups {
        table.row(vec![
            group.label.clone(),
            group.n.to_string(),
            fixed(group.mean, 2),
            fixed(group.std_dev, 2),
        ]);
    }
    table
}

fn ttest(out: &mut Builder, result: &TTestResult, labels: &Labels) {
    out.paragraph(format!(
        "{} = {}, {} = {}",
        labels.group, result.group_column, labels.variable, result.value_column
    ));
    out.heading(labels.group_statistics);
    out.table(group_table(&result.groups, labels));

    out.heading(labels.test_results);
    let mut table = Table::new(["t", labels.df, labels.sig, labels.mean_difference, "Cohen's d"]);
    table.row(vec![
        fixed_or_dash(result.t_statistic, 3),
        df_text(result.df),
        p_text(result.p_value),
        fixed(result.mean_difference, 3),
        fixed(result.cohens_d, 3),
    ]);
    out.table(table);
    out.paragraph(format!(
        "t({}) = {}, p = {}. {} ({} = {}).",
        df_text(result.df),
        fixed_or_dash(result.t_statistic, 3),
        p_text(result.p_value),
        labels.verdict(result.significant),
        labels.significance_level,
        result.significance_level
    ));
    out.paragraph(format!(
        "{}: Cohen's d = {} ({})",
        labels.effect_size,
        fixed(result.cohens_d, 3),
        labels.effect(result.effect_size)
    ));
}

fn anova(out: &mut Builder, result: &AnovaResult, labels: &Labels) {
    out.paragraph(format!(
        "{} = {}, {} = {}, {} = {}",
        labels.variable, result.dependent, labels.group, result.factor, labels.sample_size, result.n
    ));
    out.heading(labels.group_statistics);
    out.table(group_table(&result.groups, labels));

    out.heading(labels.anova_table);
    let mut table = Table::new([
        labels.source,
        labels.sum_of_squares,
        labels.df,
        labels.mean_square,
        "F",
        labels.sig,
    ]);
    let dash = || "-".to_string();
    table.row(vec![
        labels.between_groups.to_string(),
        fixed(result.between.sum_of_squares, 3),
        df_text(result.between.df),
        result.between.mean_square.map_or_else(dash, |ms| fixed(ms, 3)),
        fixed_or_dash(result.f_statistic, 3),
        p_text(result.p_value),
    ]);
    table.row(vec![
        labels.within_groups.to_string(),
        fixed(result.within.sum_of_squares, 3),
        df_text(result.within.df),
        result.within.mean_square.map_or_else(dash, |ms| fixed(ms, 3)),
        dash(),
        dash(),
    ]);
    table.row(vec![
        labels.total.to_string(),
        fixed(result.total.sum_of_squares, 3),
        df_text(result.total.df),
        dash(),
        dash(),
        dash(),
    ]);
    out.table(table);
    out.paragraph(format!(
        "F({}, {}) = {}, p = {}. {}.",
        df_text(result.between.df),
        df_text(result.within.df),
        fixed_or_dash(result.f_statistic, 3),
        p_text(result.p_value),
        labels.verdict(result.significant)
    ));
    out.paragraph(format!(
        "{}: η² = {} ({})",
        labels.effect_size,
        fixed(result.eta_squared, 3),
        labels.effect(result.effect_size)
    ));

    if let Some(post_hoc) = &result.post_hoc {
        out.heading(labels.post_hoc);
        let mut table = Table::new([
            format!("{} (I)", labels.group),
            format!("{} (J)", labels.group),
            format!("{} (I-J)", labels.mean_difference),
            labels.std_error.to_string(),
            labels.sig.to_string(),
        ]);
        for comparison in post_hoc {
            table.row(vec![
                comparison.group1.clone(),
                comparison.group2.clone(),
                fixed(comparison.mean_difference, 3),
                fixed(comparison.std_error, 3),
                marked(comparison.p_value, comparison.significant),
            ]);
        }
        out.table(table);
    }
}

fn correlation(out: &mut Builder, result: &CorrelationResult, labels: &Labels) {
    out.paragraph(format!(
        "{}, {} = {}",
        labels.method(result.method),
        labels.n,
        result.n
    ));
    out.heading(labels.descriptives);
    let mut table = Table::new([labels.variable, labels.n, labels.mean, labels.std_dev]);
    for stats in &result.descriptives {
        table.row(vec![
            stats.name.clone(),
            stats.n.to_string(),
            fixed(stats.mean, 2),
            fixed(stats.std_dev, 2),
        ]);
    }
    out.table(table);

    out.heading(labels.correlation_matrix);
    let mut headers = vec![labels.variable.to_string()];
    headers.extend(result.variables.iter().cloned());
    let mut table = Table::new(headers);
    for (i, name) in result.variables.iter().enumerate() {
        let mut cells = vec![name.clone()];
        let row = result.matrix.get(i).map(Vec::as_slice).unwrap_or_default();
        for (j, cell) in row.iter().enumerate() {
            if i == j {
                cells.push("1".to_string());
            } else {
                cells.push(format!("{}{}", fixed(cell.r, 3), stars(cell.p_value)));
            }
        }
        table.row(cells);
    }
    out.table(table);
    out.paragraph(labels.stars_note);

    out.heading(labels.significant_pairs);
    if result.significant_pairs.is_empty() {
        out.paragraph(labels.no_significant_pairs);
        return;
    }
    let mut table = Table::new([
        labels.variable,
        labels.variable,
        "r",
        labels.sig,
        labels.strength,
        labels.direction,
    ]);
    for pair in &result.significant_pairs {
        table.row(vec![
            pair.var1.clone(),
            pair.var2.clone(),
            fixed(pair.r, 3),
            p_text(pair.p_value),
            labels.strength_of(pair.strength).to_string(),
            labels.direction_of(pair.direction).to_string(),
        ]);
    }
    out.table(table);
}

/// `y = b0 + b1 × x1 - b2 × x2`, coefficients in model order.
pub fn regression_equation(result: &RegressionResult) -> String {
    let mut equation = format!("{} = ", result.dependent);
    for (idx, coefficient) in result.coefficients.iter().enumerate() {
        let magnitude = fixed(coefficient.estimate.abs(), 3);
        let term = if idx == 0 {
            magnitude
        } else {
            format!("{magnitude} × {}", coefficient.name)
        };
        match (idx, coefficient.estimate < 0.0) {
            (0, true) => equation.push_str(&format!("-{term}")),
            (0, false) => equation.push_str(&term),
            (_, true) => equation.push_str(&format!(" - {term}")),
            (_, false) => equation.push_str(&format!(" + {term}")),
        }
    }
    equation
}

fn regression(out: &mut Builder, result: &RegressionResult, labels: &Labels) {
    out.paragraph(format!(
        "{} = {}, {} = {}",
        labels.variable,
        result.dependent,
        labels.sample_size,
        result.n
    ));
    out.heading(labels.model_summary);
    let mut table = Table::new([
        "R",
        labels.r_squared,
        labels.adj_r_squared,
        labels.std_error_estimate,
    ]);
    table.row(vec![
        fixed(result.r, 3),
        fixed(result.r_squared, 3),
        fixed(result.adj_r_squared, 3),
        fixed(result.std_error_estimate, 3),
    ]);
    out.table(table);

    out.heading(labels.anova_table);
    let mut table = Table::new([labels.source, labels.sum_of_squares, labels.df, "F", labels.sig]);
    table.row(vec![
        labels.regression.to_string(),
        fixed(result.ss_regression, 3),
        df_text(result.df_regression),
        fixed(result.f_statistic, 3),
        p_text(result.p_value),
    ]);
    table.row(vec![
        labels.residual.to_string(),
        fixed(result.ss_residual, 3),
        df_text(result.df_residual),
        "-".to_string(),
        "-".to_string(),
    ]);
    out.table(table);
    out.paragraph(format!(
        "F({}, {}) = {}, p = {}. {}.",
        df_text(result.df_regression),
        df_text(result.df_residual),
        fixed(result.f_statistic, 3),
        p_text(result.p_value),
        labels.verdict(result.significant)
    ));

    out.heading(labels.coefficients);
    let mut table = Table::new([labels.variable, labels.estimate, labels.std_error, "t", labels.sig]);
    for coefficient in &result.coefficients {
        table.row(vec![
            coefficient.name.clone(),
            fixed(coefficient.estimate, 3),
            fixed(coefficient.std_error, 3),
            fixed_or_dash(coefficient.t_statistic, 3),
            coefficient
                .p_value
                .map_or_else(|| "-".to_string(), |p| marked(p, coefficient.significant)),
        ]);
    }
    out.table(table);
    out.paragraph(format!("{}: {}", labels.equation, regression_equation(result)));
}

fn chi_square(out: &mut Builder, result: &ChiSquareResult, labels: &Labels) {
    out.heading(labels.contingency_table);
    let mut headers = vec![format!("{} / {}", result.var1, result.var2)];
    headers.extend(result.column_categories.iter().cloned());
    headers.push(labels.total.to_string());
    let mut observed = Table::new(headers.clone());
    for (i, category) in result.row_categories.iter().enumerate() {
        let mut cells = vec![category.clone()];
        if let Some(row) = result.observed.get(i) {
            cells.extend(row.iter().map(u64::to_string));
        }
        cells.push(
            result
                .row_totals
                .get(i)
                .map_or_else(|| "-".to_string(), u64::to_string),
        );
        observed.row(cells);
    }
    let mut totals = vec![labels.total.to_string()];
    totals.extend(result.column_totals.iter().map(u64::to_string));
    totals.push(result.grand_total.to_string());
    observed.row(totals);
    out.table(observed);

    out.heading(labels.expected_counts);
    headers.pop();
    let mut expected = Table::new(headers);
    for (i, category) in result.row_categories.iter().enumerate() {
        let mut cells = vec![category.clone()];
        if let Some(row) = result.expected.get(i) {
            cells.extend(row.iter().map(|e| fixed(*e, 2)));
        }
        expected.row(cells);
    }
    out.table(expected);

    out.heading(labels.test_results);
    let mut table = Table::new(["χ²", labels.df, labels.sig, "Cramér's V"]);
    table.row(vec![
        fixed(result.chi_square, 3),
        df_text(result.df),
        p_text(result.p_value),
        fixed(result.cramers_v, 3),
    ]);
    out.table(table);
    out.paragraph(format!(
        "χ²({}, N = {}) = {}, p = {}. {}.",
        df_text(result.df),
        result.grand_total,
        fixed(result.chi_square, 3),
        p_text(result.p_value),
        labels.verdict(result.significant)
    ));
    out.paragraph(format!(
        "{}: Cramér's V = {} ({})",
        labels.effect_size,
        fixed(result.cramers_v, 3),
        labels.effect(result.effect_size)
    ));
    if result.yates_corrected {
        out.paragraph(labels.yates_note);
    }
    if result.low_expected_cells > 0 {
        out.paragraph(format!(
            "{}: {}",
            labels.low_expected_note, result.low_expected_cells
        ));
    }
}

fn cronbach(out: &mut Builder, result: &CronbachResult, labels: &Labels) {
    out.heading(labels.reliability_statistics);
    let mut table = Table::new(["Cronbach's Alpha", labels.n_items, labels.n]);
    table.row(vec![
        fixed(result.alpha, 3),
        result.n_items.to_string(),
        result.n.to_string(),
    ]);
    out.table(table);
    out.paragraph(format!(
        "{}: {} (α = {})",
        labels.reliability,
        labels.band(result.reliability),
        fixed(result.alpha, 3)
    ));

    out.heading(labels.item_statistics);
    let mut table = Table::new([
        labels.item,
        labels.mean,
        labels.std_dev,
        labels.item_total_correlation,
        labels.alpha_if_deleted,
    ]);
    for item in &result.item_stats {
        table.row(vec![
            item.item.clone(),
            fixed(item.mean, 2),
            fixed(item.std_dev, 2),
            item.item_total_correlation
                .map_or_else(|| "-".to_string(), |r| fixed(r, 3)),
            item.alpha_if_deleted
                .map_or_else(|| "-".to_string(), |a| fixed(a, 3)),
        ]);
    }
    out.table(table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::ENGLISH;
    use statsheet_analyzer::model::{
        Coefficient, CorrelationCell, CorrelationMethod, EffectMagnitude,
    };
    use statsheet_analyzer::{AnalysisFailure, AnalysisKind};

    fn coefficient(name: &str, estimate: f64) -> Coefficient {
        Coefficient {
            name: name.to_string(),
            estimate,
            std_error: 0.5,
            t_statistic: Some(estimate / 0.5),
            p_value: Some(0.2),
            significant: false,
        }
    }

    fn regression_result(coefficients: Vec<Coefficient>) -> RegressionResult {
        RegressionResult {
            dependent: "score".to_string(),
            independents: vec!["hours".to_string(), "stress".to_string()],
            n: 10,
            r: 0.8,
            r_squared: 0.64,
            adj_r_squared: 0.54,
            std_error_estimate: 1.2,
            ss_regression: 20.0,
            ss_residual: 11.25,
            df_regression: 2.0,
            df_residual: 7.0,
            f_statistic: 6.22,
            p_value: 0.028,
            significant: true,
            significance_level: 0.05,
            coefficients,
        }
    }

    #[test]
    fn significance_stars_follow_thresholds() {
        assert_eq!(stars(0.0004), "***");
        assert_eq!(stars(0.004), "**");
        assert_eq!(stars(0.04), "*");
        assert_eq!(stars(0.05), "");
    }

    #[test]
    fn fully_separated_ttest_shows_undefined_t() {
        let result = TTestResult {
            group_column: "group".to_string(),
            value_column: "score".to_string(),
            groups: Vec::new(),
            mean_difference: -1.0,
            t_statistic: None,
            df: 4.0,
            p_value: 0.0,
            significant: true,
            significance_level: 0.05,
            cohens_d: 0.0,
            effect_size: EffectMagnitude::Negligible,
        };
        let outcome = AnalysisOutcome::Completed(ResultRecord::TTest(result));
        let document = layout(&outcome, &ENGLISH);
        assert!(document.blocks.contains(&Block::Paragraph(
            "t(4) = -, p = < 0.0001. The result is statistically significant (Significance level = 0.05)."
                .to_string()
        )));
        let test_table = document
            .blocks
            .iter()
            .find_map(|block| match block {
                Block::Table(table) if table.headers[0] == "t" => Some(table),
                _ => None,
            })
            .unwrap();
        assert_eq!(test_table.rows[0][0], "-");
    }

    #[test]
    fn small_p_values_are_bounded() {
        assert_eq!(p_text(0.00001), "< 0.0001");
        assert_eq!(p_text(0.5369633), "0.5370");
        assert_eq!(df_text(6.0), "6");
        assert_eq!(df_text(5.5), "5.50");
    }

    #[test]
    fn equation_signs_each_term() {
        let result = regression_result(vec![
            coefficient("(Constant)", -1.5),
            coefficient("hours", 2.0),
            coefficient("stress", -0.25),
        ]);
        assert_eq!(
            regression_equation(&result),
            "score = -1.500 + 2.000 × hours - 0.250 × stress"
        );
    }

    #[test]
    fn failure_lays_out_title_and_error_only() {
        let outcome = AnalysisOutcome::Failed(AnalysisFailure {
            test: AnalysisKind::Anova,
            error: "column 'x' not found".to_string(),
        });
        let document = layout(&outcome, &ENGLISH);
        assert_eq!(document.title, "One-Way ANOVA");
        assert_eq!(
            document.blocks,
            vec![Block::Paragraph("Error: column 'x' not found".to_string())]
        );
    }

    #[test]
    fn correlation_matrix_marks_significance() {
        let cell = |r: f64, p_value: f64| CorrelationCell { r, p_value };
        let result = CorrelationResult {
            method: CorrelationMethod::Pearson,
            variables: vec!["a".to_string(), "b".to_string()],
            n: 12,
            descriptives: Vec::new(),
            matrix: vec![
                vec![cell(1.0, 0.0), cell(0.81, 0.002)],
                vec![cell(0.81, 0.002), cell(1.0, 0.0)],
            ],
            significant_pairs: Vec::new(),
            significance_level: 0.05,
        };
        let outcome = AnalysisOutcome::Completed(ResultRecord::Correlation(result));
        let document = layout(&outcome, &ENGLISH);
        let matrix = document
            .blocks
            .iter()
            .find_map(|block| match block {
                Block::Table(table) if table.headers.len() == 3 => Some(table),
                _ => None,
            })
            .unwrap();
        assert_eq!(matrix.rows[0], vec!["a", "1", "0.810**"]);
        assert_eq!(matrix.rows[1], vec!["b", "0.810**", "1"]);
    }

    #[test]
    fn short_contingency_rows_render_placeholders() {
        let result = ChiSquareResult {
            var1: "a".to_string(),
            var2: "b".to_string(),
            row_categories: vec!["x".to_string(), "y".to_string()],
            column_categories: vec!["u".to_string()],
            observed: vec![vec![1]],
            row_totals: vec![1],
            column_totals: vec![1],
            grand_total: 1,
            expected: vec![vec![1.0]],
            low_expected_cells: 1,
            chi_square: 0.0,
            df: 0.0,
            p_value: 1.0,
            significant: false,
            significance_level: 0.05,
            yates_corrected: false,
            cramers_v: 0.0,
            effect_size: EffectMagnitude::Negligible,
        };
        let outcome = AnalysisOutcome::Completed(ResultRecord::ChiSquare(result));
        let document = layout(&outcome, &ENGLISH);
        let tables: Vec<&Table> = document
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Table(table) => Some(table),
                _ => None,
            })
            .collect();
        assert_eq!(tables[0].rows[1], vec!["y", "-"]);
        assert_eq!(tables[1].rows[1], vec!["y"]);
    }
}
