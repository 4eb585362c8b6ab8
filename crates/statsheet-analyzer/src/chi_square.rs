use crate::model::{is_significant, ChiSquareResult, EffectMagnitude, SIGNIFICANCE_LEVEL};
use crate::params::ChiSquareParams;
use crate::stats::chi_square_upper_p;
use statsheet_core::{AppError, AppResult};
use statsheet_data::Dataset;

const LOW_EXPECTED_COUNT: f64 = 5.0;

pub fn chi_square_independence(
    dataset: &Dataset,
    params: &ChiSquareParams,
    yates_correction: bool,
) -> AppResult<ChiSquareResult> {
    let first = dataset.labels(&params.var1)?;
    let second = dataset.labels(&params.var2)?;

    let mut row_categories: Vec<String> = Vec::new();
    let mut column_categories: Vec<String> = Vec::new();
    let mut pairs = Vec::new();
    for (a, b) in first.iter().zip(&second) {
        let (Some(a), Some(b)) = (a, b) else {
            continue;
        };
        pairs.push((index_of(&mut row_categories, a), index_of(&mut column_categories, b)));
    }
    if pairs.is_empty() {
        return Err(AppError::validation(format!(
            "no rows have values for both '{}' and '{}'",
            params.var1, params.var2
        )));
    }

    let rows = row_categories.len();
    let cols = column_categories.len();
    let mut observed = vec![vec![0u64; cols]; rows];
    for (i, j) in pairs {
        observed[i][j] += 1;
    }
    let row_totals: Vec<u64> = observed.iter().map(|row| row.iter().sum()).collect();
    let column_totals: Vec<u64> = (0..cols)
        .map(|j| observed.iter().map(|row| row[j]).sum())
        .collect();
    let grand_total: u64 = row_totals.iter().sum();
    let n = grand_total as f64;

    let expected: Vec<Vec<f64>> = row_totals
        .iter()
        .map(|rt| {
            column_totals
                .iter()
                .map(|ct| *rt as f64 * *ct as f64 / n)
                .collect()
        })
        .collect();
    let low_expected_cells = expected
        .iter()
        .flatten()
        .filter(|e| **e < LOW_EXPECTED_COUNT)
        .count();

    let df = ((rows - 1) * (cols - 1)) as f64;
    let yates_corrected = yates_correction && rows == 2 && cols == 2;
    let (chi_square, p_value) = if df == 0.0 {
        (0.0, 1.0)
    } else {
        let mut statistic = 0.0;
        for (obs_row, exp_row) in observed.iter().zip(&expected) {
            for (o, e) in obs_row.iter().zip(exp_row) {
                let mut diff = (*o as f64 - e).abs();
                if yates_corrected {
                    diff = (diff - 0.5).max(0.0);
                }
                statistic += diff * diff / e;
            }
        }
        (statistic, chi_square_upper_p(statistic, df)?)
    };

    let min_dim = (rows - 1).min(cols - 1);
    let cramers_v = if min_dim == 0 {
        0.0
    } else {
        (chi_square / (n * min_dim as f64)).sqrt().clamp(0.0, 1.0)
    };

    Ok(ChiSquareResult {
        var1: params.var1.clone(),
        var2: params.var2.clone(),
        row_categories,
        column_categories,
        observed,
        row_totals,
        column_totals,
        grand_total,
        expected,
        low_expected_cells,
        chi_square,
        df,
        p_value,
        significant: is_significant(p_value),
        significance_level: SIGNIFICANCE_LEVEL,
        yates_corrected,
        cramers_v,
        effect_size: EffectMagnitude::from_cramers_v(cramers_v),
    })
}

fn index_of(categories: &mut Vec<String>, value: &str) -> usize {
    match categories.iter().position(|c| c == value) {
        Some(idx) => idx,
        None => {
            categories.push(value.to_string());
            categories.len() - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statsheet_data::Column;

    fn dataset(pairs: &[(&str, &str)]) -> Dataset {
        Dataset::new(vec![
            Column::categorical("gender", pairs.iter().map(|(a, _)| Some(a.to_string())).collect()),
            Column::categorical("smoker", pairs.iter().map(|(_, b)| Some(b.to_string())).collect()),
        ])
        .unwrap()
    }

    fn params() -> ChiSquareParams {
        ChiSquareParams {
            var1: "gender".to_string(),
            var2: "smoker".to_string(),
        }
    }

    fn two_by_two() -> Dataset {
        dataset(&[
            ("M", "yes"),
            ("M", "yes"),
            ("M", "yes"),
            ("M", "no"),
            ("F", "yes"),
            ("F", "no"),
            ("F", "no"),
            ("F", "no"),
            ("F", "no"),
            ("F", "no"),
        ])
    }

    #[test]
    fn two_by_two_applies_yates_correction() {
        let result = chi_square_independence(&two_by_two(), &params(), true).unwrap();
        assert_eq!(result.row_categories, vec!["M", "F"]);
        assert_eq!(result.column_categories, vec!["yes", "no"]);
        assert_eq!(result.observed, vec![vec![3, 1], vec![1, 5]]);
        assert_eq!(result.row_totals, vec![4, 6]);
        assert_eq!(result.column_totals, vec![4, 6]);
        assert_eq!(result.grand_total, 10);
        assert!(result.yates_corrected);
        assert!((result.chi_square - 1.40625).abs() < 1e-12);
        assert!((result.p_value - 0.23567991342903793).abs() < 1e-7);
        assert!((result.cramers_v - 0.375).abs() < 1e-12);
        assert_eq!(result.low_expected_cells, 4);
        assert_eq!(result.effect_size, EffectMagnitude::Medium);
    }

    #[test]
    fn correction_can_be_disabled() {
        let result = chi_square_independence(&two_by_two(), &params(), false).unwrap();
        assert!(!result.yates_corrected);
        assert!((result.chi_square - 3.4027777777777772).abs() < 1e-12);
        assert!((result.p_value - 0.0650867264927669).abs() < 1e-7);
    }

    #[test]
    fn zero_cells_do_not_break_the_test() {
        let data = dataset(&[
            ("a", "x"),
            ("b", "y"),
            ("a", "z"),
            ("a", "x"),
            ("b", "y"),
            ("a", "z"),
            ("b", "x"),
            ("b", "y"),
            ("a", "z"),
            ("b", "y"),
        ]);
        let result = chi_square_independence(&data, &params(), true).unwrap();
        assert_eq!(result.observed, vec![vec![2, 0, 3], vec![1, 4, 0]]);
        assert_eq!(result.df, 2.0);
        assert!(!result.yates_corrected);
        assert!((result.chi_square - 7.333333333333333).abs() < 1e-9);
        assert!((result.p_value - 0.025561533206507413).abs() < 1e-7);
        assert!((0.0..=1.0).contains(&result.cramers_v));
        assert!(result.significant);
    }

    #[test]
    fn single_category_has_zero_df() {
        let data = dataset(&[("a", "x"), ("a", "y"), ("a", "x")]);
        let result = chi_square_independence(&data, &params(), true).unwrap();
        assert_eq!(result.df, 0.0);
        assert_eq!(result.chi_square, 0.0);
        assert_eq!(result.p_value, 1.0);
        assert_eq!(result.cramers_v, 0.0);
    }

    #[test]
    fn no_complete_rows_fails() {
        let data = Dataset::new(vec![
            Column::categorical("gender", vec![Some("M".to_string()), None]),
            Column::categorical("smoker", vec![None, Some("yes".to_string())]),
        ])
        .unwrap();
        assert!(chi_square_independence(&data, &params(), true).is_err());
    }
}
