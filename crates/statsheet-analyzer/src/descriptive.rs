use crate::model::{
    CategoricalSummary, CategoryFrequency, DescriptiveResult, NumericSummary,
};
use crate::params::DescriptiveParams;
use crate::stats::{mean, median, sample_std_dev};
use statsheet_core::json::round_to;
use statsheet_core::AppResult;
use statsheet_data::{Column, ColumnData, Dataset};

pub fn describe(
    dataset: &Dataset,
    params: &DescriptiveParams,
    top_categories: usize,
) -> AppResult<DescriptiveResult> {
    let columns: Vec<&Column> = match &params.columns {
        Some(names) => names
            .iter()
            .map(|name| dataset.column(name))
            .collect::<AppResult<_>>()?,
        None => dataset.columns().iter().collect(),
    };

    let mut numeric = Vec::new();
    let mut categorical = Vec::new();
    for column in columns {
        match column.data() {
            ColumnData::Numeric(values) => {
                let present: Vec<f64> = values.iter().flatten().copied().collect();
                if let Some(summary) = summarize_numeric(column.name(), &present) {
                    numeric.push(summary);
                }
            }
            ColumnData::Categorical(values) => {
                let present: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
                if let Some(summary) = summarize_categorical(column.name(), &present, top_categories) {
                    categorical.push(summary);
                }
            }
        }
    }

    Ok(DescriptiveResult {
        row_count: dataset.row_count(),
        numeric,
        categorical,
    })
}

fn summarize_numeric(name: &str, values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(NumericSummary {
        column: name.to_string(),
        n: values.len(),
        mean: round_to(mean(values), 2),
        median: round_to(median(values), 2),
        std_dev: round_to(sample_std_dev(values), 2),
        min: round_to(min, 2),
        max: round_to(max, 2),
    })
}

fn summarize_categorical(name: &str, values: &[&str], top: usize) -> Option<CategoricalSummary> {
    if values.is_empty() {
        return None;
    }
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((*value, 1)),
        }
    }
    let distinct = counts.len();
    // stable sort keeps first-seen order among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    let total = values.len() as f64;
    let frequencies = counts
        .into_iter()
        .take(top)
        .map(|(value, count)| CategoryFrequency {
            value: value.to_string(),
            count,
            percent: round_to(count as f64 * 100.0 / total, 1),
        })
        .collect();
    Some(CategoricalSummary {
        column: name.to_string(),
        n: values.len(),
        distinct,
        frequencies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use statsheet_core::ErrorKind;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Column::numeric("age", vec![Some(20.0), Some(31.0), None, Some(25.0)]),
            Column::categorical(
                "city",
                vec![
                    Some("Oran".to_string()),
                    Some("Alger".to_string()),
                    Some("Alger".to_string()),
                    Some("Oran".to_string()),
                ],
            ),
            Column::numeric("empty", vec![None, None, None, None]),
            Column::categorical(
                "grade",
                vec![
                    Some("b".to_string()),
                    Some("a".to_string()),
                    Some("c".to_string()),
                    None,
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn summarizes_all_columns_by_default() {
        let result = describe(&dataset(), &DescriptiveParams { columns: None }, 10).unwrap();
        assert_eq!(result.row_count, 4);
        assert_eq!(result.numeric.len(), 1);
        let age = &result.numeric[0];
        assert_eq!(age.n, 3);
        assert_eq!(age.mean, 25.33);
        assert_eq!(age.median, 25.0);
        assert_eq!(age.std_dev, 5.51);
        assert_eq!((age.min, age.max), (20.0, 31.0));

        let city = &result.categorical[0];
        assert_eq!(city.distinct, 2);
        assert_eq!(city.frequencies[0].value, "Oran");
        assert_eq!(city.frequencies[0].percent, 50.0);
    }

    #[test]
    fn n_never_exceeds_row_count() {
        let data = dataset();
        let result = describe(&data, &DescriptiveParams { columns: None }, 10).unwrap();
        for summary in &result.numeric {
            let missing = data.numeric(&summary.column).unwrap().iter().filter(|v| v.is_none()).count();
            assert_eq!(summary.n, data.row_count() - missing);
        }
        for summary in &result.categorical {
            assert!(summary.n <= data.row_count());
        }
    }

    #[test]
    fn truncates_categories_with_ties_in_first_seen_order() {
        let result = describe(
            &dataset(),
            &DescriptiveParams {
                columns: Some(vec!["grade".to_string()]),
            },
            2,
        )
        .unwrap();
        let grade = &result.categorical[0];
        assert_eq!(grade.distinct, 3);
        let values: Vec<&str> = grade.frequencies.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, vec!["b", "a"]);
        assert_eq!(grade.frequencies[0].percent, 33.3);
    }

    #[test]
    fn unknown_column_fails() {
        let err = describe(
            &dataset(),
            &DescriptiveParams {
                columns: Some(vec!["height".to_string()]),
            },
            10,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
