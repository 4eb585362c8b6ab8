use crate::model::{
    is_significant, CorrelationCell, CorrelationMethod, CorrelationPair, CorrelationResult,
    CorrelationStrength, Direction, VariableStats, SIGNIFICANCE_LEVEL,
};
use crate::params::CorrelationParams;
use crate::stats::{
    average_ranks, complete_cases, ensure_distinct, mean, pearson, sample_std_dev, t_two_sided_p,
};
use statsheet_core::{AppError, AppResult};
use statsheet_data::Dataset;

const PERFECT_FIT_TOLERANCE: f64 = 1e-12;

pub fn correlate(dataset: &Dataset, params: &CorrelationParams) -> AppResult<CorrelationResult> {
    let variables = &params.variables;
    if variables.len() < 2 {
        return Err(AppError::validation(
            "correlation needs at least 2 variables",
        ));
    }
    ensure_distinct("variables", variables)?;

    let columns = variables
        .iter()
        .map(|name| dataset.numeric(name))
        .collect::<AppResult<Vec<_>>>()?;
    let cases = complete_cases(&columns);
    let n = cases.first().map_or(0, Vec::len);
    if n < 3 {
        return Err(AppError::validation(format!(
            "correlation needs at least 3 complete rows, found {n}"
        )));
    }

    let mut descriptives = Vec::with_capacity(variables.len());
    for (name, values) in variables.iter().zip(&cases) {
        let std_dev = sample_std_dev(values);
        if std_dev == 0.0 {
            return Err(AppError::validation(format!(
                "variable '{name}' has zero variance; correlation is undefined"
            )));
        }
        descriptives.push(VariableStats {
            name: name.clone(),
            n,
            mean: mean(values),
            std_dev,
        });
    }

    let transformed: Vec<Vec<f64>> = match params.method {
        CorrelationMethod::Pearson => cases,
        CorrelationMethod::Spearman => cases.iter().map(|values| average_ranks(values)).collect(),
    };

    let k = variables.len();
    let mut matrix = vec![
        vec![
            CorrelationCell {
                r: 1.0,
                p_value: 0.0,
            };
            k
        ];
        k
    ];
    let mut significant_pairs = Vec::new();
    let df = (n - 2) as f64;
    for i in 0..k {
        for j in (i + 1)..k {
            let r = pearson(&transformed[i], &transformed[j]).ok_or_else(|| {
                AppError::validation(format!(
                    "correlation between '{}' and '{}' is undefined",
                    variables[i], variables[j]
                ))
            })?;
            let p_value = correlation_p(r, df)?;
            let cell = CorrelationCell { r, p_value };
            matrix[i][j] = cell.clone();
            matrix[j][i] = cell;
            if is_significant(p_value) {
                significant_pairs.push(CorrelationPair {
                    var1: variables[i].clone(),
                    var2: variables[j].clone(),
                    r,
                    p_value,
                    strength: CorrelationStrength::from_r(r),
                    direction: if r < 0.0 {
                        Direction::Negative
                    } else {
                        Direction::Positive
                    },
                });
            }
        }
    }

    Ok(CorrelationResult {
        method: params.method,
        variables: variables.clone(),
        n,
        descriptives,
        matrix,
        significant_pairs,
        significance_level: SIGNIFICANCE_LEVEL,
    })
}

fn correlation_p(r: f64, df: f64) -> AppResult<f64> {
    if df <= 0.0 {
        return Ok(1.0);
    }
    let denominator = 1.0 - r * r;
    if denominator <= PERFECT_FIT_TOLERANCE {
        return Ok(0.0);
    }
    let t = r * (df / denominator).sqrt();
    t_two_sided_p(t, df)
}
