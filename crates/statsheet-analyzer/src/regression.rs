use crate::model::{is_significant, Coefficient, RegressionResult, SIGNIFICANCE_LEVEL};
use crate::params::RegressionParams;
use crate::stats::{complete_cases, ensure_distinct, f_upper_p, mean, t_two_sided_p};
use nalgebra::{DMatrix, DVector};
use statsheet_core::{AppError, AppResult};
use statsheet_data::Dataset;

pub const INTERCEPT_NAME: &str = "(Constant)";
const PERFECT_FIT_TOLERANCE: f64 = 1e-12;
// singular values below this fraction of the largest count as zero
const RANK_TOLERANCE: f64 = 1e-10;

pub fn linear_regression(dataset: &Dataset, params: &RegressionParams) -> AppResult<RegressionResult> {
    let independents = &params.independents;
    if independents.is_empty() {
        return Err(AppError::validation("regression needs at least 1 independent variable"));
    }
    if independents.contains(&params.dependent) {
        return Err(AppError::validation(format!(
            "dependent '{}' cannot also be an independent variable",
            params.dependent
        )));
    }
    ensure_distinct("independents", independents)?;

    let mut columns = vec![dataset.numeric(&params.dependent)?];
    for name in independents {
        columns.push(dataset.numeric(name)?);
    }
    let mut cases = complete_cases(&columns);
    let y = DVector::from_vec(cases.remove(0));
    let n = y.len();
    let p = independents.len();
    if n <= p + 1 {
        return Err(AppError::validation(format!(
            "regression with {p} predictor(s) needs more than {} complete rows, found {n}",
            p + 1
        )));
    }

    let y_mean = mean(y.as_slice());
    let ss_total: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    if ss_total == 0.0 {
        return Err(AppError::validation(format!(
            "dependent '{}' has zero variance",
            params.dependent
        )));
    }

    let x = DMatrix::from_fn(n, p + 1, |row, col| if col == 0 { 1.0 } else { cases[col - 1][row] });
    let svd = x.clone().svd(true, true);
    let max_singular = svd.singular_values.max();
    let tolerance = RANK_TOLERANCE * max_singular;
    let rank = svd.rank(tolerance);
    let beta = svd
        .solve(&y, tolerance)
        .map_err(|e| AppError::internal(format!("least squares solve failed: {e}")))?;

    let fitted = &x * &beta;
    let ss_residual: f64 = y.iter().zip(fitted.iter()).map(|(a, b)| (a - b).powi(2)).sum();
    let ss_regression: f64 = fitted.iter().map(|v| (v - y_mean).powi(2)).sum();
    if ss_residual <= PERFECT_FIT_TOLERANCE * ss_total {
        return Err(AppError::validation(
            "model fits the data perfectly; residual variance is zero and F is undefined",
        ));
    }

    let df_regression = rank.saturating_sub(1) as f64;
    let df_residual = (n - rank) as f64;
    let r_squared = (1.0 - ss_residual / ss_total).clamp(0.0, 1.0);
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / df_residual;
    let sigma_squared = ss_residual / df_residual;

    let (f_statistic, p_value) = if df_regression > 0.0 {
        let f = (ss_regression / df_regression) / sigma_squared;
        (f, f_upper_p(f, df_regression, df_residual)?)
    } else {
        (0.0, 1.0)
    };

    let v_t = svd
        .v_t
        .as_ref()
        .ok_or_else(|| AppError::internal("SVD did not produce right singular vectors"))?;
    let names = std::iter::once(INTERCEPT_NAME.to_string()).chain(independents.iter().cloned());
    let mut coefficients = Vec::with_capacity(p + 1);
    for (j, name) in names.enumerate() {
        // diagonal of (X'X)^+ from the retained singular directions
        let variance_factor: f64 = svd
            .singular_values
            .iter()
            .enumerate()
            .filter(|(_, s)| **s > tolerance)
            .map(|(k, s)| v_t[(k, j)].powi(2) / (s * s))
            .sum();
        let std_error = (sigma_squared * variance_factor).sqrt();
        let estimate = beta[j];
        let (t_statistic, coefficient_p) = if std_error > 0.0 {
            let t = estimate / std_error;
            (Some(t), Some(t_two_sided_p(t, df_residual)?))
        } else {
            (None, None)
        };
        coefficients.push(Coefficient {
            name,
            estimate,
            std_error,
            t_statistic,
            p_value: coefficient_p,
            significant: coefficient_p.is_some_and(is_significant),
        });
    }

    Ok(RegressionResult {
        dependent: params.dependent.clone(),
        independents: independents.clone(),
        n,
        r: r_squared.sqrt(),
        r_squared,
        adj_r_squared,
        std_error_estimate: sigma_squared.sqrt(),
        ss_regression,
        ss_residual,
        df_regression,
        df_residual,
        f_statistic,
        p_value,
        significant: is_significant(p_value),
        significance_level: SIGNIFICANCE_LEVEL,
        coefficients,
    })
}
