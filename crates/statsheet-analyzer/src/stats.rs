use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, StudentsT};
use statsheet_core::{AppError, AppResult};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (N-1); zero for fewer than two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    ss / (values.len() - 1) as f64
}

pub fn sample_std_dev(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

pub fn sum_of_squares(values: &[f64], center: f64) -> f64 {
    values.iter().map(|v| (v - center).powi(2)).sum()
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// 1-based ranks; ties share the average of the positions they occupy.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

/// Pearson's r, or `None` when either side has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

fn distribution_error(name: &str, e: impl std::fmt::Display) -> AppError {
    AppError::internal(format!("invalid {name} distribution: {e}"))
}

pub fn t_two_sided_p(t: f64, df: f64) -> AppResult<f64> {
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| distribution_error("t", e))?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

pub fn f_upper_p(f: f64, df1: f64, df2: f64) -> AppResult<f64> {
    let dist = FisherSnedecor::new(df1, df2).map_err(|e| distribution_error("F", e))?;
    Ok(dist.sf(f).clamp(0.0, 1.0))
}

pub fn chi_square_upper_p(statistic: f64, df: f64) -> AppResult<f64> {
    let dist = ChiSquared::new(df).map_err(|e| distribution_error("chi-square", e))?;
    Ok(dist.sf(statistic).clamp(0.0, 1.0))
}

/// Rows where every column has a value, returned column-wise.
pub fn complete_cases(columns: &[&[Option<f64>]]) -> Vec<Vec<f64>> {
    let rows = columns.iter().map(|c| c.len()).min().unwrap_or(0);
    let mut out = vec![Vec::new(); columns.len()];
    for row in 0..rows {
        if columns.iter().all(|column| column[row].is_some()) {
            for (target, column) in out.iter_mut().zip(columns) {
                if let Some(value) = column[row] {
                    target.push(value);
                }
            }
        }
    }
    out
}

/// Values grouped by label in first-seen order, skipping rows missing either side.
pub fn group_by_label(labels: &[Option<String>], values: &[Option<f64>]) -> Vec<(String, Vec<f64>)> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for (label, value) in labels.iter().zip(values) {
        let (Some(label), Some(value)) = (label, value) else {
            continue;
        };
        match groups.iter_mut().find(|(name, _)| name == label) {
            Some((_, members)) => members.push(*value),
            None => groups.push((label.clone(), vec![*value])),
        }
    }
    groups
}

pub fn ensure_distinct(param: &str, names: &[String]) -> AppResult<()> {
    for (idx, name) in names.iter().enumerate() {
        if names[..idx].contains(name) {
            return Err(AppError::validation(format!(
                "{param} lists column '{name}' more than once"
            )));
        }
    }
    Ok(())
}
