use crate::model::{CronbachResult, ItemStats, ReliabilityBand};
use crate::params::CronbachParams;
use crate::stats::{complete_cases, ensure_distinct, mean, pearson, sample_variance};
use statsheet_core::{AppError, AppResult};
use statsheet_data::Dataset;

pub fn cronbach_alpha(dataset: &Dataset, params: &CronbachParams) -> AppResult<CronbachResult> {
    let items = &params.items;
    if items.len() < 2 {
        return Err(AppError::validation("Cronbach's alpha needs at least 2 items"));
    }
    ensure_distinct("items", items)?;

    let columns = items
        .iter()
        .map(|name| dataset.numeric(name))
        .collect::<AppResult<Vec<_>>>()?;
    let cases = complete_cases(&columns);
    let n = cases.first().map_or(0, Vec::len);
    if n < 3 {
        return Err(AppError::validation(format!(
            "Cronbach's alpha needs at least 3 complete cases, found {n}"
        )));
    }

    let all: Vec<usize> = (0..items.len()).collect();
    let alpha = alpha_for(&cases, &all).ok_or_else(|| {
        AppError::validation("total score has zero variance; alpha is undefined")
    })?;

    let totals = row_totals(&cases, &all);
    let item_stats = items
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values = &cases[idx];
            let remaining: Vec<usize> = all.iter().copied().filter(|i| *i != idx).collect();
            ItemStats {
                item: name.clone(),
                mean: mean(values),
                std_dev: sample_variance(values).sqrt(),
                item_total_correlation: pearson(values, &totals),
                alpha_if_deleted: if remaining.len() < 2 {
                    None
                } else {
                    alpha_for(&cases, &remaining)
                },
            }
        })
        .collect();

    Ok(CronbachResult {
        items: items.clone(),
        n,
        n_items: items.len(),
        alpha,
        reliability: ReliabilityBand::from_alpha(alpha),
        item_stats,
    })
}

fn row_totals(cases: &[Vec<f64>], selected: &[usize]) -> Vec<f64> {
    let rows = cases.first().map_or(0, Vec::len);
    (0..rows)
        .map(|row| selected.iter().map(|&item| cases[item][row]).sum())
        .collect()
}

/// `None` when the summed score has zero variance.
fn alpha_for(cases: &[Vec<f64>], selected: &[usize]) -> Option<f64> {
    let k = selected.len() as f64;
    let total_variance = sample_variance(&row_totals(cases, selected));
    if total_variance == 0.0 {
        return None;
    }
    let item_variance: f64 = selected.iter().map(|&i| sample_variance(&cases[i])).sum();
    Some(k / (k - 1.0) * (1.0 - item_variance / total_variance))
}
