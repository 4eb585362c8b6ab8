use crate::model::{is_significant, EffectMagnitude, GroupStats, TTestResult, SIGNIFICANCE_LEVEL};
use crate::params::TTestParams;
use crate::stats::{group_by_label, mean, sample_variance, t_two_sided_p};
use statsheet_core::{AppError, AppResult};
use statsheet_data::Dataset;

pub fn independent_t_test(dataset: &Dataset, params: &TTestParams) -> AppResult<TTestResult> {
    let labels = dataset.labels(&params.group)?;
    let values = dataset.numeric(&params.value)?;
    let groups = group_by_label(&labels, values);
    if groups.len() != 2 {
        return Err(AppError::validation(format!(
            "group column '{}' must have exactly 2 groups, found {}",
            params.group,
            groups.len()
        )));
    }

    let (label1, x1) = &groups[0];
    let (label2, x2) = &groups[1];
    let n1 = x1.len() as f64;
    let n2 = x2.len() as f64;
    let df = n1 + n2 - 2.0;
    if df < 1.0 {
        return Err(AppError::validation(
            "t-test needs at least 3 observations across both groups",
        ));
    }

    let (m1, m2) = (mean(x1), mean(x2));
    let (v1, v2) = (sample_variance(x1), sample_variance(x2));
    let pooled_sd = (((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df).sqrt();
    let mean_difference = m1 - m2;

    // Constant groups: equal means are no evidence, distinct means are complete separation.
    let (t_statistic, p_value, cohens_d) = if pooled_sd == 0.0 {
        if mean_difference == 0.0 {
            (Some(0.0), 1.0, 0.0)
        } else {
            (None, 0.0, 0.0)
        }
    } else {
        let se = pooled_sd * (1.0 / n1 + 1.0 / n2).sqrt();
        let t = mean_difference / se;
        (Some(t), t_two_sided_p(t, df)?, mean_difference / pooled_sd)
    };

    Ok(TTestResult {
        group_column: params.group.clone(),
        value_column: params.value.clone(),
        groups: vec![
            GroupStats {
                label: label1.clone(),
                n: x1.len(),
                mean: m1,
                std_dev: v1.sqrt(),
            },
            GroupStats {
                label: label2.clone(),
                n: x2.len(),
                mean: m2,
                std_dev: v2.sqrt(),
            },
        ],
        mean_difference,
        t_statistic,
        df,
        p_value,
        significant: is_significant(p_value),
        significance_level: SIGNIFICANCE_LEVEL,
        cohens_d,
        effect_size: EffectMagnitude::from_cohens_d(cohens_d),
    })
}
