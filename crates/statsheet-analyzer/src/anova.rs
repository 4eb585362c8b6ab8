use crate::model::{
    is_significant, AnovaResult, EffectMagnitude, GroupStats, PostHocComparison,
    VarianceComponent, SIGNIFICANCE_LEVEL,
};
use crate::params::AnovaParams;
use crate::stats::{f_upper_p, group_by_label, mean, sample_std_dev, sum_of_squares, t_two_sided_p};
use statsheet_core::{AppError, AppResult};
use statsheet_data::Dataset;

pub fn one_way_anova(dataset: &Dataset, params: &AnovaParams) -> AppResult<AnovaResult> {
    let values = dataset.numeric(&params.dependent)?;
    let labels = dataset.labels(&params.factor)?;
    let groups = group_by_label(&labels, values);
    let k = groups.len();
    if k < 2 {
        return Err(AppError::validation(format!(
            "factor column '{}' must have at least 2 groups, found {k}",
            params.factor
        )));
    }
    let n: usize = groups.iter().map(|(_, members)| members.len()).sum();
    if n <= k {
        return Err(AppError::validation(format!(
            "ANOVA needs more observations ({n}) than groups ({k})"
        )));
    }

    let all: Vec<f64> = groups.iter().flat_map(|(_, members)| members.iter().copied()).collect();
    let grand_mean = mean(&all);
    let ss_total = sum_of_squares(&all, grand_mean);
    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    let mut group_stats = Vec::with_capacity(k);
    for (label, members) in &groups {
        let group_mean = mean(members);
        ss_between += members.len() as f64 * (group_mean - grand_mean).powi(2);
        ss_within += sum_of_squares(members, group_mean);
        group_stats.push(GroupStats {
            label: label.clone(),
            n: members.len(),
            mean: group_mean,
            std_dev: sample_std_dev(members),
        });
    }

    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;
    let ms_between = ss_between / df_between;
    let ms_within = ss_within / df_within;

    let (f_statistic, p_value) = if ms_within == 0.0 {
        if ss_between == 0.0 {
            (Some(0.0), 1.0)
        } else {
            (None, 0.0)
        }
    } else {
        let f = ms_between / ms_within;
        (Some(f), f_upper_p(f, df_between, df_within)?)
    };

    let eta_squared = if ss_total > 0.0 {
        (ss_between / ss_total).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let significant = is_significant(p_value);
    let post_hoc = if significant && k >= 3 {
        Some(bonferroni(&group_stats, ms_within, df_within)?)
    } else {
        None
    };

    Ok(AnovaResult {
        dependent: params.dependent.clone(),
        factor: params.factor.clone(),
        n,
        groups: group_stats,
        grand_mean,
        between: VarianceComponent {
            sum_of_squares: ss_between,
            df: df_between,
            mean_square: Some(ms_between),
        },
        within: VarianceComponent {
            sum_of_squares: ss_within,
            df: df_within,
            mean_square: Some(ms_within),
        },
        total: VarianceComponent {
            sum_of_squares: ss_total,
            df: (n - 1) as f64,
            mean_square: None,
        },
        f_statistic,
        p_value,
        significant,
        significance_level: SIGNIFICANCE_LEVEL,
        eta_squared,
        effect_size: EffectMagnitude::from_eta_squared(eta_squared),
        post_hoc,
    })
}

/// Pairwise t-tests on the pooled within-group mean square, Bonferroni adjusted.
fn bonferroni(
    groups: &[GroupStats],
    ms_within: f64,
    df_within: f64,
) -> AppResult<Vec<PostHocComparison>> {
    let k = groups.len();
    let comparisons = (k * (k - 1) / 2) as f64;
    let mut out = Vec::new();
    for i in 0..k {
        for j in (i + 1)..k {
            let (a, b) = (&groups[i], &groups[j]);
            let mean_difference = a.mean - b.mean;
            let std_error = (ms_within * (1.0 / a.n as f64 + 1.0 / b.n as f64)).sqrt();
            let (t_statistic, p_value) = if std_error == 0.0 {
                if mean_difference == 0.0 {
                    (Some(0.0), 1.0)
                } else {
                    (None, 0.0)
                }
            } else {
                let t = mean_difference / std_error;
                (Some(t), (t_two_sided_p(t, df_within)? * comparisons).min(1.0))
            };
            out.push(PostHocComparison {
                group1: a.label.clone(),
                group2: b.label.clone(),
                mean_difference,
                std_error,
                t_statistic,
                p_value,
                significant: is_significant(p_value),
            });
        }
    }
    Ok(out)
}
