use crate::anova::one_way_anova;
use crate::chi_square::chi_square_independence;
use crate::correlation::correlate;
use crate::cronbach::cronbach_alpha;
use crate::descriptive::describe;
use crate::model::{AnalysisFailure, AnalysisOutcome, ResultRecord};
use crate::params::AnalysisParams;
use crate::regression::linear_regression;
use crate::ttest::independent_t_test;
use statsheet_core::config::AnalysisConfig;
use statsheet_core::AppResult;
use statsheet_data::Dataset;

/// Runs one analysis. Parameter and degeneracy errors become a failure record.
pub fn run_analysis(
    dataset: &Dataset,
    params: &AnalysisParams,
    config: &AnalysisConfig,
) -> AnalysisOutcome {
    let kind = params.kind();
    tracing::info!(test = %kind, rows = dataset.row_count(), "running analysis");
    match dispatch(dataset, params, config) {
        Ok(record) => {
            tracing::info!(test = %kind, "analysis completed");
            AnalysisOutcome::Completed(record)
        }
        Err(err) => {
            tracing::warn!(test = %kind, kind = err.kind().as_str(), error = %err, "analysis failed");
            AnalysisOutcome::Failed(AnalysisFailure {
                test: kind,
                error: err.record_message(),
            })
        }
    }
}

fn dispatch(
    dataset: &Dataset,
    params: &AnalysisParams,
    config: &AnalysisConfig,
) -> AppResult<ResultRecord> {
    let record = match params {
        AnalysisParams::Descriptive(p) => {
            ResultRecord::Descriptive(describe(dataset, p, config.top_categories)?)
        }
        AnalysisParams::TTest(p) => ResultRecord::TTest(independent_t_test(dataset, p)?),
        AnalysisParams::Anova(p) => ResultRecord::Anova(one_way_anova(dataset, p)?),
        AnalysisParams::Correlation(p) => ResultRecord::Correlation(correlate(dataset, p)?),
        AnalysisParams::Regression(p) => ResultRecord::Regression(linear_regression(dataset, p)?),
        AnalysisParams::ChiSquare(p) => ResultRecord::ChiSquare(chi_square_independence(
            dataset,
            p,
            config.yates_correction,
        )?),
        AnalysisParams::Cronbach(p) => ResultRecord::Cronbach(cronbach_alpha(dataset, p)?),
    };
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalysisKind;
    use statsheet_data::Column;

    fn survey() -> Dataset {
        let groups = ["A", "A", "A", "A", "B", "B", "B", "B"];
        Dataset::new(vec![
            Column::numeric(
                "satisfaction",
                [3.0, 4.0, 5.0, 2.0, 4.0, 5.0, 3.0, 4.0].iter().map(|v| Some(*v)).collect(),
            ),
            Column::categorical("group", groups.iter().map(|g| Some(g.to_string())).collect()),
        ])
        .unwrap()
    }

    #[test]
    fn dispatches_by_kind() {
        let params = AnalysisParams::from_pairs(
            AnalysisKind::TTest,
            &[("group", "group"), ("value", "satisfaction")],
        )
        .unwrap();
        let outcome = run_analysis(&survey(), &params, &AnalysisConfig::default());
        match outcome {
            AnalysisOutcome::Completed(ResultRecord::TTest(result)) => {
                assert_eq!(result.groups[0].n, 4);
                assert_eq!(result.groups[1].n, 4);
                assert!((result.p_value - 0.5369633243867582).abs() < 1e-6);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn errors_become_failure_records() {
        let params = AnalysisParams::from_pairs(
            AnalysisKind::Anova,
            &[("dependent", "group"), ("factor", "satisfaction")],
        )
        .unwrap();
        let outcome = run_analysis(&survey(), &params, &AnalysisConfig::default());
        assert!(!outcome.is_success());
        assert_eq!(outcome.kind(), AnalysisKind::Anova);
        assert!(outcome.error().unwrap().contains("not numeric"));
    }

    #[test]
    fn every_kind_produces_a_record_kind_match() {
        let data = survey();
        let config = AnalysisConfig::default();
        let requests: [(AnalysisKind, Vec<(&str, &str)>); 4] = [
            (AnalysisKind::Descriptive, vec![]),
            (
                AnalysisKind::Anova,
                vec![("dependent", "satisfaction"), ("factor", "group")],
            ),
            (AnalysisKind::ChiSquare, vec![("var1", "group"), ("var2", "satisfaction")]),
            (AnalysisKind::Cronbach, vec![("items", "satisfaction,satisfaction")]),
        ];
        for (kind, pairs) in requests {
            let params = AnalysisParams::from_pairs(kind, &pairs).unwrap();
            let outcome = run_analysis(&data, &params, &config);
            assert_eq!(outcome.kind(), kind);
        }
    }
}
