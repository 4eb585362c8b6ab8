pub mod analyze;
pub mod anova;
pub mod chi_square;
pub mod correlation;
pub mod cronbach;
pub mod descriptive;
pub mod model;
pub mod params;
pub mod regression;
pub mod stats;
pub mod ttest;

pub use analyze::run_analysis;
pub use model::{AnalysisFailure, AnalysisKind, AnalysisOutcome, ResultRecord};
pub use params::AnalysisParams;
