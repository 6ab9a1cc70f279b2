//! Statistical routines over tables.
//!
//! Every routine resolves its columns up front (failing with
//! [`SurveyError::ColumnNotFound`](crate::SurveyError::ColumnNotFound)),
//! drops rows with missing values listwise, and returns a serializable
//! result. Problems that should not abort an analysis are attached to the
//! result as [`ComputationWarning`]s.

mod anova;
mod assumptions;
mod descriptive;
mod design;
mod diagnostic;
mod linalg;
mod numeric;
mod regression;
mod reliability;
mod ttest;

pub use anova::{AnovaDesign, AnovaRow, AnovaTable, run_anova};
pub use assumptions::{AssumptionReport, HomogeneityTest, NormalityTest, check_assumptions};
pub use descriptive::{Descriptives, descriptive_stats};
pub use diagnostic::{ComputationWarning, Diagnostic};
pub use regression::{
    Coefficient, HierarchicalComparison, ModelFit, RegressionOptions, RegressionResult, Vif,
    run_multiple_regression,
};
pub use reliability::{ItemStatistics, Reliability, cronbach_alpha};
pub use ttest::{SampleSummary, TTestDesign, TTestKind, TTestReport, TTestResult, run_t_test};
