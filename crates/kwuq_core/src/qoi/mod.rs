//! Quantities of interest extracted from simulated panels.
//!
//! Two families are supported:
//! - education statistics over the final period (KW97 Table 14)
//! - the between-type share of the variance of period-0 value functions

mod education;
mod utility;

pub use education::{education_statistics, mean_final_education};
pub use utility::{
    TOTAL_VARIANCE_TOLERANCE, TypeMoments, VarianceDecomposition, WEIGHT_SUM_TOLERANCE,
    variance_decomposition, variance_ratio,
};

use serde::{Deserialize, Serialize};

/// Which quantity of interest a model evaluation produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QoiKind {
    /// Mean final-period schooling (scalar)
    #[default]
    MeanEducation,
    /// Full 4×5 education table
    EducationTable,
    /// Between-type variance ratio of expected lifetime utility (scalar)
    VarianceRatio,
}
