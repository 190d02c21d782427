//! Between-type share of the variance in expected lifetime utility (KW97 Table 12).
//!
//! Expected lifetime utility of an agent is its period-0 value function, the
//! maximum over the choice-specific value functions.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{InvariantViolation, Result, SimulationError};
use crate::model::SimulatedPanel;

/// Allowed deviation of the type weights from summing to one
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.02;
/// Allowed gap in the law of total variance, scaled by the total variance once it exceeds one
pub const TOTAL_VARIANCE_TOLERANCE: f64 = 0.0001;
/// Rounding slack on `ratio <= 1`
const RATIO_SLACK: f64 = 1e-12;

/// Per-type breakdown of the period-0 value distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeMoments {
    pub agent_type: u8,
    pub weight: f64,
    pub mean: f64,
    pub variance: f64,
}

/// Decomposition of the variance of expected lifetime utility.
///
/// All variances are population variances, so that
/// `within + between == total` holds exactly up to rounding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceDecomposition {
    pub types: Vec<TypeMoments>,
    pub grand_mean: f64,
    pub total: f64,
    pub between: f64,
    pub within: f64,
    pub ratio: f64,
}

impl VarianceDecomposition {
    /// Check the decomposition invariants
    pub fn validate(&self) -> std::result::Result<(), InvariantViolation> {
        let weight_sum: f64 = self.types.iter().map(|t| t.weight).sum();
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(InvariantViolation::WeightsDoNotSumToOne { sum: weight_sum });
        }
        if self.ratio > 1.0 + RATIO_SLACK {
            return Err(InvariantViolation::RatioAboveOne { ratio: self.ratio });
        }
        let gap = (self.within + self.between - self.total).abs();
        if gap > TOTAL_VARIANCE_TOLERANCE * self.total.max(1.0) {
            return Err(InvariantViolation::TotalVarianceMismatch {
                within: self.within,
                between: self.between,
                total: self.total,
            });
        }
        Ok(())
    }
}

/// Decompose the period-0 value distribution into between- and within-type parts.
///
/// Fails with a simulation error if period 0 is missing or an agent has no
/// available choice, and with an invariant violation if the decomposition is
/// inconsistent. Zero total variance gives a NaN ratio.
pub fn variance_decomposition(panel: &SimulatedPanel) -> Result<VarianceDecomposition> {
    let mut groups: FxHashMap<u8, Vec<f64>> = FxHashMap::default();
    let mut values = Vec::new();
    for record in panel.period(0) {
        let value = record.max_value_function();
        if value.is_nan() {
            return Err(SimulationError::MalformedPanel("agent without an available choice").into());
        }
        groups.entry(record.agent_type).or_default().push(value);
        values.push(value);
    }
    if values.is_empty() {
        return Err(SimulationError::MalformedPanel("panel has no period-0 records").into());
    }

    let n = values.len() as f64;
    let grand_mean = mean(&values);
    let total = population_variance(&values, grand_mean);

    let mut keys: Vec<u8> = groups.keys().copied().collect();
    keys.sort_unstable();

    let types: Vec<TypeMoments> = keys
        .into_iter()
        .map(|agent_type| {
            let members = &groups[&agent_type];
            let type_mean = mean(members);
            TypeMoments {
                agent_type,
                weight: members.len() as f64 / n,
                mean: type_mean,
                variance: population_variance(members, type_mean),
            }
        })
        .collect();

    let between: f64 = types
        .iter()
        .map(|t| t.weight * (t.mean - grand_mean).powi(2))
        .sum();
    let within: f64 = types.iter().map(|t| t.weight * t.variance).sum();

    let ratio = between / total;
    if total == 0.0 {
        tracing::warn!("period-0 values have zero variance; variance ratio is undefined");
    }

    let decomposition = VarianceDecomposition {
        types,
        grand_mean,
        total,
        between,
        within,
        ratio,
    };
    decomposition.validate()?;
    Ok(decomposition)
}

/// Between-type variance divided by total variance
pub fn variance_ratio(panel: &SimulatedPanel) -> Result<f64> {
    variance_decomposition(panel).map(|d| d.ratio)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}
