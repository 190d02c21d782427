//! Run configuration of an uncertainty-quantification study.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::model::{CovarianceMatrix, PublishedParam, PublishedParams};
use crate::propagation::{MonteCarloPropagator, PropagationConfig};
use crate::qoi::QoiKind;
use crate::simulation::SimulationConfig;
use crate::simulators::LookaheadSimulator;
use crate::transform::FixedParams;
use crate::wrapper::{ModelWrapper, Policy};

/// One row of the parameter table: point estimate and standard error
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterEntry {
    pub name: PublishedParam,
    pub mean: f64,
    #[serde(default)]
    pub sd: f64,
}

/// Off-diagonal covariance entry, mirrored across the diagonal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CovarianceEntry {
    pub row: PublishedParam,
    pub col: PublishedParam,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UqConfig {
    /// All 26 published coefficients, in any order
    pub parameters: Vec<ParameterEntry>,
    #[serde(default)]
    pub covariance: Vec<CovarianceEntry>,
    #[serde(default)]
    pub fixed: FixedParams,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub qoi: QoiKind,
    #[serde(default)]
    pub propagation: PropagationConfig,
    #[serde(default)]
    pub simulator: LookaheadSimulator,
}

impl UqConfig {
    /// Config with the given table and defaults everywhere else
    #[must_use]
    pub fn new(parameters: Vec<ParameterEntry>) -> Self {
        Self {
            parameters,
            covariance: Vec::new(),
            fixed: FixedParams::default(),
            simulation: SimulationConfig::default(),
            policy: Policy::default(),
            qoi: QoiKind::default(),
            propagation: PropagationConfig::default(),
            simulator: LookaheadSimulator::default(),
        }
    }

    pub fn mean(&self) -> std::result::Result<PublishedParams, ValidationError> {
        PublishedParams::from_pairs(self.parameters.iter().map(|e| (e.name.name(), e.mean)))
    }

    pub fn standard_deviations(&self) -> std::result::Result<PublishedParams, ValidationError> {
        PublishedParams::from_pairs(self.parameters.iter().map(|e| (e.name.name(), e.sd)))
    }

    /// `diag(sd²)` with the off-diagonal entries applied in order
    pub fn covariance(&self) -> std::result::Result<CovarianceMatrix, ValidationError> {
        let mut cov = CovarianceMatrix::from_standard_deviations(&self.standard_deviations()?)?;
        for entry in &self.covariance {
            if entry.row == entry.col {
                return Err(ValidationError::Config(format!(
                    "covariance entry for '{}' is on the diagonal, use its sd instead",
                    entry.row.name()
                )));
            }
            cov = cov.with_covariance(entry.row, entry.col, entry.value)?;
        }
        Ok(cov)
    }

    #[must_use]
    pub fn wrapper(&self) -> ModelWrapper<LookaheadSimulator> {
        ModelWrapper::new(
            self.simulator.clone(),
            self.simulation,
            self.policy,
            self.qoi,
        )
    }

    pub fn propagator(&self) -> Result<MonteCarloPropagator<LookaheadSimulator>> {
        MonteCarloPropagator::new(
            self.mean()?,
            self.covariance()?,
            self.fixed,
            self.wrapper(),
            self.propagation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SimulatorParam;

    fn table() -> Vec<ParameterEntry> {
        PublishedParam::ALL
            .iter()
            .map(|p| ParameterEntry {
                name: *p,
                mean: p.index() as f64,
                sd: 0.1,
            })
            .collect()
    }

    #[test]
    fn test_mean_and_covariance() {
        let mut config = UqConfig::new(table());
        config.covariance.push(CovarianceEntry {
            row: PublishedParam::Alpha10,
            col: PublishedParam::Alpha11,
            value: 0.005,
        });

        let mean = config.mean().unwrap();
        assert_eq!(mean[PublishedParam::Gamma0], 15.0);

        let cov = config.covariance().unwrap();
        assert!((cov.variance(PublishedParam::A44) - 0.01).abs() < 1e-15);
        assert_eq!(
            cov.get(PublishedParam::Alpha11, PublishedParam::Alpha10),
            0.005
        );
    }

    #[test]
    fn test_missing_parameter() {
        let mut parameters = table();
        parameters.retain(|e| e.name != PublishedParam::Beta2);
        assert_eq!(
            UqConfig::new(parameters).mean(),
            Err(ValidationError::MissingParameter(PublishedParam::Beta2))
        );
    }

    #[test]
    fn test_diagonal_entry_rejected() {
        let mut config = UqConfig::new(table());
        config.covariance.push(CovarianceEntry {
            row: PublishedParam::Beta0,
            col: PublishedParam::Beta0,
            value: 1.0,
        });
        assert!(matches!(
            config.covariance(),
            Err(ValidationError::Config(_))
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "parameters": [{"name": "alpha10", "mean": 9.21, "sd": 0.01}],
            "policy": {"parameter": "nonpec_edu.at_least_twelve_exp_edu", "change": 1000.0},
            "qoi": "education_table",
            "propagation": {"num_draws": 12}
        }"#;
        let config: UqConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.parameters[0].name, PublishedParam::Alpha10);
        assert_eq!(
            config.policy.parameter,
            SimulatorParam::NonpecEduAtLeastTwelveExpEdu
        );
        assert_eq!(config.qoi, QoiKind::EducationTable);
        assert_eq!(config.propagation.num_draws, 12);
        assert_eq!(config.propagation.seed, 0);
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.simulator.types.len(), 4);
    }
}
