//! Policy evaluation around a simulator.
//!
//! A [`ModelWrapper`] runs the simulator once with the parameters as given and
//! once with a policy perturbation applied to a single coefficient, and reports
//! the change in the chosen quantity of interest. It is the only place the
//! simulator is invoked.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    EducationStatistics, QoiValue, SimulatedPanel, SimulatorParam, SimulatorParams,
};
use crate::qoi::{QoiKind, education_statistics, mean_final_education, variance_ratio};
use crate::simulation::{SimulationConfig, Simulator};

/// Additive change to one simulator coefficient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub parameter: SimulatorParam,
    pub change: f64,
}

impl Policy {
    /// College tuition subsidy of `amount` dollars per year
    #[must_use]
    pub fn tuition_subsidy(amount: f64) -> Self {
        Self {
            parameter: SimulatorParam::NonpecEduAtLeastTwelveExpEdu,
            change: amount,
        }
    }

    #[must_use]
    pub fn apply(&self, params: &SimulatorParams) -> SimulatorParams {
        params.with_added(self.parameter, self.change)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::tuition_subsidy(500.0)
    }
}

/// Baseline and policy outcomes at a single parameter vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationReport {
    pub baseline_education: EducationStatistics,
    pub policy_education: EducationStatistics,
    /// `policy_education - baseline_education`
    pub policy_impact: EducationStatistics,
    pub baseline_variance_ratio: f64,
    pub policy_variance_ratio: f64,
}

pub struct ModelWrapper<S> {
    simulator: S,
    config: SimulationConfig,
    policy: Policy,
    qoi: QoiKind,
}

impl<S: Simulator> ModelWrapper<S> {
    pub fn new(simulator: S, config: SimulationConfig, policy: Policy, qoi: QoiKind) -> Self {
        Self {
            simulator,
            config,
            policy,
            qoi,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    #[must_use]
    pub fn qoi(&self) -> QoiKind {
        self.qoi
    }

    fn simulate(&self, params: &SimulatorParams) -> Result<SimulatedPanel> {
        Ok(self.simulator.simulate(params, &self.config)?)
    }

    /// Evaluate the configured QoI at `params`.
    ///
    /// Education QoIs are returned as policy minus baseline. The variance
    /// ratio is a level, computed on the policy run alone.
    pub fn evaluate(&self, params: &SimulatorParams) -> Result<QoiValue> {
        let policy_params = self.policy.apply(params);
        match self.qoi {
            QoiKind::MeanEducation => {
                let baseline = mean_final_education(&self.simulate(params)?)?;
                let policy = mean_final_education(&self.simulate(&policy_params)?)?;
                Ok(QoiValue::Scalar(policy - baseline))
            }
            QoiKind::EducationTable => {
                let baseline = education_statistics(&self.simulate(params)?)?;
                let policy = education_statistics(&self.simulate(&policy_params)?)?;
                Ok(QoiValue::Table(policy.difference(&baseline)))
            }
            QoiKind::VarianceRatio => {
                let ratio = variance_ratio(&self.simulate(&policy_params)?)?;
                Ok(QoiValue::Scalar(ratio))
            }
        }
    }

    /// Evaluate from raw values in simulator order (length 32)
    pub fn evaluate_values(&self, values: &[f64]) -> Result<QoiValue> {
        let params = SimulatorParams::from_values(values)?;
        self.evaluate(&params)
    }

    /// Both QoI families for the baseline and the policy run
    pub fn replicate(&self, params: &SimulatorParams) -> Result<ReplicationReport> {
        let baseline = self.simulate(params)?;
        let policy = self.simulate(&self.policy.apply(params))?;

        let baseline_education = education_statistics(&baseline)?;
        let policy_education = education_statistics(&policy)?;

        Ok(ReplicationReport {
            baseline_education,
            policy_education,
            policy_impact: policy_education.difference(&baseline_education),
            baseline_variance_ratio: variance_ratio(&baseline)?,
            policy_variance_ratio: variance_ratio(&policy)?,
        })
    }
}
