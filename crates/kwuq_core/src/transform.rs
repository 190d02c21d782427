//! Published-to-simulator parameter transform.
//!
//! The simulator differs from the published notation in three ways:
//! - the experience coefficients of occupation B are ordered differently,
//! - squared-experience terms and the two schooling cost terms carry the
//!   opposite sign,
//! - the shock distribution is given as standard deviations and correlations
//!   instead of the lower-triangular Cholesky factor of its covariance.

use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{PublishedParam, PublishedParams, SimulatorParam, SimulatorParams};

/// Simulator coefficients that have no counterpart in the published notation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedParams {
    /// Discount factor
    pub delta: f64,
    pub meas_error_sd_a: f64,
    pub meas_error_sd_b: f64,
    /// Share of agents whose lagged choice is schooling when starting with 10 years
    pub lagged_choice_edu_ten: f64,
    /// Share of agents starting with 10 years of schooling
    pub initial_exp_edu_ten: f64,
    /// Maximum attainable years of schooling
    pub maximum_exp_edu: f64,
}

impl Default for FixedParams {
    fn default() -> Self {
        Self {
            delta: 0.95,
            meas_error_sd_a: 0.0,
            meas_error_sd_b: 0.0,
            lagged_choice_edu_ten: 1.0,
            initial_exp_edu_ten: 1.0,
            maximum_exp_edu: 20.0,
        }
    }
}

/// Lower-triangular Cholesky factor of the shock covariance
#[must_use]
pub fn shock_cholesky(published: &PublishedParams) -> Matrix4<f64> {
    let mut chol = Matrix4::zeros();
    for param in PublishedParam::ALL {
        if let Some(position) = param.cholesky_position() {
            chol[position] = published[param];
        }
    }
    chol
}

/// Map a published parameter vector to the simulator notation
#[must_use]
pub fn transform(published: &PublishedParams, fixed: &FixedParams) -> SimulatorParams {
    use PublishedParam as P;
    use SimulatorParam as S;

    let mut out = [f64::NAN; SimulatorParam::COUNT];
    let mut set = |param: S, value: f64| out[param.index()] = value;

    set(S::Delta, fixed.delta);
    set(S::MeasErrorSdA, fixed.meas_error_sd_a);
    set(S::MeasErrorSdB, fixed.meas_error_sd_b);
    set(S::LaggedChoiceEduTen, fixed.lagged_choice_edu_ten);
    set(S::InitialExpEduTen, fixed.initial_exp_edu_ten);
    set(S::MaximumExpEdu, fixed.maximum_exp_edu);

    // Same meaning, same sign
    set(S::WageAConstant, published[P::Alpha10]);
    set(S::WageAExpEdu, published[P::Alpha11]);
    set(S::WageAExpA, published[P::Alpha12]);
    set(S::WageAExpB, published[P::Alpha14]);
    set(S::WageBConstant, published[P::Alpha20]);
    set(S::WageBExpEdu, published[P::Alpha21]);
    // occupation B lists its own experience first
    set(S::WageBExpB, published[P::Alpha22]);
    set(S::WageBExpA, published[P::Alpha24]);
    set(S::NonpecEduConstant, published[P::Beta0]);
    set(S::NonpecHomeConstant, published[P::Gamma0]);

    // Negated by the simulator
    set(S::WageAExpASquare, -published[P::Alpha13]);
    set(S::WageAExpBSquare, -published[P::Alpha15]);
    set(S::WageBExpBSquare, -published[P::Alpha23]);
    set(S::WageBExpASquare, -published[P::Alpha25]);
    set(S::NonpecEduAtLeastTwelveExpEdu, -published[P::Beta1]);
    set(S::NonpecEduNotEduLastPeriod, -published[P::Beta2]);

    let chol = shock_cholesky(published);
    let cov = chol * chol.transpose();
    let sd = cov.diagonal().map(f64::sqrt);
    // a degenerate shock is uncorrelated with everything
    let corr = |i: usize, j: usize| {
        let scale = sd[i] * sd[j];
        if scale == 0.0 { 0.0 } else { cov[(i, j)] / scale }
    };

    set(S::ShockSdA, sd[0]);
    set(S::ShockSdB, sd[1]);
    set(S::ShockSdEdu, sd[2]);
    set(S::ShockSdHome, sd[3]);
    set(S::ShockCorrBA, corr(1, 0));
    set(S::ShockCorrEduA, corr(2, 0));
    set(S::ShockCorrEduB, corr(2, 1));
    set(S::ShockCorrHomeA, corr(3, 0));
    set(S::ShockCorrHomeB, corr(3, 1));
    set(S::ShockCorrHomeEdu, corr(3, 2));

    SimulatorParams::from_array(out)
}

/// Transform raw values given in table order.
///
/// Fails unless exactly 26 values are given.
pub fn transform_values(
    values: &[f64],
    fixed: &FixedParams,
) -> Result<SimulatorParams, ValidationError> {
    let published = PublishedParams::from_values(values)?;
    Ok(transform(&published, fixed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-8;

    /// KW94 Table 4.1, data set one
    fn kw94_one() -> PublishedParams {
        PublishedParams::from_values(&[
            9.21, 0.038, 0.033, -0.0005, 0.0, 0.0, // alpha1x
            8.48, 0.07, 0.067, -0.001, 0.022, -0.0005, // alpha2x
            0.0, 4000.0, 15000.0, // beta
            14500.0, // gamma0
            0.2, 0.0, 0.25, 0.0, 0.0, 1500.0, 0.0, 0.0, 0.0, 1500.0, // a
        ])
        .unwrap()
    }

    fn assert_close(actual: &SimulatorParams, expected: &[(SimulatorParam, f64)]) {
        for (param, value) in expected {
            let got = actual[*param];
            assert!(
                (got - value).abs() < TOLERANCE,
                "{}.{}: expected {value}, got {got}",
                param.category(),
                param.name()
            );
        }
    }

    #[test]
    fn test_reference_vector_kw94_one() {
        use SimulatorParam as S;

        let out = transform(&kw94_one(), &FixedParams::default());

        assert_close(
            &out,
            &[
                (S::Delta, 0.95),
                (S::WageAConstant, 9.21),
                (S::WageAExpEdu, 0.038),
                (S::WageAExpA, 0.033),
                (S::WageAExpASquare, 0.0005),
                (S::WageAExpB, 0.0),
                (S::WageAExpBSquare, 0.0),
                (S::WageBConstant, 8.48),
                (S::WageBExpEdu, 0.07),
                (S::WageBExpB, 0.067),
                (S::WageBExpBSquare, 0.001),
                (S::WageBExpA, 0.022),
                (S::WageBExpASquare, 0.0005),
                (S::NonpecEduConstant, 0.0),
                (S::NonpecEduAtLeastTwelveExpEdu, -4000.0),
                (S::NonpecEduNotEduLastPeriod, -15000.0),
                (S::NonpecHomeConstant, 14500.0),
                (S::ShockSdA, 0.2),
                (S::ShockSdB, 0.25),
                (S::ShockSdEdu, 1500.0),
                (S::ShockSdHome, 1500.0),
                (S::ShockCorrBA, 0.0),
                (S::ShockCorrEduA, 0.0),
                (S::ShockCorrEduB, 0.0),
                (S::ShockCorrHomeA, 0.0),
                (S::ShockCorrHomeB, 0.0),
                (S::ShockCorrHomeEdu, 0.0),
                (S::LaggedChoiceEduTen, 1.0),
                (S::InitialExpEduTen, 1.0),
                (S::MaximumExpEdu, 20.0),
                (S::MeasErrorSdA, 0.0),
                (S::MeasErrorSdB, 0.0),
            ],
        );
    }

    #[test]
    fn test_output_is_fully_populated() {
        let out = transform(&kw94_one(), &FixedParams::default());
        assert_eq!(out.values().len(), SimulatorParam::COUNT);
        assert!(out.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_degenerate_shock_has_zero_correlation() {
        let published = kw94_one().with(PublishedParam::A11, 0.0);
        let out = transform(&published, &FixedParams::default());
        assert_eq!(out[SimulatorParam::ShockSdA], 0.0);
        assert_eq!(out[SimulatorParam::ShockCorrBA], 0.0);
        assert_eq!(out[SimulatorParam::ShockCorrHomeA], 0.0);
    }

    #[test]
    fn test_correlated_shocks() {
        use PublishedParam as P;
        use SimulatorParam as S;

        // L = [[2,0,0,0],[1,1,0,0],[0,0,3,0],[1,0,0,1]]
        // cov = [[4,2,0,2],[2,2,0,1],[0,0,9,0],[2,1,0,2]]
        let published = kw94_one()
            .with(P::A11, 2.0)
            .with(P::A21, 1.0)
            .with(P::A22, 1.0)
            .with(P::A33, 3.0)
            .with(P::A41, 1.0)
            .with(P::A44, 1.0);

        let out = transform(&published, &FixedParams::default());
        let sqrt2 = 2.0_f64.sqrt();

        assert_close(
            &out,
            &[
                (S::ShockSdA, 2.0),
                (S::ShockSdB, sqrt2),
                (S::ShockSdEdu, 3.0),
                (S::ShockSdHome, sqrt2),
                (S::ShockCorrBA, 2.0 / (2.0 * sqrt2)),
                (S::ShockCorrEduA, 0.0),
                (S::ShockCorrEduB, 0.0),
                (S::ShockCorrHomeA, 2.0 / (2.0 * sqrt2)),
                (S::ShockCorrHomeB, 1.0 / 2.0),
                (S::ShockCorrHomeEdu, 0.0),
            ],
        );
    }

    #[test]
    fn test_transform_does_not_touch_input() {
        let published = kw94_one();
        let copy = published;
        let _ = transform(&published, &FixedParams::default());
        assert_eq!(published, copy);
    }

    #[test]
    fn test_wrong_length_is_validation_error() {
        let fixed = FixedParams::default();
        for len in [0, 25, 27, 59] {
            let err = transform_values(&vec![0.0; len], &fixed).unwrap_err();
            assert_eq!(
                err,
                ValidationError::WrongLength {
                    what: "published parameter vector",
                    expected: 26,
                    actual: len,
                }
            );
        }
        assert!(transform_values(kw94_one().values(), &fixed).is_ok());
    }
}
