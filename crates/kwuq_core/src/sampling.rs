//! Multivariate normal draws of the published parameters.

use nalgebra::{DMatrix, DVector};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rand_distr::StandardNormal;

use crate::error::ValidationError;
use crate::model::{CovarianceMatrix, PublishedParam, PublishedParams};

/// Eigenvalues above `-EIGEN_TOLERANCE * max(1, largest)` are treated as zero
const EIGEN_TOLERANCE: f64 = 1e-10;

/// `N(mean, cov)` over the 26 published parameters.
///
/// Draws are `mean + F z` with `F Fᵀ = cov`. `F` is the Cholesky factor when
/// the covariance is positive definite. Singular covariances, such as a
/// diagonal with fixed entries, fall back to an eigen factor.
#[derive(Debug, Clone)]
pub struct MvNormal {
    mean: DVector<f64>,
    factor: DMatrix<f64>,
}

impl MvNormal {
    pub fn new(mean: &PublishedParams, cov: &CovarianceMatrix) -> Result<Self, ValidationError> {
        for (param, value) in mean.iter() {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite {
                    what: "parameter mean",
                    index: param.index(),
                    value,
                });
            }
        }
        let factor = factorize(cov.as_matrix().clone())?;
        Ok(Self {
            mean: DVector::from_column_slice(mean.values()),
            factor,
        })
    }

    /// Lower factor `F` with `F Fᵀ = cov`
    #[must_use]
    pub fn factor(&self) -> &DMatrix<f64> {
        &self.factor
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PublishedParams {
        let z = DVector::<f64>::from_fn(PublishedParam::COUNT, |_, _| rng.sample(StandardNormal));
        let draw = &self.mean + &self.factor * z;
        let mut values = [0.0; PublishedParam::COUNT];
        values.copy_from_slice(draw.as_slice());
        PublishedParams::from_array(values)
    }

    /// Draw from a fresh generator seeded with `seed`
    #[must_use]
    pub fn sample_seeded(&self, seed: u64) -> PublishedParams {
        let mut rng = SmallRng::seed_from_u64(seed);
        self.sample(&mut rng)
    }
}

/// `F` with `F Fᵀ = matrix` for a symmetric positive semi-definite matrix.
///
/// The Cholesky factor if it exists, otherwise `V diag(sqrt(λ))` from the
/// symmetric eigendecomposition with round-off negatives clamped to zero.
pub(crate) fn factorize(matrix: DMatrix<f64>) -> Result<DMatrix<f64>, ValidationError> {
    if let Some(chol) = matrix.clone().cholesky() {
        return Ok(chol.l());
    }
    let eigen = matrix.symmetric_eigen();
    let largest = eigen.eigenvalues.max().max(1.0);
    let min_eigenvalue = eigen.eigenvalues.min();
    if min_eigenvalue < -EIGEN_TOLERANCE * largest {
        return Err(ValidationError::NotPositiveSemiDefinite { min_eigenvalue });
    }
    let roots = eigen.eigenvalues.map(|l| l.max(0.0).sqrt());
    Ok(eigen.eigenvectors * DMatrix::from_diagonal(&roots))
}
