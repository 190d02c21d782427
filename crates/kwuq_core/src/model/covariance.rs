use nalgebra::DMatrix;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use super::params::{PublishedParam, PublishedParams};
use crate::error::ValidationError;

/// Relative tolerance used when checking symmetry
const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// Covariance of the published parameters, indexed by `PublishedParam` on both axes.
///
/// Symmetric with non-negative diagonal. Positive semi-definiteness is checked
/// when a sampler factorizes the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceMatrix {
    matrix: DMatrix<f64>,
}

impl CovarianceMatrix {
    /// Diagonal covariance `diag(sd²)` from a column of standard errors
    pub fn from_standard_deviations(sd: &PublishedParams) -> Result<Self, ValidationError> {
        let mut matrix = DMatrix::<f64>::zeros(PublishedParam::COUNT, PublishedParam::COUNT);
        for (param, value) in sd.iter() {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite {
                    what: "standard deviation column",
                    index: param.index(),
                    value,
                });
            }
            if value < 0.0 {
                return Err(ValidationError::NegativeVariance { param, value });
            }
            matrix[(param.index(), param.index())] = value * value;
        }
        Ok(Self { matrix })
    }

    /// Wrap a full 26×26 matrix in table order
    pub fn from_matrix(matrix: DMatrix<f64>) -> Result<Self, ValidationError> {
        if matrix.nrows() != PublishedParam::COUNT || matrix.ncols() != PublishedParam::COUNT {
            return Err(ValidationError::WrongLength {
                what: "covariance matrix side",
                expected: PublishedParam::COUNT,
                actual: matrix.nrows().max(matrix.ncols()),
            });
        }
        for row in PublishedParam::ALL {
            let i = row.index();
            let diag = matrix[(i, i)];
            if !diag.is_finite() {
                return Err(ValidationError::NonFinite {
                    what: "covariance diagonal",
                    index: i,
                    value: diag,
                });
            }
            if diag < 0.0 {
                return Err(ValidationError::NegativeVariance {
                    param: row,
                    value: diag,
                });
            }
            for col in PublishedParam::ALL.iter().skip(i + 1) {
                let j = col.index();
                let (a, b) = (matrix[(i, j)], matrix[(j, i)]);
                let scale = a.abs().max(b.abs()).max(1.0);
                if !a.is_finite() || (a - b).abs() > SYMMETRY_TOLERANCE * scale {
                    return Err(ValidationError::NotSymmetric { row, col: *col });
                }
            }
        }
        Ok(Self { matrix })
    }

    /// Copy with the `(row, col)` and `(col, row)` entries set to `value`
    pub fn with_covariance(
        &self,
        row: PublishedParam,
        col: PublishedParam,
        value: f64,
    ) -> Result<Self, ValidationError> {
        let mut matrix = self.matrix.clone();
        matrix[(row.index(), col.index())] = value;
        matrix[(col.index(), row.index())] = value;
        Self::from_matrix(matrix)
    }

    #[must_use]
    pub fn get(&self, row: PublishedParam, col: PublishedParam) -> f64 {
        self.matrix[(row.index(), col.index())]
    }

    #[must_use]
    pub fn variance(&self, param: PublishedParam) -> f64 {
        self.get(param, param)
    }

    #[must_use]
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }
}

impl Serialize for CovarianceMatrix {
    /// Serialized as a list of rows in table order
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.matrix.nrows()))?;
        for row in self.matrix.row_iter() {
            let row: Vec<f64> = row.iter().copied().collect();
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sd_column(value: f64) -> PublishedParams {
        PublishedParams::from_values(&[value; PublishedParam::COUNT]).unwrap()
    }

    #[test]
    fn test_diagonal_from_standard_deviations() {
        let sd = sd_column(0.5).with(PublishedParam::Beta1, 100.0);
        let cov = CovarianceMatrix::from_standard_deviations(&sd).unwrap();
        assert_eq!(cov.variance(PublishedParam::Alpha10), 0.25);
        assert_eq!(cov.variance(PublishedParam::Beta1), 10_000.0);
        assert_eq!(cov.get(PublishedParam::Alpha10, PublishedParam::Beta1), 0.0);
    }

    #[test]
    fn test_negative_sd_rejected() {
        let sd = sd_column(0.5).with(PublishedParam::Gamma0, -1.0);
        assert!(matches!(
            CovarianceMatrix::from_standard_deviations(&sd),
            Err(ValidationError::NegativeVariance {
                param: PublishedParam::Gamma0,
                ..
            })
        ));
    }

    #[test]
    fn test_with_covariance_is_symmetric() {
        let cov = CovarianceMatrix::from_standard_deviations(&sd_column(1.0)).unwrap();
        let cov = cov
            .with_covariance(PublishedParam::Alpha11, PublishedParam::Alpha21, 0.3)
            .unwrap();
        assert_eq!(cov.get(PublishedParam::Alpha21, PublishedParam::Alpha11), 0.3);
        assert_eq!(cov.get(PublishedParam::Alpha11, PublishedParam::Alpha21), 0.3);
    }

    #[test]
    fn test_from_matrix_rejects_asymmetry_and_shape() {
        let mut matrix = DMatrix::identity(PublishedParam::COUNT, PublishedParam::COUNT);
        matrix[(0, 1)] = 0.5;
        assert!(matches!(
            CovarianceMatrix::from_matrix(matrix),
            Err(ValidationError::NotSymmetric { .. })
        ));

        let small = DMatrix::identity(3, 3);
        assert!(matches!(
            CovarianceMatrix::from_matrix(small),
            Err(ValidationError::WrongLength { .. })
        ));
    }
}
