//! Summary statistics of a QoI sample.
//!
//! Variances are population variances (divided by `N`). Table-valued samples
//! are summarized cell by cell, and NaN cells propagate into their summary.

use serde::Serialize;

use crate::error::ValidationError;
use crate::model::{EducationStatistics, NUM_EDU_STATS, NUM_GROUPS, QoiSample, QoiValue};

/// Mean and variance of one scalar or one table cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Moments {
    pub mean: f64,
    pub variance: f64,
}

impl Moments {
    /// Moments of `values`, NaN for an empty slice
    #[must_use]
    pub fn of(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self { mean, variance }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Summary {
    Scalar(Moments),
    Table {
        mean: EducationStatistics,
        variance: EducationStatistics,
    },
}

impl Summary {
    /// Sample mean with the shape of the summarized QoI
    #[must_use]
    pub fn mean(&self) -> QoiValue {
        match self {
            Summary::Scalar(m) => QoiValue::Scalar(m.mean),
            Summary::Table { mean, .. } => QoiValue::Table(*mean),
        }
    }

    #[must_use]
    pub fn variance(&self) -> QoiValue {
        match self {
            Summary::Scalar(m) => QoiValue::Scalar(m.variance),
            Summary::Table { variance, .. } => QoiValue::Table(*variance),
        }
    }
}

/// Aggregated result handed to persistence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub num_draws: usize,
    pub seed: u64,
    pub summary: Summary,
    /// QoI at the mean parameters, if supplied
    pub reference: Option<QoiValue>,
    /// Sample mean minus reference, cell-wise
    pub deviation: Option<QoiValue>,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    reference: Option<QoiValue>,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare the sample mean against `reference`
    #[must_use]
    pub fn with_reference(mut self, reference: QoiValue) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn aggregate(&self, sample: &QoiSample) -> Result<Aggregate, ValidationError> {
        let summary = summarize(sample)?;
        let deviation = match &self.reference {
            Some(reference) => Some(deviation(&summary.mean(), reference)?),
            None => None,
        };
        Ok(Aggregate {
            num_draws: sample.len(),
            seed: sample.seed,
            summary,
            reference: self.reference,
            deviation,
        })
    }
}

/// Mean and variance of every cell.
///
/// Fails on an empty sample or when draws differ in shape.
pub fn summarize(sample: &QoiSample) -> Result<Summary, ValidationError> {
    let first = sample.values.first().ok_or(ValidationError::EmptySample)?;
    if let Some(index) = sample.values.iter().position(|v| !v.same_shape(first)) {
        return Err(ValidationError::ShapeMismatch { index });
    }

    let draws: Vec<Vec<f64>> = sample.values.iter().map(QoiValue::cells).collect();
    let cell_moments: Vec<Moments> = (0..draws[0].len())
        .map(|cell| {
            let column: Vec<f64> = draws.iter().map(|d| d[cell]).collect();
            Moments::of(&column)
        })
        .collect();

    match first {
        QoiValue::Scalar(_) => Ok(Summary::Scalar(cell_moments[0])),
        QoiValue::Table(_) => {
            let mut mean = EducationStatistics::filled(f64::NAN);
            let mut variance = EducationStatistics::filled(f64::NAN);
            for row in 0..NUM_EDU_STATS {
                for col in 0..NUM_GROUPS {
                    let m = cell_moments[row * NUM_GROUPS + col];
                    mean.cells[row][col] = m.mean;
                    variance.cells[row][col] = m.variance;
                }
            }
            Ok(Summary::Table { mean, variance })
        }
    }
}

fn deviation(mean: &QoiValue, reference: &QoiValue) -> Result<QoiValue, ValidationError> {
    match (mean, reference) {
        (QoiValue::Scalar(m), QoiValue::Scalar(r)) => Ok(QoiValue::Scalar(m - r)),
        (QoiValue::Table(m), QoiValue::Table(r)) => Ok(QoiValue::Table(m.difference(r))),
        _ => Err(ValidationError::ReferenceShapeMismatch),
    }
}

/// Running mean after each draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConvergencePoint {
    pub num_draws: usize,
    pub mean: f64,
    /// `|mean - reference|`
    pub abs_deviation: Option<f64>,
}

/// Running mean of a scalar sample, one point per prefix
#[must_use]
pub fn convergence_series(values: &[f64], reference: Option<f64>) -> Vec<ConvergencePoint> {
    let mut sum = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            sum += v;
            let mean = sum / (i + 1) as f64;
            ConvergencePoint {
                num_draws: i + 1,
                mean,
                abs_deviation: reference.map(|r| (mean - r).abs()),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over the finite values.
///
/// Empty when `bins` is zero or no value is finite. A sample with a single
/// distinct value gets one bin.
#[must_use]
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if bins == 0 || finite.is_empty() {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0; bins];
    for v in &finite {
        let bin = (((v - min) / width) as usize).min(bins - 1);
        counts[bin] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};
    use rand_distr::{Distribution, Normal};

    use super::*;
    use crate::model::{EduStat, Group};

    fn scalar_sample(values: &[f64]) -> QoiSample {
        QoiSample::new(0, values.iter().map(|v| QoiValue::Scalar(*v)).collect())
    }

    #[test]
    fn test_scalar_moments() {
        let summary = summarize(&scalar_sample(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        assert_eq!(
            summary,
            Summary::Scalar(Moments {
                mean: 2.5,
                variance: 1.25
            })
        );
    }

    #[test]
    fn test_moments_converge_to_normal() {
        let (mu, sigma) = (2.0, 3.0);
        let normal = Normal::new(mu, sigma).unwrap();
        for seed in 0..5 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let values: Vec<f64> = (0..100_000).map(|_| normal.sample(&mut rng)).collect();
            let Summary::Scalar(m) = summarize(&scalar_sample(&values)).unwrap() else {
                panic!("expected a scalar summary");
            };
            // standard errors are about 0.0095 and 0.04
            assert!((m.mean - mu).abs() < 0.05, "seed {seed}: mean {}", m.mean);
            assert!(
                (m.variance - sigma * sigma).abs() < 0.25,
                "seed {seed}: variance {}",
                m.variance
            );
        }
    }

    #[test]
    fn test_table_cells_independent() {
        let mut a = EducationStatistics::filled(0.0);
        let mut b = EducationStatistics::filled(0.0);
        a.cells[2][1] = 10.0;
        b.cells[2][1] = 14.0;
        a.cells[3][4] = f64::NAN;
        b.cells[3][4] = f64::NAN;
        let sample = QoiSample::new(0, vec![QoiValue::Table(a), QoiValue::Table(b)]);

        let Summary::Table { mean, variance } = summarize(&sample).unwrap() else {
            panic!("expected a table summary");
        };
        assert_eq!(mean.get(EduStat::MeanSchooling, Group::Type(0)), Some(12.0));
        assert_eq!(variance.get(EduStat::MeanSchooling, Group::Type(0)), Some(4.0));
        assert_eq!(mean.get(EduStat::HighSchool, Group::AllTypes), Some(0.0));
        assert!(mean.get(EduStat::MeanCollegeYears, Group::Type(3)).unwrap().is_nan());
    }

    #[test]
    fn test_shape_mismatch() {
        let sample = QoiSample::new(
            0,
            vec![
                QoiValue::Scalar(1.0),
                QoiValue::Scalar(2.0),
                QoiValue::Table(EducationStatistics::filled(0.0)),
            ],
        );
        assert_eq!(
            summarize(&sample),
            Err(ValidationError::ShapeMismatch { index: 2 })
        );
    }

    #[test]
    fn test_empty_sample() {
        assert_eq!(
            summarize(&QoiSample::default()),
            Err(ValidationError::EmptySample)
        );
    }

    #[test]
    fn test_reference_deviation() {
        let aggregate = Aggregator::new()
            .with_reference(QoiValue::Scalar(1.0))
            .aggregate(&scalar_sample(&[1.0, 2.0, 3.0]))
            .unwrap();
        assert_eq!(aggregate.num_draws, 3);
        assert_eq!(aggregate.deviation, Some(QoiValue::Scalar(1.0)));

        let err = Aggregator::new()
            .with_reference(QoiValue::Table(EducationStatistics::filled(0.0)))
            .aggregate(&scalar_sample(&[1.0]))
            .unwrap_err();
        assert_eq!(err, ValidationError::ReferenceShapeMismatch);
    }

    #[test]
    fn test_convergence_series() {
        let series = convergence_series(&[2.0, 4.0, 6.0], Some(3.0));
        let means: Vec<f64> = series.iter().map(|p| p.mean).collect();
        assert_eq!(means, vec![2.0, 3.0, 4.0]);
        assert_eq!(series[0].abs_deviation, Some(1.0));
        assert_eq!(series[2].num_draws, 3);
        assert!(convergence_series(&[], None).is_empty());
    }

    #[test]
    fn test_histogram() {
        let bins = histogram(&[0.0, 0.5, 1.0, 1.5, 2.0, f64::NAN], 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].count, 3);
        assert_eq!(bins[1].upper, 2.0);

        let single = histogram(&[4.0, 4.0], 10);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].count, 2);

        assert!(histogram(&[1.0], 0).is_empty());
    }
}
