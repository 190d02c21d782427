use std::fmt;

use crate::model::{PublishedParam, SimulatorParam};

/// Errors raised for malformed or wrong-length inputs
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    WrongLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    UnknownParameter(String),
    DuplicateParameter(String),
    MissingParameter(PublishedParam),
    NonFinite {
        what: &'static str,
        index: usize,
        value: f64,
    },
    NotSymmetric {
        row: PublishedParam,
        col: PublishedParam,
    },
    NegativeVariance {
        param: PublishedParam,
        value: f64,
    },
    NotPositiveSemiDefinite {
        min_eigenvalue: f64,
    },
    ShapeMismatch {
        index: usize,
    },
    ReferenceShapeMismatch,
    EmptySample,
    Config(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::WrongLength {
                what,
                expected,
                actual,
            } => write!(f, "{what} must have {expected} entries, got {actual}"),
            ValidationError::UnknownParameter(name) => write!(f, "unknown parameter '{name}'"),
            ValidationError::DuplicateParameter(name) => {
                write!(f, "parameter '{name}' given more than once")
            }
            ValidationError::MissingParameter(param) => {
                write!(f, "parameter '{}' is missing", param.name())
            }
            ValidationError::NonFinite { what, index, value } => {
                write!(f, "{what} entry {index} is not finite ({value})")
            }
            ValidationError::NotSymmetric { row, col } => write!(
                f,
                "covariance entries ({}, {}) and ({}, {}) differ",
                row.name(),
                col.name(),
                col.name(),
                row.name()
            ),
            ValidationError::NegativeVariance { param, value } => {
                write!(f, "variance of '{}' is negative ({value})", param.name())
            }
            ValidationError::NotPositiveSemiDefinite { min_eigenvalue } => write!(
                f,
                "covariance matrix is not positive semi-definite (min eigenvalue {min_eigenvalue})"
            ),
            ValidationError::ShapeMismatch { index } => {
                write!(f, "draw {index} has a different shape than draw 0")
            }
            ValidationError::ReferenceShapeMismatch => {
                write!(f, "reference value has a different shape than the sample")
            }
            ValidationError::EmptySample => write!(f, "sample contains no draws"),
            ValidationError::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A computed statistic broke one of its mathematical invariants
#[derive(Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    WeightsDoNotSumToOne { sum: f64 },
    RatioAboveOne { ratio: f64 },
    TotalVarianceMismatch {
        within: f64,
        between: f64,
        total: f64,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::WeightsDoNotSumToOne { sum } => {
                write!(f, "type weights sum to {sum}, expected 1")
            }
            InvariantViolation::RatioAboveOne { ratio } => {
                write!(f, "between-type variance ratio {ratio} exceeds 1")
            }
            InvariantViolation::TotalVarianceMismatch {
                within,
                between,
                total,
            } => write!(
                f,
                "law of total variance violated: within {within} + between {between} != total {total}"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Failures of the external simulator collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// The simulator refused or failed to run
    Failed(String),
    /// The simulator returned a panel the extractors cannot use
    MalformedPanel(&'static str),
    /// A parameter value the simulator cannot work with
    InvalidParameter { param: SimulatorParam, value: f64 },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Failed(msg) => write!(f, "simulation failed: {msg}"),
            SimulationError::MalformedPanel(reason) => {
                write!(f, "simulator returned a malformed panel: {reason}")
            }
            SimulationError::InvalidParameter { param, value } => write!(
                f,
                "simulator cannot use {}.{} = {value}",
                param.category(),
                param.name()
            ),
        }
    }
}

impl std::error::Error for SimulationError {}

/// Top-level error for the uncertainty-quantification pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum UqError {
    Validation(ValidationError),
    Invariant(InvariantViolation),
    Simulation(SimulationError),
}

impl fmt::Display for UqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UqError::Validation(e) => write!(f, "validation error: {e}"),
            UqError::Invariant(e) => write!(f, "invariant violation: {e}"),
            UqError::Simulation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for UqError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UqError::Validation(e) => Some(e),
            UqError::Invariant(e) => Some(e),
            UqError::Simulation(e) => Some(e),
        }
    }
}

impl From<ValidationError> for UqError {
    fn from(err: ValidationError) -> Self {
        UqError::Validation(err)
    }
}

impl From<InvariantViolation> for UqError {
    fn from(err: InvariantViolation) -> Self {
        UqError::Invariant(err)
    }
}

impl From<SimulationError> for UqError {
    fn from(err: SimulationError) -> Self {
        UqError::Simulation(err)
    }
}

pub type Result<T> = std::result::Result<T, UqError>;
