//! Parameter-uncertainty propagation for discrete-choice life-cycle models
//!
//! This crate quantifies how uncertainty in the estimated parameters of the
//! Keane & Wolpin (1994, 1997) occupational-choice model carries over into
//! model-derived quantities of interest. It provides:
//! - A transform from the published parameter notation to the simulator's
//! - Quantities of interest over simulated panels (education statistics by
//!   type, between-type share of lifetime-utility variance)
//! - A policy wrapper differencing a baseline and a perturbed simulation
//! - A seeded, prefix-stable Monte Carlo propagator with an optional worker pool
//! - Aggregation of the resulting sample (moments, convergence, histograms)
//!
//! # Example
//!
//! ```ignore
//! use kwuq_core::{Aggregator, UqConfig};
//!
//! let config: UqConfig = load_config()?;
//! let propagator = config.propagator()?;
//! let sample = propagator.run()?;
//! let aggregate = Aggregator::new()
//!     .with_reference(propagator.evaluate_mean()?)
//!     .aggregate(&sample)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod aggregate;
pub mod error;
pub mod propagation;
pub mod qoi;
pub mod sampling;
pub mod simulation;
pub mod simulators;
pub mod transform;
pub mod wrapper;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use aggregate::{Aggregate, Aggregator, Summary};
pub use config::UqConfig;
pub use error::{Result, UqError};
pub use propagation::{MonteCarloPropagator, PropagationConfig};
pub use simulation::{SimulationConfig, Simulator};
pub use transform::{FixedParams, transform};
pub use wrapper::{ModelWrapper, Policy};
