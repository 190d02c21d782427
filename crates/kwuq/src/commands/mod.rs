//! Subcommand implementations
//!
//! Each command takes an already loaded [`UqConfig`](kwuq_core::UqConfig),
//! writes its results into a run directory and returns them for printing.

mod propagate;
mod replicate;
mod transform;

pub use propagate::{PropagateOptions, run_propagate};
pub use replicate::run_replicate;
pub use transform::run_transform;
