//! Simulators shipped with the crate.
//!
//! The dynamic-programming engine lives outside this crate and is plugged in
//! through [`Simulator`](crate::simulation::Simulator). The simulator here
//! keeps the pipeline runnable end to end without it.

mod lookahead;

pub use lookahead::{LookaheadSimulator, TypeEndowment};
