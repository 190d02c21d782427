//! Core data types: parameter vectors, simulated panels and QoI samples.

mod covariance;
mod panel;
mod params;
mod results;

pub use covariance::*;
pub use panel::*;
pub use params::*;
pub use results::*;
