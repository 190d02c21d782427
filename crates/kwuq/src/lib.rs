//! Command-line front end for parameter-uncertainty studies
//!
//! Loads a YAML run configuration, drives the propagation library and
//! writes every result into a timestamped run directory under the data
//! directory (`~/.kwuq/` by default).

pub mod commands;
pub mod io;
pub mod logging;
pub mod manifest;

pub use logging::init_logging;
