//! Integration tests for the propagation pipeline
//!
//! Tests are organized by topic:
//! - `pipeline` - Config to aggregate, end to end on the stand-in simulator
//! - `reproducibility` - Seeding, prefix stability and worker-count independence


use crate::config::{ParameterEntry, UqConfig};
use crate::model::PublishedParam;

/// KW94 Table 4.1 data set one, with illustrative standard errors
pub(crate) fn kw94_one_config() -> UqConfig {
    let rows = [
        (PublishedParam::Alpha10, 9.21, 0.01),
        (PublishedParam::Alpha11, 0.038, 0.001),
        (PublishedParam::Alpha12, 0.033, 0.001),
        (PublishedParam::Alpha13, -0.0005, 0.0001),
        (PublishedParam::Alpha14, 0.0, 0.0),
        (PublishedParam::Alpha15, 0.0, 0.0),
        (PublishedParam::Alpha20, 8.48, 0.01),
        (PublishedParam::Alpha21, 0.07, 0.001),
        (PublishedParam::Alpha22, 0.067, 0.001),
        (PublishedParam::Alpha23, -0.001, 0.0001),
        (PublishedParam::Alpha24, 0.022, 0.001),
        (PublishedParam::Alpha25, -0.0005, 0.0001),
        (PublishedParam::Beta0, 0.0, 0.0),
        (PublishedParam::Beta1, 4000.0, 200.0),
        (PublishedParam::Beta2, 15000.0, 500.0),
        (PublishedParam::Gamma0, 14500.0, 300.0),
        (PublishedParam::A11, 0.2, 0.005),
        (PublishedParam::A21, 0.0, 0.0),
        (PublishedParam::A22, 0.25, 0.005),
        (PublishedParam::A31, 0.0, 0.0),
        (PublishedParam::A32, 0.0, 0.0),
        (PublishedParam::A33, 1500.0, 50.0),
        (PublishedParam::A41, 0.0, 0.0),
        (PublishedParam::A42, 0.0, 0.0),
        (PublishedParam::A43, 0.0, 0.0),
        (PublishedParam::A44, 1500.0, 50.0),
    ];
    let mut config = UqConfig::new(
        rows.iter()
            .map(|&(name, mean, sd)| ParameterEntry { name, mean, sd })
            .collect(),
    );
    config.simulation.num_agents = 40;
    config.simulation.num_periods = 12;
    config.propagation.num_draws = 8;
    config.propagation.seed = 2024;
    config
}
