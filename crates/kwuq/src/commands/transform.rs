use std::path::Path;

use color_eyre::eyre::Result;
use kwuq_core::UqConfig;
use kwuq_core::model::SimulatorParams;
use kwuq_core::transform::transform;

use crate::io::write_json;

/// Transform the mean parameters to simulator notation, writing them to `output` if given
pub fn run_transform(config: &UqConfig, output: Option<&Path>) -> Result<SimulatorParams> {
    let params = transform(&config.mean()?, &config.fixed);
    if let Some(path) = output {
        write_json(path, &params)?;
        tracing::info!(path = %path.display(), "Wrote simulator parameters");
    }
    Ok(params)
}
