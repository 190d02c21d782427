//! File helpers for configs and run outputs

use std::fs;
use std::io;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, eyre};
use kwuq_core::UqConfig;
use serde::Serialize;

/// Write `content` next to `path` first, then rename over it
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);
    fs::write(temp_path, content)?;
    fs::rename(temp_path, path)?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, &json).wrap_err_with(|| format!("writing {}", path.display()))
}

pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let yaml = serde_saphyr::to_string(value)
        .map_err(|e| eyre!("serializing {}: {e}", path.display()))?;
    atomic_write(path, &yaml).wrap_err_with(|| format!("writing {}", path.display()))
}

/// Load a run configuration from YAML
pub fn load_config(path: &Path) -> Result<UqConfig> {
    let yaml =
        fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    let config: UqConfig = serde_saphyr::from_str(&yaml)
        .map_err(|e| eyre!("parsing {}: {e}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        parameters = config.parameters.len(),
        "Loaded configuration"
    );
    Ok(config)
}
