//! Record of what produced a run directory

use std::path::{Path, PathBuf};

use jiff::Timestamp;
use kwuq_core::UqConfig;
use serde::Serialize;

pub const MANIFEST_FILE: &str = "manifest.yaml";

#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub command: String,
    pub created: Timestamp,
    pub crate_version: String,
    pub config: UqConfig,
}

impl RunManifest {
    #[must_use]
    pub fn new(command: &str, created: Timestamp, config: &UqConfig) -> Self {
        Self {
            command: command.to_string(),
            created,
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            config: config.clone(),
        }
    }
}

/// `{data_dir}/runs/{command}-{YYYYmmddTHHMMSSZ}`
#[must_use]
pub fn default_run_dir(data_dir: &Path, command: &str, created: Timestamp) -> PathBuf {
    data_dir
        .join("runs")
        .join(format!("{command}-{}", created.strftime("%Y%m%dT%H%M%SZ")))
}
