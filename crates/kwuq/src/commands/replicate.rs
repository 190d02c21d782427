use std::fs;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use jiff::Timestamp;
use kwuq_core::UqConfig;
use kwuq_core::transform::transform;
use kwuq_core::wrapper::ReplicationReport;

use crate::io::{write_json, write_yaml};
use crate::manifest::{MANIFEST_FILE, RunManifest};

/// Baseline and policy outcomes at the mean parameters, written to `run_dir/report.json`
pub fn run_replicate(
    config: &UqConfig,
    run_dir: &Path,
    created: Timestamp,
) -> Result<ReplicationReport> {
    let params = transform(&config.mean()?, &config.fixed);
    let report = config.wrapper().replicate(&params)?;

    fs::create_dir_all(run_dir)
        .wrap_err_with(|| format!("creating {}", run_dir.display()))?;
    write_yaml(
        &run_dir.join(MANIFEST_FILE),
        &RunManifest::new("replicate", created, config),
    )?;
    write_json(&run_dir.join("report.json"), &report)?;

    tracing::info!(run_dir = %run_dir.display(), "Replication report written");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::kw94_one_config;
    use tempfile::tempdir;

    #[test]
    fn test_report_written() {
        let dir = tempdir().unwrap();
        let created: Timestamp = "2026-01-02T03:04:05Z".parse().unwrap();

        let report = run_replicate(&kw94_one_config(), dir.path(), created).unwrap();
        assert_eq!(
            report.policy_impact,
            report
                .policy_education
                .difference(&report.baseline_education)
        );

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
                .unwrap();
        assert_eq!(json["baseline_education"]["cells"].as_array().unwrap().len(), 4);
        assert!(json["policy_variance_ratio"].is_number());
    }
}
