use std::fs;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use jiff::Timestamp;
use kwuq_core::aggregate::{Aggregate, Aggregator, convergence_series, histogram};
use kwuq_core::model::SimulatorParams;
use kwuq_core::UqConfig;

use crate::io::{write_json, write_yaml};
use crate::manifest::{MANIFEST_FILE, RunManifest};

/// Command-line overrides of the configured propagation settings
#[derive(Debug, Clone, Default)]
pub struct PropagateOptions {
    pub draws: Option<usize>,
    pub seed: Option<u64>,
    pub workers: Option<usize>,
    /// Histogram bins for scalar QoIs
    pub bins: usize,
    /// Also write the transformed parameters of every draw
    pub export_draws: bool,
}

/// Run the Monte Carlo study and write its outputs to `run_dir`:
/// - `manifest.yaml`: effective configuration and timestamp
/// - `sample.json`: every draw in index order
/// - `aggregate.json`: moments, reference and deviation
/// - `convergence.json`, `histogram.json`: scalar QoIs only
/// - `draws.json`: with `export_draws`
pub fn run_propagate(
    mut config: UqConfig,
    options: &PropagateOptions,
    run_dir: &Path,
    created: Timestamp,
) -> Result<Aggregate> {
    if let Some(draws) = options.draws {
        config.propagation.num_draws = draws;
    }
    if let Some(seed) = options.seed {
        config.propagation.seed = seed;
    }
    if options.workers.is_some() {
        config.propagation.workers = options.workers;
    }

    let propagator = config.propagator()?;
    let reference = propagator.evaluate_mean()?;
    let sample = propagator.run()?;
    let aggregate = Aggregator::new()
        .with_reference(reference)
        .aggregate(&sample)?;

    fs::create_dir_all(run_dir)
        .wrap_err_with(|| format!("creating {}", run_dir.display()))?;
    write_yaml(
        &run_dir.join(MANIFEST_FILE),
        &RunManifest::new("propagate", created, &config),
    )?;
    write_json(&run_dir.join("sample.json"), &sample)?;
    write_json(&run_dir.join("aggregate.json"), &aggregate)?;

    if let Some(values) = sample.scalars() {
        let series = convergence_series(&values, reference.as_scalar());
        write_json(&run_dir.join("convergence.json"), &series)?;
        write_json(&run_dir.join("histogram.json"), &histogram(&values, options.bins))?;
    }

    if options.export_draws {
        let draws: Vec<SimulatorParams> = (0..sample.len())
            .map(|i| propagator.draw_params(i))
            .collect();
        write_json(&run_dir.join("draws.json"), &draws)?;
    }

    tracing::info!(
        run_dir = %run_dir.display(),
        draws = sample.len(),
        "Propagation results written"
    );
    Ok(aggregate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::kw94_one_config;
    use kwuq_core::Summary;
    use kwuq_core::qoi::QoiKind;
    use tempfile::tempdir;

    fn created() -> Timestamp {
        "2026-01-02T03:04:05Z".parse().unwrap()
    }

    #[test]
    fn test_scalar_run_writes_all_outputs() {
        let dir = tempdir().unwrap();
        let options = PropagateOptions {
            draws: Some(4),
            seed: Some(11),
            workers: Some(2),
            bins: 5,
            export_draws: true,
        };

        let aggregate = run_propagate(kw94_one_config(), &options, dir.path(), created()).unwrap();
        assert_eq!(aggregate.num_draws, 4);
        assert_eq!(aggregate.seed, 11);
        assert!(matches!(aggregate.summary, Summary::Scalar(_)));

        for file in [
            MANIFEST_FILE,
            "sample.json",
            "aggregate.json",
            "convergence.json",
            "histogram.json",
            "draws.json",
        ] {
            assert!(dir.path().join(file).exists(), "{file} missing");
        }

        let draws: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("draws.json")).unwrap())
                .unwrap();
        assert_eq!(draws.as_array().unwrap().len(), 4);

        let manifest = fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
        assert!(manifest.contains("propagate"));
        assert!(manifest.contains("2026-01-02T03:04:05Z"));
    }

    #[test]
    fn test_table_run_skips_scalar_outputs() {
        let dir = tempdir().unwrap();
        let mut config = kw94_one_config();
        config.qoi = QoiKind::EducationTable;
        let options = PropagateOptions {
            draws: Some(2),
            bins: 5,
            ..PropagateOptions::default()
        };

        let aggregate = run_propagate(config, &options, dir.path(), created()).unwrap();
        assert!(matches!(aggregate.summary, Summary::Table { .. }));
        assert!(dir.path().join("aggregate.json").exists());
        assert!(!dir.path().join("convergence.json").exists());
        assert!(!dir.path().join("draws.json").exists());
    }

    #[test]
    fn test_invalid_config_fails_before_writing() {
        let dir = tempdir().unwrap();
        let run_dir = dir.path().join("run");
        let mut config = kw94_one_config();
        config.parameters.pop();

        assert!(run_propagate(config, &PropagateOptions::default(), &run_dir, created()).is_err());
        assert!(!run_dir.exists());
    }
}
