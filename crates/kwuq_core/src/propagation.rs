//! Monte Carlo propagation of parameter uncertainty.
//!
//! Draw `i` is generated from its own generator seeded with `seed + i`
//! (wrapping), so a sample of `N` draws is a prefix of any longer sample
//! with the same seed, and the result does not depend on how draws are
//! spread across workers.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{CovarianceMatrix, PublishedParams, QoiSample, QoiValue, SimulatorParams};
use crate::sampling::MvNormal;
use crate::simulation::Simulator;
use crate::transform::{FixedParams, transform};
use crate::wrapper::ModelWrapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Number of parameter draws
    pub num_draws: usize,
    /// Base seed; draw `i` uses `seed + i`
    pub seed: u64,
    /// Worker threads, `None` or `Some(0)` for one per core
    pub workers: Option<usize>,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            num_draws: 100,
            seed: 0,
            workers: None,
        }
    }
}

pub struct MonteCarloPropagator<S> {
    mean: PublishedParams,
    distribution: MvNormal,
    fixed: FixedParams,
    wrapper: ModelWrapper<S>,
    config: PropagationConfig,
}

impl<S: Simulator> MonteCarloPropagator<S> {
    /// Fails if the covariance is not positive semi-definite or the mean is not finite
    pub fn new(
        mean: PublishedParams,
        cov: CovarianceMatrix,
        fixed: FixedParams,
        wrapper: ModelWrapper<S>,
        config: PropagationConfig,
    ) -> Result<Self> {
        let distribution = MvNormal::new(&mean, &cov)?;
        Ok(Self {
            mean,
            distribution,
            fixed,
            wrapper,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    #[must_use]
    pub fn wrapper(&self) -> &ModelWrapper<S> {
        &self.wrapper
    }

    #[must_use]
    pub fn draw_seed(&self, index: usize) -> u64 {
        self.config.seed.wrapping_add(index as u64)
    }

    /// Parameter draw `index` in published notation
    #[must_use]
    pub fn draw(&self, index: usize) -> PublishedParams {
        self.distribution.sample_seeded(self.draw_seed(index))
    }

    /// Parameter draw `index` in simulator notation
    #[must_use]
    pub fn draw_params(&self, index: usize) -> SimulatorParams {
        transform(&self.draw(index), &self.fixed)
    }

    pub fn evaluate_draw(&self, index: usize) -> Result<QoiValue> {
        let params = self.draw_params(index);
        let value = self.wrapper.evaluate(&params);
        match &value {
            Ok(_) => tracing::debug!(draw = index, seed = self.draw_seed(index), "Draw evaluated"),
            Err(e) => tracing::warn!(draw = index, error = %e, "Draw failed, aborting run"),
        }
        value
    }

    /// QoI at the mean parameters, the reference for the aggregated sample
    pub fn evaluate_mean(&self) -> Result<QoiValue> {
        self.wrapper.evaluate(&transform(&self.mean, &self.fixed))
    }

    /// Evaluate every draw in index order on the calling thread
    pub fn run_sequential(&self) -> Result<QoiSample> {
        tracing::info!(
            draws = self.config.num_draws,
            seed = self.config.seed,
            "Starting sequential propagation"
        );
        let values = (0..self.config.num_draws)
            .map(|i| self.evaluate_draw(i))
            .collect::<Result<Vec<_>>>()?;
        tracing::info!(draws = values.len(), "Propagation finished");
        Ok(QoiSample::new(self.config.seed, values))
    }

    /// Evaluate every draw on a pool of `workers` threads.
    ///
    /// Results are ordered by draw index. The first failing draw aborts the run.
    #[cfg(feature = "parallel")]
    pub fn run(&self) -> Result<QoiSample> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(workers) = self.config.workers {
            builder = builder.num_threads(workers);
        }
        let pool = builder.build().map_err(|e| {
            crate::error::SimulationError::Failed(format!("could not start worker pool: {e}"))
        })?;

        tracing::info!(
            draws = self.config.num_draws,
            seed = self.config.seed,
            workers = pool.current_num_threads(),
            "Starting parallel propagation"
        );
        let values = pool.install(|| {
            (0..self.config.num_draws)
                .into_par_iter()
                .map(|i| self.evaluate_draw(i))
                .collect::<Result<Vec<_>>>()
        })?;
        tracing::info!(draws = values.len(), "Propagation finished");
        Ok(QoiSample::new(self.config.seed, values))
    }

    #[cfg(not(feature = "parallel"))]
    pub fn run(&self) -> Result<QoiSample> {
        self.run_sequential()
    }
}
