//! Seam to the external dynamic-programming simulator.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::model::{SimulatedPanel, SimulatorParams};

/// Settings handed to every simulator call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of simulated agents
    pub num_agents: u32,
    /// Number of simulated periods
    pub num_periods: u16,
    /// Seed of the simulator's own shocks.
    ///
    /// Baseline and policy runs share it so their difference only reflects
    /// the policy.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_agents: 1000,
            num_periods: 40,
            seed: 132,
        }
    }
}

/// A simulator of agent panels.
///
/// Implementations must be deterministic for a given `(params, config)` and
/// safe to call from several threads at once.
pub trait Simulator: Sync {
    fn simulate(
        &self,
        params: &SimulatorParams,
        config: &SimulationConfig,
    ) -> Result<SimulatedPanel, SimulationError>;
}

impl<F> Simulator for F
where
    F: Fn(&SimulatorParams, &SimulationConfig) -> Result<SimulatedPanel, SimulationError> + Sync,
{
    fn simulate(
        &self,
        params: &SimulatorParams,
        config: &SimulationConfig,
    ) -> Result<SimulatedPanel, SimulationError> {
        self(params, config)
    }
}
