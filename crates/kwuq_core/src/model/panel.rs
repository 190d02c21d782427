//! Simulated agent panels returned by a simulator.

use serde::{Deserialize, Serialize};

/// Choices available to an agent each period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    OccupationA,
    OccupationB,
    Education,
    Home,
}

impl Choice {
    pub const COUNT: usize = 4;

    pub const ALL: [Choice; Self::COUNT] = [
        Choice::OccupationA,
        Choice::OccupationB,
        Choice::Education,
        Choice::Home,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One agent in one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPeriod {
    pub agent_id: u32,
    pub period: u16,
    /// Discrete latent type label
    pub agent_type: u8,
    pub choice: Choice,
    /// Cumulative years of schooling at the start of the period
    pub edu_experience: u16,
    /// Choice-specific value functions, indexed by `Choice::index`.
    /// NaN marks a choice that was not available.
    pub value_functions: [f64; Choice::COUNT],
}

impl AgentPeriod {
    /// Maximum over the available value functions, NaN if none is available
    #[must_use]
    pub fn max_value_function(&self) -> f64 {
        self.value_functions
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(f64::NAN, f64::max)
    }
}

/// Immutable table of simulated agent-period records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPanel {
    records: Vec<AgentPeriod>,
}

impl SimulatedPanel {
    #[must_use]
    pub fn new(records: Vec<AgentPeriod>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[AgentPeriod] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Last simulated period, `None` for an empty panel
    #[must_use]
    pub fn final_period(&self) -> Option<u16> {
        self.records.iter().map(|r| r.period).max()
    }

    /// Records belonging to one period
    pub fn period(&self, period: u16) -> impl Iterator<Item = &AgentPeriod> {
        self.records.iter().filter(move |r| r.period == period)
    }
}
