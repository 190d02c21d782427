//! Schooling outcomes by type (KW97 Table 14).

use crate::error::SimulationError;
use crate::model::{AgentPeriod, EducationStatistics, NUM_GROUPS, SimulatedPanel};

const HIGH_SCHOOL_YEARS: u16 = 12;
const COLLEGE_YEARS: u16 = 16;

#[derive(Debug, Clone, Copy, Default)]
struct GroupTally {
    members: u32,
    high_school: u32,
    college: u32,
    schooling: f64,
    college_years: f64,
}

impl GroupTally {
    fn add(&mut self, record: &AgentPeriod) {
        let edu = record.edu_experience;
        self.members += 1;
        if edu >= HIGH_SCHOOL_YEARS {
            self.high_school += 1;
        }
        if edu >= COLLEGE_YEARS {
            self.college += 1;
        }
        self.schooling += f64::from(edu);
        if edu > HIGH_SCHOOL_YEARS {
            self.college_years += f64::from(edu - HIGH_SCHOOL_YEARS);
        }
    }

    /// Ratios over the group size; an empty group yields NaN in every row
    fn ratios(&self) -> [f64; 4] {
        let n = f64::from(self.members);
        [
            f64::from(self.high_school) / n,
            f64::from(self.college) / n,
            self.schooling / n,
            self.college_years / n,
        ]
    }
}

/// Education statistics over the final simulated period.
///
/// Columns are all types followed by types 0..=3. Agents with a type label
/// outside that range only count toward the all-types column.
pub fn education_statistics(
    panel: &SimulatedPanel,
) -> Result<EducationStatistics, SimulationError> {
    let final_period = panel
        .final_period()
        .ok_or(SimulationError::MalformedPanel("panel has no records"))?;

    let mut tallies = [GroupTally::default(); NUM_GROUPS];
    for record in panel.period(final_period) {
        tallies[0].add(record);
        let column = 1 + record.agent_type as usize;
        if column < NUM_GROUPS {
            tallies[column].add(record);
        }
    }

    let mut stats = EducationStatistics::filled(f64::NAN);
    for (column, tally) in tallies.iter().enumerate() {
        for (row, value) in tally.ratios().into_iter().enumerate() {
            stats.cells[row][column] = value;
        }
    }
    Ok(stats)
}

/// Mean schooling over the final simulated period
pub fn mean_final_education(panel: &SimulatedPanel) -> Result<f64, SimulationError> {
    let final_period = panel
        .final_period()
        .ok_or(SimulationError::MalformedPanel("panel has no records"))?;
    let (sum, count) = panel
        .period(final_period)
        .fold((0.0, 0u32), |(sum, count), r| {
            (sum + f64::from(r.edu_experience), count + 1)
        });
    Ok(sum / f64::from(count))
}
