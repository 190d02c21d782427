//! Quantities of interest and their Monte Carlo samples.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of education statistics (table rows)
pub const NUM_EDU_STATS: usize = 4;
/// Number of groups (table columns): all types followed by types 0..=3
pub const NUM_GROUPS: usize = 5;
/// Number of latent types broken out in the education table
pub const NUM_TYPES: usize = NUM_GROUPS - 1;

/// Rows of the education table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EduStat {
    /// Fraction with at least 12 years of schooling
    HighSchool,
    /// Fraction with at least 16 years of schooling
    College,
    /// Mean years of schooling
    MeanSchooling,
    /// Years of schooling beyond 12, per group member
    MeanCollegeYears,
}

impl EduStat {
    pub const ALL: [EduStat; NUM_EDU_STATS] = [
        EduStat::HighSchool,
        EduStat::College,
        EduStat::MeanSchooling,
        EduStat::MeanCollegeYears,
    ];

    #[must_use]
    pub fn row(self) -> usize {
        self as usize
    }
}

/// Columns of the education table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    AllTypes,
    Type(u8),
}

impl Group {
    /// Table column, `None` for a type beyond `NUM_TYPES`
    #[must_use]
    pub fn column(self) -> Option<usize> {
        match self {
            Group::AllTypes => Some(0),
            Group::Type(t) if usize::from(t) < NUM_TYPES => Some(1 + usize::from(t)),
            Group::Type(_) => None,
        }
    }
}

/// 4 statistics by 5 groups, the content of KW97 Table 14.
///
/// Empty groups hold NaN, written as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EducationStatistics {
    #[serde(with = "nullable_cells")]
    pub cells: [[f64; NUM_GROUPS]; NUM_EDU_STATS],
}

impl EducationStatistics {
    #[must_use]
    pub fn filled(value: f64) -> Self {
        Self {
            cells: [[value; NUM_GROUPS]; NUM_EDU_STATS],
        }
    }

    #[must_use]
    pub fn get(&self, stat: EduStat, group: Group) -> Option<f64> {
        group.column().map(|column| self.cells[stat.row()][column])
    }

    /// The "all types" column, the reduced QoI used inside Monte Carlo loops
    #[must_use]
    pub fn all_types(&self) -> [f64; NUM_EDU_STATS] {
        self.cells.map(|row| row[0])
    }

    /// Cell-wise `self - other`
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let mut cells = self.cells;
        for (row, other_row) in cells.iter_mut().zip(other.cells.iter()) {
            for (cell, other_cell) in row.iter_mut().zip(other_row.iter()) {
                *cell -= other_cell;
            }
        }
        Self { cells }
    }
}

/// Value of a quantity of interest for one model evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QoiValue {
    Scalar(#[serde(with = "nullable")] f64),
    Table(EducationStatistics),
}

impl QoiValue {
    /// Flattened cells, one entry for scalars, row-major for tables
    #[must_use]
    pub fn cells(&self) -> Vec<f64> {
        match self {
            QoiValue::Scalar(v) => vec![*v],
            QoiValue::Table(t) => t.cells.iter().flatten().copied().collect(),
        }
    }

    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (QoiValue::Scalar(_), QoiValue::Scalar(_)) | (QoiValue::Table(_), QoiValue::Table(_))
        )
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            QoiValue::Scalar(v) => Some(*v),
            QoiValue::Table(_) => None,
        }
    }
}

/// Ordered QoI draws; entry `i` belongs to draw `i`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QoiSample {
    /// Base seed the draws were derived from
    pub seed: u64,
    pub values: Vec<QoiValue>,
}

impl QoiSample {
    #[must_use]
    pub fn new(seed: u64, values: Vec<QoiValue>) -> Self {
        Self { seed, values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Scalar draws, `None` if any draw is a table
    #[must_use]
    pub fn scalars(&self) -> Option<Vec<f64>> {
        self.values.iter().map(QoiValue::as_scalar).collect()
    }
}

/// NaN as `null`, so undefined statistics survive formats without NaN
mod nullable {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

mod nullable_cells {
    use super::*;

    type Cells = [[f64; NUM_GROUPS]; NUM_EDU_STATS];

    pub fn serialize<S: Serializer>(cells: &Cells, serializer: S) -> Result<S::Ok, S::Error> {
        cells
            .map(|row| row.map(|cell| (!cell.is_nan()).then_some(cell)))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cells, D::Error> {
        let cells = <[[Option<f64>; NUM_GROUPS]; NUM_EDU_STATS]>::deserialize(deserializer)?;
        Ok(cells.map(|row| row.map(|cell| cell.unwrap_or(f64::NAN))))
    }
}
