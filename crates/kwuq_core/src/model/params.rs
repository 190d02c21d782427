//! Typed parameter vectors.
//!
//! Two notations are in play:
//! - the published notation of Keane & Wolpin (1994), Table 4.1, with 26
//!   coefficients including the lower-triangular Cholesky factor of the shock
//!   covariance, and
//! - the simulator notation, 32 `(category, name)` coefficients where the
//!   shock block is given as standard deviations and correlations.
//!
//! Both are closed enums mapping each coefficient to a slot, so lookups are
//! checked at compile time instead of going through string pairs.

use std::collections::HashSet;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::ValidationError;

/// Coefficients of the published (KW94 Table 4.1) notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishedParam {
    Alpha10,
    Alpha11,
    Alpha12,
    Alpha13,
    Alpha14,
    Alpha15,
    Alpha20,
    Alpha21,
    Alpha22,
    Alpha23,
    Alpha24,
    Alpha25,
    Beta0,
    Beta1,
    Beta2,
    Gamma0,
    A11,
    A21,
    A22,
    A31,
    A32,
    A33,
    A41,
    A42,
    A43,
    A44,
}

impl PublishedParam {
    pub const COUNT: usize = 26;

    /// All coefficients in table order
    pub const ALL: [PublishedParam; Self::COUNT] = [
        PublishedParam::Alpha10,
        PublishedParam::Alpha11,
        PublishedParam::Alpha12,
        PublishedParam::Alpha13,
        PublishedParam::Alpha14,
        PublishedParam::Alpha15,
        PublishedParam::Alpha20,
        PublishedParam::Alpha21,
        PublishedParam::Alpha22,
        PublishedParam::Alpha23,
        PublishedParam::Alpha24,
        PublishedParam::Alpha25,
        PublishedParam::Beta0,
        PublishedParam::Beta1,
        PublishedParam::Beta2,
        PublishedParam::Gamma0,
        PublishedParam::A11,
        PublishedParam::A21,
        PublishedParam::A22,
        PublishedParam::A31,
        PublishedParam::A32,
        PublishedParam::A33,
        PublishedParam::A41,
        PublishedParam::A42,
        PublishedParam::A43,
        PublishedParam::A44,
    ];

    /// Slot of this coefficient in table order
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PublishedParam::Alpha10 => "alpha10",
            PublishedParam::Alpha11 => "alpha11",
            PublishedParam::Alpha12 => "alpha12",
            PublishedParam::Alpha13 => "alpha13",
            PublishedParam::Alpha14 => "alpha14",
            PublishedParam::Alpha15 => "alpha15",
            PublishedParam::Alpha20 => "alpha20",
            PublishedParam::Alpha21 => "alpha21",
            PublishedParam::Alpha22 => "alpha22",
            PublishedParam::Alpha23 => "alpha23",
            PublishedParam::Alpha24 => "alpha24",
            PublishedParam::Alpha25 => "alpha25",
            PublishedParam::Beta0 => "beta0",
            PublishedParam::Beta1 => "beta1",
            PublishedParam::Beta2 => "beta2",
            PublishedParam::Gamma0 => "gamma0",
            PublishedParam::A11 => "a11",
            PublishedParam::A21 => "a21",
            PublishedParam::A22 => "a22",
            PublishedParam::A31 => "a31",
            PublishedParam::A32 => "a32",
            PublishedParam::A33 => "a33",
            PublishedParam::A41 => "a41",
            PublishedParam::A42 => "a42",
            PublishedParam::A43 => "a43",
            PublishedParam::A44 => "a44",
        }
    }

    /// Look a coefficient up by its published name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Cholesky-factor position `(row, col)` for the `a` entries
    #[must_use]
    pub fn cholesky_position(self) -> Option<(usize, usize)> {
        match self {
            PublishedParam::A11 => Some((0, 0)),
            PublishedParam::A21 => Some((1, 0)),
            PublishedParam::A22 => Some((1, 1)),
            PublishedParam::A31 => Some((2, 0)),
            PublishedParam::A32 => Some((2, 1)),
            PublishedParam::A33 => Some((2, 2)),
            PublishedParam::A41 => Some((3, 0)),
            PublishedParam::A42 => Some((3, 1)),
            PublishedParam::A43 => Some((3, 2)),
            PublishedParam::A44 => Some((3, 3)),
            _ => None,
        }
    }
}

/// A complete parameter vector in published notation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublishedParams {
    values: [f64; PublishedParam::COUNT],
}

impl PublishedParams {
    pub(crate) fn from_array(values: [f64; PublishedParam::COUNT]) -> Self {
        Self { values }
    }

    /// Build from values in table order. Fails unless exactly 26 values are given.
    pub fn from_values(values: &[f64]) -> Result<Self, ValidationError> {
        let values: [f64; PublishedParam::COUNT] =
            values
                .try_into()
                .map_err(|_| ValidationError::WrongLength {
                    what: "published parameter vector",
                    expected: PublishedParam::COUNT,
                    actual: values.len(),
                })?;
        Ok(Self { values })
    }

    /// Build from `(name, value)` pairs in any order.
    ///
    /// Every published name must appear exactly once.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut values = [f64::NAN; PublishedParam::COUNT];
        let mut seen = HashSet::new();
        for (name, value) in pairs {
            let param = PublishedParam::from_name(name)
                .ok_or_else(|| ValidationError::UnknownParameter(name.to_string()))?;
            if !seen.insert(param) {
                return Err(ValidationError::DuplicateParameter(name.to_string()));
            }
            values[param.index()] = value;
        }
        if let Some(missing) = PublishedParam::ALL.iter().find(|p| !seen.contains(p)) {
            return Err(ValidationError::MissingParameter(*missing));
        }
        Ok(Self { values })
    }

    #[must_use]
    pub fn values(&self) -> &[f64; PublishedParam::COUNT] {
        &self.values
    }

    /// Copy of this vector with one coefficient replaced
    #[must_use]
    pub fn with(mut self, param: PublishedParam, value: f64) -> Self {
        self.values[param.index()] = value;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (PublishedParam, f64)> + '_ {
        PublishedParam::ALL
            .iter()
            .map(move |p| (*p, self.values[p.index()]))
    }
}

impl Index<PublishedParam> for PublishedParams {
    type Output = f64;

    fn index(&self, param: PublishedParam) -> &f64 {
        &self.values[param.index()]
    }
}

impl Serialize for PublishedParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(PublishedParam::COUNT))?;
        for (param, value) in self.iter() {
            map.serialize_entry(param.name(), &value)?;
        }
        map.end()
    }
}

/// Coefficients of the simulator notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SimulatorParam {
    Delta,
    WageAConstant,
    WageAExpEdu,
    WageAExpA,
    WageAExpASquare,
    WageAExpB,
    WageAExpBSquare,
    WageBConstant,
    WageBExpEdu,
    WageBExpB,
    WageBExpBSquare,
    WageBExpA,
    WageBExpASquare,
    NonpecEduConstant,
    NonpecEduAtLeastTwelveExpEdu,
    NonpecEduNotEduLastPeriod,
    NonpecHomeConstant,
    ShockSdA,
    ShockSdB,
    ShockSdEdu,
    ShockSdHome,
    ShockCorrBA,
    ShockCorrEduA,
    ShockCorrEduB,
    ShockCorrHomeA,
    ShockCorrHomeB,
    ShockCorrHomeEdu,
    LaggedChoiceEduTen,
    InitialExpEduTen,
    MaximumExpEdu,
    MeasErrorSdA,
    MeasErrorSdB,
}

impl SimulatorParam {
    pub const COUNT: usize = 32;

    /// All coefficients in simulator order
    pub const ALL: [SimulatorParam; Self::COUNT] = [
        SimulatorParam::Delta,
        SimulatorParam::WageAConstant,
        SimulatorParam::WageAExpEdu,
        SimulatorParam::WageAExpA,
        SimulatorParam::WageAExpASquare,
        SimulatorParam::WageAExpB,
        SimulatorParam::WageAExpBSquare,
        SimulatorParam::WageBConstant,
        SimulatorParam::WageBExpEdu,
        SimulatorParam::WageBExpB,
        SimulatorParam::WageBExpBSquare,
        SimulatorParam::WageBExpA,
        SimulatorParam::WageBExpASquare,
        SimulatorParam::NonpecEduConstant,
        SimulatorParam::NonpecEduAtLeastTwelveExpEdu,
        SimulatorParam::NonpecEduNotEduLastPeriod,
        SimulatorParam::NonpecHomeConstant,
        SimulatorParam::ShockSdA,
        SimulatorParam::ShockSdB,
        SimulatorParam::ShockSdEdu,
        SimulatorParam::ShockSdHome,
        SimulatorParam::ShockCorrBA,
        SimulatorParam::ShockCorrEduA,
        SimulatorParam::ShockCorrEduB,
        SimulatorParam::ShockCorrHomeA,
        SimulatorParam::ShockCorrHomeB,
        SimulatorParam::ShockCorrHomeEdu,
        SimulatorParam::LaggedChoiceEduTen,
        SimulatorParam::InitialExpEduTen,
        SimulatorParam::MaximumExpEdu,
        SimulatorParam::MeasErrorSdA,
        SimulatorParam::MeasErrorSdB,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Category half of the `(category, name)` key
    #[must_use]
    pub fn category(self) -> &'static str {
        use SimulatorParam::*;
        match self {
            Delta => "delta",
            WageAConstant | WageAExpEdu | WageAExpA | WageAExpASquare | WageAExpB
            | WageAExpBSquare => "wage_a",
            WageBConstant | WageBExpEdu | WageBExpB | WageBExpBSquare | WageBExpA
            | WageBExpASquare => "wage_b",
            NonpecEduConstant | NonpecEduAtLeastTwelveExpEdu | NonpecEduNotEduLastPeriod => {
                "nonpec_edu"
            }
            NonpecHomeConstant => "nonpec_home",
            ShockSdA | ShockSdB | ShockSdEdu | ShockSdHome | ShockCorrBA | ShockCorrEduA
            | ShockCorrEduB | ShockCorrHomeA | ShockCorrHomeB | ShockCorrHomeEdu => {
                "shocks_sdcorr"
            }
            LaggedChoiceEduTen => "lagged_choice_1_edu",
            InitialExpEduTen => "initial_exp_edu",
            MaximumExpEdu => "maximum_exp",
            MeasErrorSdA | MeasErrorSdB => "meas_error",
        }
    }

    /// Name half of the `(category, name)` key
    #[must_use]
    pub fn name(self) -> &'static str {
        use SimulatorParam::*;
        match self {
            Delta => "delta",
            WageAConstant | WageBConstant | NonpecEduConstant | NonpecHomeConstant => "constant",
            WageAExpEdu | WageBExpEdu => "exp_edu",
            WageAExpA | WageBExpA => "exp_a",
            WageAExpASquare | WageBExpASquare => "exp_a_square",
            WageAExpB | WageBExpB => "exp_b",
            WageAExpBSquare | WageBExpBSquare => "exp_b_square",
            NonpecEduAtLeastTwelveExpEdu => "at_least_twelve_exp_edu",
            NonpecEduNotEduLastPeriod => "not_edu_last_period",
            ShockSdA | MeasErrorSdA => "sd_a",
            ShockSdB | MeasErrorSdB => "sd_b",
            ShockSdEdu => "sd_edu",
            ShockSdHome => "sd_home",
            ShockCorrBA => "corr_b_a",
            ShockCorrEduA => "corr_edu_a",
            ShockCorrEduB => "corr_edu_b",
            ShockCorrHomeA => "corr_home_a",
            ShockCorrHomeB => "corr_home_b",
            ShockCorrHomeEdu => "corr_home_edu",
            LaggedChoiceEduTen => "edu_ten",
            InitialExpEduTen => "10",
            MaximumExpEdu => "edu",
        }
    }

    /// Look a coefficient up by its `(category, name)` key
    #[must_use]
    pub fn from_key(category: &str, name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.category() == category && p.name() == name)
    }
}

impl fmt::Display for SimulatorParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category(), self.name())
    }
}

impl FromStr for SimulatorParam {
    type Err = ValidationError;

    /// Parses `category.name`, e.g. `nonpec_edu.at_least_twelve_exp_edu`
    fn from_str(key: &str) -> Result<Self, Self::Err> {
        key.split_once('.')
            .and_then(|(category, name)| Self::from_key(category, name))
            .ok_or_else(|| ValidationError::UnknownParameter(key.to_string()))
    }
}

impl Serialize for SimulatorParam {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SimulatorParam {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(de::Error::custom)
    }
}

/// A complete parameter vector in simulator notation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorParams {
    values: [f64; SimulatorParam::COUNT],
}

impl SimulatorParams {
    pub(crate) fn from_array(values: [f64; SimulatorParam::COUNT]) -> Self {
        Self { values }
    }

    /// Build from values in simulator order.
    ///
    /// Fails unless exactly 32 finite values are given.
    pub fn from_values(values: &[f64]) -> Result<Self, ValidationError> {
        let values: [f64; SimulatorParam::COUNT] =
            values
                .try_into()
                .map_err(|_| ValidationError::WrongLength {
                    what: "simulator parameter vector",
                    expected: SimulatorParam::COUNT,
                    actual: values.len(),
                })?;
        if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ValidationError::NonFinite {
                what: "simulator parameter vector",
                index,
                value: *value,
            });
        }
        Ok(Self { values })
    }

    #[must_use]
    pub fn values(&self) -> &[f64; SimulatorParam::COUNT] {
        &self.values
    }

    /// Copy of this vector with `delta` added to one coefficient
    #[must_use]
    pub fn with_added(mut self, param: SimulatorParam, delta: f64) -> Self {
        self.values[param.index()] += delta;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (SimulatorParam, f64)> + '_ {
        SimulatorParam::ALL
            .iter()
            .map(move |p| (*p, self.values[p.index()]))
    }
}

impl Index<SimulatorParam> for SimulatorParams {
    type Output = f64;

    fn index(&self, param: SimulatorParam) -> &f64 {
        &self.values[param.index()]
    }
}

impl Serialize for SimulatorParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SimulatorParam::COUNT))?;
        for (param, value) in self.iter() {
            map.serialize_entry(&param.to_string(), &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_order_matches_index() {
        for (i, param) in PublishedParam::ALL.iter().enumerate() {
            assert_eq!(param.index(), i);
            assert_eq!(PublishedParam::from_name(param.name()), Some(*param));
        }
    }

    #[test]
    fn test_simulator_keys_are_unique() {
        let keys: HashSet<(&str, &str)> = SimulatorParam::ALL
            .iter()
            .map(|p| (p.category(), p.name()))
            .collect();
        assert_eq!(keys.len(), SimulatorParam::COUNT);
        for (i, param) in SimulatorParam::ALL.iter().enumerate() {
            assert_eq!(param.index(), i);
            assert_eq!(
                SimulatorParam::from_key(param.category(), param.name()),
                Some(*param)
            );
        }
    }

    #[test]
    fn test_from_values_rejects_wrong_length() {
        let err = PublishedParams::from_values(&[0.0; 25]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::WrongLength {
                what: "published parameter vector",
                expected: 26,
                actual: 25,
            }
        );
        assert!(PublishedParams::from_values(&[0.0; 27]).is_err());
        assert!(SimulatorParams::from_values(&[0.0; 59]).is_err());
    }

    #[test]
    fn test_simulator_from_values_rejects_nan() {
        let mut values = [1.0; SimulatorParam::COUNT];
        values[5] = f64::NAN;
        assert!(matches!(
            SimulatorParams::from_values(&values),
            Err(ValidationError::NonFinite { index: 5, .. })
        ));
    }

    #[test]
    fn test_from_pairs() {
        let pairs: Vec<(&str, f64)> = PublishedParam::ALL
            .iter()
            .rev()
            .map(|p| (p.name(), p.index() as f64))
            .collect();
        let params = PublishedParams::from_pairs(pairs).unwrap();
        assert_eq!(params[PublishedParam::Alpha10], 0.0);
        assert_eq!(params[PublishedParam::A44], 25.0);

        let missing = PublishedParams::from_pairs([("alpha10", 1.0)]);
        assert!(matches!(
            missing,
            Err(ValidationError::MissingParameter(PublishedParam::Alpha11))
        ));

        let duplicate = PublishedParams::from_pairs([("alpha10", 1.0), ("alpha10", 2.0)]);
        assert!(matches!(
            duplicate,
            Err(ValidationError::DuplicateParameter(_))
        ));

        let unknown = PublishedParams::from_pairs([("alpha99", 1.0)]);
        assert!(matches!(unknown, Err(ValidationError::UnknownParameter(_))));
    }

    #[test]
    fn test_simulator_key_round_trip() {
        let param: SimulatorParam = "nonpec_edu.at_least_twelve_exp_edu".parse().unwrap();
        assert_eq!(param, SimulatorParam::NonpecEduAtLeastTwelveExpEdu);
        assert_eq!(param.to_string(), "nonpec_edu.at_least_twelve_exp_edu");
        assert!("nonpec_edu".parse::<SimulatorParam>().is_err());
        assert!("wage_c.constant".parse::<SimulatorParam>().is_err());
    }

    #[test]
    fn test_with_added_returns_new_vector() {
        let base = SimulatorParams::from_array([0.0; SimulatorParam::COUNT]);
        let policy = base.with_added(SimulatorParam::NonpecEduAtLeastTwelveExpEdu, 500.0);
        assert_eq!(base[SimulatorParam::NonpecEduAtLeastTwelveExpEdu], 0.0);
        assert_eq!(policy[SimulatorParam::NonpecEduAtLeastTwelveExpEdu], 500.0);
    }
}
