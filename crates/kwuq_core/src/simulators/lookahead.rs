//! KW94 agents with static expectations.
//!
//! An agent values each choice as its current reward plus the discounted value
//! of the best expected reward at the resulting state, held for the rest of the
//! horizon. There is no backward induction.
//!
//! Shocks are drawn per agent from a generator seeded with `seed + agent_id`,
//! four per period in a fixed order, so runs sharing a seed face identical
//! shocks whatever their parameters.

use nalgebra::{DMatrix, DVector};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::model::{AgentPeriod, Choice, SimulatedPanel, SimulatorParam, SimulatorParams};
use crate::sampling::factorize;
use crate::simulation::{SimulationConfig, Simulator};

/// Years of schooling every agent starts with
const INITIAL_EDU: u16 = 10;

/// Type-specific endowments
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeEndowment {
    /// Added to both log wages
    pub wage_shift: f64,
    /// Added to the schooling reward
    pub edu_shift: f64,
}

/// Agent `i` has type `i % types.len()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookaheadSimulator {
    pub types: Vec<TypeEndowment>,
}

impl Default for LookaheadSimulator {
    fn default() -> Self {
        Self {
            types: vec![
                TypeEndowment {
                    wage_shift: 0.0,
                    edu_shift: 20_000.0,
                },
                TypeEndowment {
                    wage_shift: 0.0,
                    edu_shift: 10_000.0,
                },
                TypeEndowment {
                    wage_shift: -0.1,
                    edu_shift: 0.0,
                },
                TypeEndowment {
                    wage_shift: 0.1,
                    edu_shift: -5_000.0,
                },
            ],
        }
    }
}

impl LookaheadSimulator {
    #[must_use]
    pub fn new(types: Vec<TypeEndowment>) -> Self {
        Self { types }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct State {
    edu: u16,
    exp_a: u16,
    exp_b: u16,
    lagged_edu: bool,
}

impl State {
    fn after(self, choice: Choice) -> Self {
        let mut next = Self {
            lagged_edu: choice == Choice::Education,
            ..self
        };
        match choice {
            Choice::OccupationA => next.exp_a += 1,
            Choice::OccupationB => next.exp_b += 1,
            Choice::Education => next.edu += 1,
            Choice::Home => {}
        }
        next
    }
}

/// Validated coefficients of one run
struct Model {
    params: SimulatorParams,
    delta: f64,
    max_edu: u16,
    lagged_edu_share: f64,
    shock_factor: DMatrix<f64>,
    shock_sd: [f64; Choice::COUNT],
}

impl Model {
    fn new(params: &SimulatorParams) -> Result<Self, SimulationError> {
        use SimulatorParam as S;

        if let Some((param, value)) = params.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SimulationError::InvalidParameter { param, value });
        }
        let check = |param: S, ok: fn(f64) -> bool| {
            let value = params[param];
            if ok(value) {
                Ok(value)
            } else {
                Err(SimulationError::InvalidParameter { param, value })
            }
        };

        let delta = check(S::Delta, |v| (0.0..=1.0).contains(&v))?;
        let lagged_edu_share = check(S::LaggedChoiceEduTen, |v| (0.0..=1.0).contains(&v))?;
        // every agent starts with the same schooling
        check(S::InitialExpEduTen, |v| v == 1.0)?;
        let max_edu = check(S::MaximumExpEdu, |v| {
            v >= f64::from(INITIAL_EDU) && v <= f64::from(u16::MAX)
        })? as u16;

        let sd_params = [S::ShockSdA, S::ShockSdB, S::ShockSdEdu, S::ShockSdHome];
        let mut shock_sd = [0.0; Choice::COUNT];
        for (sd, param) in shock_sd.iter_mut().zip(sd_params) {
            *sd = check(param, |v| v >= 0.0)?;
        }

        let mut corr = DMatrix::<f64>::identity(Choice::COUNT, Choice::COUNT);
        for (param, i, j) in [
            (S::ShockCorrBA, 1, 0),
            (S::ShockCorrEduA, 2, 0),
            (S::ShockCorrEduB, 2, 1),
            (S::ShockCorrHomeA, 3, 0),
            (S::ShockCorrHomeB, 3, 1),
            (S::ShockCorrHomeEdu, 3, 2),
        ] {
            let value = check(param, |v| (-1.0..=1.0).contains(&v))?;
            corr[(i, j)] = value;
            corr[(j, i)] = value;
        }
        let sd = DMatrix::from_diagonal(&DVector::from_column_slice(&shock_sd));
        let shock_factor = factorize(&sd * corr * &sd)
            .map_err(|e| SimulationError::Failed(format!("shock covariance: {e}")))?;

        Ok(Self {
            params: *params,
            delta,
            max_edu,
            lagged_edu_share,
            shock_factor,
            shock_sd,
        })
    }

    fn log_wage(&self, choice: Choice, state: State, endowment: &TypeEndowment) -> f64 {
        use SimulatorParam as S;

        let p = &self.params;
        let (xa, xb, edu) = (
            f64::from(state.exp_a),
            f64::from(state.exp_b),
            f64::from(state.edu),
        );
        let deterministic = match choice {
            Choice::OccupationA => {
                p[S::WageAConstant] + p[S::WageAExpEdu] * edu + p[S::WageAExpA] * xa
                    - p[S::WageAExpASquare] * xa * xa
                    + p[S::WageAExpB] * xb
                    - p[S::WageAExpBSquare] * xb * xb
            }
            Choice::OccupationB => {
                p[S::WageBConstant] + p[S::WageBExpEdu] * edu + p[S::WageBExpB] * xb
                    - p[S::WageBExpBSquare] * xb * xb
                    + p[S::WageBExpA] * xa
                    - p[S::WageBExpASquare] * xa * xa
            }
            Choice::Education | Choice::Home => 0.0,
        };
        deterministic + endowment.wage_shift
    }

    /// Rewards of all choices under `shocks`, NaN where a choice is unavailable
    fn rewards(
        &self,
        state: State,
        endowment: &TypeEndowment,
        shocks: &[f64; Choice::COUNT],
    ) -> [f64; Choice::COUNT] {
        use SimulatorParam as S;

        let p = &self.params;
        let wage_a = (self.log_wage(Choice::OccupationA, state, endowment) + shocks[0]).exp();
        let wage_b = (self.log_wage(Choice::OccupationB, state, endowment) + shocks[1]).exp();
        let edu = if state.edu >= self.max_edu {
            f64::NAN
        } else {
            let mut reward = p[S::NonpecEduConstant] + endowment.edu_shift + shocks[2];
            if state.edu >= 12 {
                reward += p[S::NonpecEduAtLeastTwelveExpEdu];
            }
            if !state.lagged_edu {
                reward += p[S::NonpecEduNotEduLastPeriod];
            }
            reward
        };
        let home = p[S::NonpecHomeConstant] + shocks[3];
        [wage_a, wage_b, edu, home]
    }

    /// Best reward at `state` with shocks at their mean
    fn best_expected(&self, state: State, endowment: &TypeEndowment) -> f64 {
        // E[exp(x + e)] for e ~ N(0, sd²)
        let lognormal = |sd: f64| 0.5 * sd * sd;
        let mut rewards = self.rewards(state, endowment, &[0.0; Choice::COUNT]);
        rewards[0] = (self.log_wage(Choice::OccupationA, state, endowment)
            + lognormal(self.shock_sd[0]))
        .exp();
        rewards[1] = (self.log_wage(Choice::OccupationB, state, endowment)
            + lognormal(self.shock_sd[1]))
        .exp();
        rewards
            .into_iter()
            .filter(|r| !r.is_nan())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// `sum_{s=1..=n} delta^s`
    fn annuity(&self, n: u16) -> f64 {
        if self.delta == 1.0 {
            f64::from(n)
        } else {
            self.delta * (1.0 - self.delta.powi(i32::from(n))) / (1.0 - self.delta)
        }
    }

    fn draw_shocks(&self, rng: &mut SmallRng) -> [f64; Choice::COUNT] {
        let z = DVector::<f64>::from_fn(Choice::COUNT, |_, _| rng.sample(StandardNormal));
        let eps = &self.shock_factor * z;
        [eps[0], eps[1], eps[2], eps[3]]
    }
}

impl Simulator for LookaheadSimulator {
    fn simulate(
        &self,
        params: &SimulatorParams,
        config: &SimulationConfig,
    ) -> Result<SimulatedPanel, SimulationError> {
        if self.types.is_empty() || self.types.len() > usize::from(u8::MAX) + 1 {
            return Err(SimulationError::Failed(format!(
                "between 1 and 256 types are supported, got {}",
                self.types.len()
            )));
        }
        let model = Model::new(params)?;

        let mut records =
            Vec::with_capacity(config.num_agents as usize * usize::from(config.num_periods));
        for agent_id in 0..config.num_agents {
            let type_index = agent_id as usize % self.types.len();
            let endowment = &self.types[type_index];
            let mut rng = SmallRng::seed_from_u64(config.seed.wrapping_add(u64::from(agent_id)));

            let mut state = State {
                edu: INITIAL_EDU,
                exp_a: 0,
                exp_b: 0,
                lagged_edu: rng.random::<f64>() < model.lagged_edu_share,
            };

            for period in 0..config.num_periods {
                let shocks = model.draw_shocks(&mut rng);
                let rewards = model.rewards(state, endowment, &shocks);
                let annuity = model.annuity(config.num_periods - period - 1);

                let mut value_functions = [f64::NAN; Choice::COUNT];
                for choice in Choice::ALL {
                    let reward = rewards[choice.index()];
                    if !reward.is_nan() {
                        value_functions[choice.index()] =
                            reward + annuity * model.best_expected(state.after(choice), endowment);
                    }
                }
                let choice = best_choice(&value_functions);

                records.push(AgentPeriod {
                    agent_id,
                    period,
                    agent_type: type_index as u8,
                    choice,
                    edu_experience: state.edu,
                    value_functions,
                });
                state = state.after(choice);
            }
        }

        tracing::debug!(
            agents = config.num_agents,
            periods = config.num_periods,
            seed = config.seed,
            "Simulated panel"
        );
        Ok(SimulatedPanel::new(records))
    }
}

/// First choice with the highest available value
fn best_choice(values: &[f64; Choice::COUNT]) -> Choice {
    let mut best = Choice::Home;
    let mut best_value = f64::NEG_INFINITY;
    for choice in Choice::ALL {
        let value = values[choice.index()];
        if value > best_value {
            best = choice;
            best_value = value;
        }
    }
    best
}
