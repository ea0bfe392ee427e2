//! Exploration policies over action-value estimates
//!
//! A selector turns the agent's current Q estimates into an action
//! distribution. Greedy, epsilon-greedy and softmax variants are provided;
//! the TD engine only ever sees them through [`ActionSelector`].

use indexmap::IndexMap;
use rand::RngCore;
use rand_distr::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

use rlgpi_core::{Action, ActionValueEstimator, GpiError, MdpState, Result};

/// Values within this distance of the best count as ties
pub const TIE_TOLERANCE: f64 = 1e-9;

/// Draw an action from a distribution, `None` when it is empty
pub fn sample_action(
    probabilities: &IndexMap<Action, f64>,
    rng: &mut dyn RngCore,
) -> Result<Option<Action>> {
    if probabilities.is_empty() {
        return Ok(None);
    }
    let dist = WeightedIndex::new(probabilities.values().copied())
        .map_err(|e| GpiError::Policy(format!("cannot sample action distribution: {e}")))?;
    Ok(probabilities
        .get_index(dist.sample(rng))
        .map(|(action, _)| action.clone()))
}

/// Chooses actions from value estimates
pub trait ActionSelector: Send {
    /// Probability of each feasible action in `state` given the estimates
    fn action_probabilities(
        &self,
        state: &MdpState,
        q: &dyn ActionValueEstimator,
    ) -> Result<IndexMap<Action, f64>>;

    /// Sample an action in `state`
    fn choose_action(
        &self,
        state: &MdpState,
        q: &dyn ActionValueEstimator,
        rng: &mut dyn RngCore,
    ) -> Result<Option<Action>> {
        sample_action(&self.action_probabilities(state, q)?, rng)
    }
}

fn greedy_share(values: &IndexMap<Action, f64>) -> IndexMap<Action, f64> {
    let best = values.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let ties = values.values().filter(|v| best - **v <= TIE_TOLERANCE).count();
    values
        .iter()
        .map(|(a, v)| {
            let p = if best - v <= TIE_TOLERANCE {
                1.0 / ties as f64
            } else {
                0.0
            };
            (a.clone(), p)
        })
        .collect()
}

/// Always picks a maximizing action; ties split the mass evenly
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Greedy;

impl ActionSelector for Greedy {
    fn action_probabilities(
        &self,
        state: &MdpState,
        q: &dyn ActionValueEstimator,
    ) -> Result<IndexMap<Action, f64>> {
        Ok(greedy_share(&q.action_values(state)?))
    }
}

/// Greedy with probability `1 - epsilon`, uniform otherwise
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    /// Exploration rate
    pub epsilon: f64,
}

impl EpsilonGreedy {
    /// Create a new epsilon-greedy selector
    pub fn new(epsilon: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(GpiError::config(format!(
                "epsilon must lie in [0, 1], got {epsilon}"
            )));
        }
        Ok(Self { epsilon })
    }

    /// Set the exploration rate
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }
}

impl ActionSelector for EpsilonGreedy {
    fn action_probabilities(
        &self,
        state: &MdpState,
        q: &dyn ActionValueEstimator,
    ) -> Result<IndexMap<Action, f64>> {
        let greedy = greedy_share(&q.action_values(state)?);
        if greedy.is_empty() {
            return Ok(greedy);
        }
        let uniform = self.epsilon / greedy.len() as f64;
        Ok(greedy
            .into_iter()
            .map(|(a, p)| (a, uniform + (1.0 - self.epsilon) * p))
            .collect())
    }
}

/// Boltzmann distribution over action values
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Softmax {
    /// Temperature; lower is greedier
    pub temperature: f64,
}

impl Softmax {
    /// Create a new softmax selector
    pub fn new(temperature: f64) -> Result<Self> {
        if temperature <= 0.0 || !temperature.is_finite() {
            return Err(GpiError::config(format!(
                "softmax temperature must be positive, got {temperature}"
            )));
        }
        Ok(Self { temperature })
    }
}

impl ActionSelector for Softmax {
    fn action_probabilities(
        &self,
        state: &MdpState,
        q: &dyn ActionValueEstimator,
    ) -> Result<IndexMap<Action, f64>> {
        let values = q.action_values(state)?;
        let max = values.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: IndexMap<Action, f64> = values
            .into_iter()
            .map(|(a, v)| (a, ((v - max) / self.temperature).exp()))
            .collect();
        let total: f64 = weights.values().sum();
        Ok(weights.into_iter().map(|(a, w)| (a, w / total)).collect())
    }
}
