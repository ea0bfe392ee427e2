//! Policy abstractions for action selection

use indexmap::IndexMap;

use crate::{Action, GpiError, MdpState, Result};

/// Tolerance when checking that a distribution sums to one
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Core policy trait: a distribution over a state's feasible actions
pub trait Policy {
    /// Probability of each feasible action in `state`; empty for terminal states
    fn action_probabilities(&self, state: &MdpState) -> Result<IndexMap<Action, f64>>;
}

/// Uniform distribution over the feasible actions of `state`
#[must_use]
pub fn equiprobable(state: &MdpState) -> IndexMap<Action, f64> {
    let actions = state.actions();
    if actions.is_empty() {
        return IndexMap::new();
    }
    let p = 1.0 / actions.len() as f64;
    actions.iter().map(|a| (a.clone(), p)).collect()
}

/// Explicit per-state distributions, equiprobable where none was set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularPolicy {
    distributions: IndexMap<MdpState, IndexMap<Action, f64>>,
}

impl TabularPolicy {
    /// Create a policy that is equiprobable everywhere
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy with an explicit equiprobable entry for every state
    pub fn equiprobable_over<'a>(states: impl IntoIterator<Item = &'a MdpState>) -> Self {
        let distributions = states
            .into_iter()
            .map(|s| (s.clone(), equiprobable(s)))
            .collect();
        Self { distributions }
    }

    /// Replace the distribution for `state`.
    ///
    /// Every key must be feasible, weights non-negative and summing to one.
    /// Feasible actions missing from `distribution` get probability zero.
    pub fn set_distribution(
        &mut self,
        state: &MdpState,
        distribution: IndexMap<Action, f64>,
    ) -> Result<()> {
        if state.is_terminal() {
            if distribution.is_empty() {
                self.distributions.insert(state.clone(), IndexMap::new());
                return Ok(());
            }
            return Err(GpiError::Policy(format!(
                "terminal {state} cannot carry an action distribution"
            )));
        }

        for (action, p) in &distribution {
            if !state.is_feasible(action) {
                return Err(GpiError::InfeasibleAction {
                    action: action.to_string(),
                    state: state.to_string(),
                });
            }
            if !p.is_finite() || *p < 0.0 {
                return Err(GpiError::Policy(format!(
                    "probability {p} for action {action} in {state} is not a valid weight"
                )));
            }
        }
        let total: f64 = distribution.values().sum();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(GpiError::Policy(format!(
                "distribution for {state} sums to {total}"
            )));
        }

        let full = state
            .actions()
            .iter()
            .map(|a| (a.clone(), distribution.get(a).copied().unwrap_or(0.0)))
            .collect();
        self.distributions.insert(state.clone(), full);
        Ok(())
    }

    /// Whether `state` has an explicit distribution
    #[must_use]
    pub fn contains_state(&self, state: &MdpState) -> bool {
        self.distributions.contains_key(state)
    }

    /// Iterate over explicit distributions
    pub fn iter(&self) -> impl Iterator<Item = (&MdpState, &IndexMap<Action, f64>)> {
        self.distributions.iter()
    }
}

impl Policy for TabularPolicy {
    fn action_probabilities(&self, state: &MdpState) -> Result<IndexMap<Action, f64>> {
        Ok(self
            .distributions
            .get(state)
            .cloned()
            .unwrap_or_else(|| equiprobable(state)))
    }
}
