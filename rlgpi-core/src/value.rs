//! State-action value estimates

use indexmap::IndexMap;

use crate::{Action, GpiError, MdpState, Result};

/// Action value function Q(s, a).
///
/// Exploration policies and the TD engine's bootstrap read values through this
/// trait only, so a function-approximation estimator can replace the table.
pub trait ActionValueEstimator {
    /// Estimate the value of taking an action in a given state
    fn value(&self, state: &MdpState, action: &Action) -> Result<f64>;

    /// Values of every feasible action, in the state's action order
    fn action_values(&self, state: &MdpState) -> Result<IndexMap<Action, f64>>;

    /// Move the estimate for `(state, action)` toward `target` by step size `alpha`
    fn update(&mut self, state: &MdpState, action: &Action, target: f64, alpha: f64) -> Result<()>;
}

/// Tabular Q-function over a finite state space.
///
/// Every state present holds exactly its feasible actions. Iteration follows
/// insertion order, which keeps sweeps and snapshots deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateActionValueTable {
    values: IndexMap<MdpState, IndexMap<Action, f64>>,
    default_value: Option<f64>,
}

impl StateActionValueTable {
    /// Create an empty table.
    ///
    /// With a default, unseen states read as that value and are seeded with it
    /// on first write; without one, reads of unseen states fail.
    #[must_use]
    pub fn new(default_value: Option<f64>) -> Self {
        Self {
            values: IndexMap::new(),
            default_value,
        }
    }

    /// Seed every state with the default value (0.0 when none is configured)
    pub fn initialize<'a>(&mut self, states: impl IntoIterator<Item = &'a MdpState>) {
        let seed = self.default_value.unwrap_or(0.0);
        for state in states {
            self.values
                .entry(state.clone())
                .or_insert_with(|| Self::seeded(state, seed));
        }
    }

    fn seeded(state: &MdpState, value: f64) -> IndexMap<Action, f64> {
        state.actions().iter().map(|a| (a.clone(), value)).collect()
    }

    fn ensure_feasible(state: &MdpState, action: &Action) -> Result<()> {
        if state.is_feasible(action) {
            Ok(())
        } else {
            Err(GpiError::UnknownStateAction {
                state: state.to_string(),
                action: action.to_string(),
            })
        }
    }

    fn entry_mut(&mut self, state: &MdpState) -> Result<&mut IndexMap<Action, f64>> {
        if !self.values.contains_key(state) {
            let seed = self
                .default_value
                .ok_or_else(|| GpiError::UnknownState(state.to_string()))?;
            self.values.insert(state.clone(), Self::seeded(state, seed));
        }
        self.values
            .get_mut(state)
            .ok_or_else(|| GpiError::UnknownState(state.to_string()))
    }

    /// Look up Q(s, a)
    pub fn get(&self, state: &MdpState, action: &Action) -> Result<f64> {
        Self::ensure_feasible(state, action)?;
        match self.values.get(state) {
            Some(actions) => actions.get(action).copied().ok_or_else(|| {
                GpiError::UnknownStateAction {
                    state: state.to_string(),
                    action: action.to_string(),
                }
            }),
            None => self
                .default_value
                .ok_or_else(|| GpiError::UnknownState(state.to_string())),
        }
    }

    /// Overwrite Q(s, a)
    pub fn set(&mut self, state: &MdpState, action: &Action, value: f64) -> Result<()> {
        Self::ensure_feasible(state, action)?;
        let actions = self.entry_mut(state)?;
        actions.insert(action.clone(), value);
        Ok(())
    }

    /// Values of every feasible action in `state`
    pub fn action_values(&self, state: &MdpState) -> Result<IndexMap<Action, f64>> {
        match self.values.get(state) {
            Some(actions) => Ok(actions.clone()),
            None => {
                let seed = self
                    .default_value
                    .ok_or_else(|| GpiError::UnknownState(state.to_string()))?;
                Ok(Self::seeded(state, seed))
            }
        }
    }

    /// Largest action value in `state`, `None` for terminal states
    pub fn max_value(&self, state: &MdpState) -> Result<Option<f64>> {
        Ok(self
            .action_values(state)?
            .values()
            .copied()
            .fold(None, |best, v| Some(best.map_or(v, |b: f64| b.max(v)))))
    }

    /// Actions whose value is within `tolerance` of the maximum
    pub fn greedy_actions(&self, state: &MdpState, tolerance: f64) -> Result<Vec<Action>> {
        let values = self.action_values(state)?;
        let Some(best) = self.max_value(state)? else {
            return Ok(Vec::new());
        };
        Ok(values
            .into_iter()
            .filter(|(_, v)| best - v <= tolerance)
            .map(|(a, _)| a)
            .collect())
    }

    /// Whether `state` has been initialized or written
    #[must_use]
    pub fn contains_state(&self, state: &MdpState) -> bool {
        self.values.contains_key(state)
    }

    /// Iterate over populated states and their action values
    pub fn iter(&self) -> impl Iterator<Item = (&MdpState, &IndexMap<Action, f64>)> {
        self.values.iter()
    }

    /// Iterate over every populated (state, action, value) entry
    pub fn entries(&self) -> impl Iterator<Item = (&MdpState, &Action, f64)> {
        self.values
            .iter()
            .flat_map(|(s, actions)| actions.iter().map(move |(a, v)| (s, a, *v)))
    }

    /// Number of populated states
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no state is populated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest absolute difference over entries present in both tables.
    ///
    /// Fails when the tables do not cover the same state-action pairs.
    pub fn max_abs_difference(&self, other: &Self) -> Result<f64> {
        if self.values.len() != other.values.len() {
            return Err(GpiError::Configuration(format!(
                "tables cover {} and {} states",
                self.values.len(),
                other.values.len()
            )));
        }
        let mut max = 0.0_f64;
        for (state, action, value) in self.entries() {
            if !other.contains_state(state) {
                return Err(GpiError::UnknownState(state.to_string()));
            }
            max = max.max((value - other.get(state, action)?).abs());
        }
        Ok(max)
    }
}

impl ActionValueEstimator for StateActionValueTable {
    fn value(&self, state: &MdpState, action: &Action) -> Result<f64> {
        self.get(state, action)
    }

    fn action_values(&self, state: &MdpState) -> Result<IndexMap<Action, f64>> {
        StateActionValueTable::action_values(self, state)
    }

    fn update(&mut self, state: &MdpState, action: &Action, target: f64, alpha: f64) -> Result<()> {
        Self::ensure_feasible(state, action)?;
        let actions = self.entry_mut(state)?;
        let value = actions.get_mut(action).ok_or_else(|| GpiError::UnknownStateAction {
            state: state.to_string(),
            action: action.to_string(),
        })?;
        *value += alpha * (target - *value);
        Ok(())
    }
}
