//! Finite MDP with an explicit transition model
//!
//! The same environment serves both engines: DP reads the model through
//! [`MdpModel`], TD samples it through [`Environment`].

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};
use tracing::trace;

use rlgpi_core::{Action, Environment, GpiError, MdpModel, MdpState, Outcome, Result, Step};

const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Tabular environment with known dynamics
#[derive(Debug, Clone)]
pub struct MdpEnvironment {
    name: String,
    states: Vec<MdpState>,
    model: IndexMap<(usize, usize), Vec<Outcome>>,
    rng: StdRng,
    current: Option<MdpState>,
}

impl MdpEnvironment {
    /// Create an environment from its states and transition model.
    ///
    /// `model` maps `(state id, action id)` to outcomes and must cover every
    /// feasible pair of every non-terminal state, with probabilities summing
    /// to one and successors drawn from `states`.
    pub fn new(
        name: impl Into<String>,
        states: Vec<MdpState>,
        model: IndexMap<(usize, usize), Vec<Outcome>>,
        rng: StdRng,
    ) -> Result<Self> {
        let name = name.into();
        let known: IndexMap<usize, &MdpState> = states.iter().map(|s| (s.id(), s)).collect();
        if known.len() != states.len() {
            return Err(GpiError::Environment(format!(
                "{name}: duplicate state identifiers"
            )));
        }

        for state in &states {
            for action in state.actions() {
                let outcomes = model.get(&(state.id(), action.id())).ok_or_else(|| {
                    GpiError::Environment(format!(
                        "{name}: no outcomes for action {action} in {state}"
                    ))
                })?;
                let total: f64 = outcomes.iter().map(|o| o.probability).sum();
                if (total - 1.0).abs() > PROBABILITY_TOLERANCE
                    || outcomes.iter().any(|o| o.probability < 0.0)
                {
                    return Err(GpiError::Environment(format!(
                        "{name}: outcome probabilities for {action} in {state} sum to {total}"
                    )));
                }
                let stray = outcomes
                    .iter()
                    .find(|o| !known.contains_key(&o.next_state.id()));
                if let Some(stray) = stray {
                    return Err(GpiError::Environment(format!(
                        "{name}: successor {} is not part of the state space",
                        stray.next_state
                    )));
                }
            }
        }

        Ok(Self {
            name,
            states,
            model,
            rng,
            current: None,
        })
    }

    /// Look up a state by identifier
    #[must_use]
    pub fn state(&self, id: usize) -> Option<&MdpState> {
        self.states.iter().find(|s| s.id() == id)
    }

    /// Non-terminal states, in sweep order
    pub fn nonterminal_states(&self) -> impl Iterator<Item = &MdpState> {
        self.states.iter().filter(|s| !s.is_terminal())
    }

    /// The state the next `step` acts from
    #[must_use]
    pub fn current_state(&self) -> Option<&MdpState> {
        self.current.as_ref()
    }

    /// Place the simulation in a specific state
    pub fn set_state(&mut self, id: usize) -> Result<MdpState> {
        let state = self
            .state(id)
            .cloned()
            .ok_or_else(|| GpiError::UnknownState(format!("state {id}")))?;
        self.current = Some(state.clone());
        Ok(state)
    }
}

impl MdpModel for MdpEnvironment {
    fn states(&self) -> &[MdpState] {
        &self.states
    }

    fn outcomes(&self, state: &MdpState, action: &Action) -> Result<&[Outcome]> {
        self.model
            .get(&(state.id(), action.id()))
            .map(Vec::as_slice)
            .ok_or_else(|| GpiError::UnknownStateAction {
                state: state.to_string(),
                action: action.to_string(),
            })
    }
}

impl Environment for MdpEnvironment {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) -> Result<MdpState> {
        let candidates: Vec<usize> = self
            .states
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_terminal())
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return Err(GpiError::Environment(format!(
                "{}: no non-terminal start state",
                self.name
            )));
        }
        let state = self.states[candidates[self.rng.gen_range(0..candidates.len())]].clone();
        trace!(env = %self.name, %state, "reset");
        self.current = Some(state.clone());
        Ok(state)
    }

    fn step(&mut self, action: &Action) -> Result<Step> {
        let state = self.current.clone().ok_or_else(|| {
            GpiError::Environment(format!("{}: step called before reset", self.name))
        })?;
        if !state.is_feasible(action) {
            return Err(GpiError::InfeasibleAction {
                action: action.to_string(),
                state: state.to_string(),
            });
        }

        let outcomes = self
            .model
            .get(&(state.id(), action.id()))
            .ok_or_else(|| GpiError::UnknownStateAction {
                state: state.to_string(),
                action: action.to_string(),
            })?;
        let outcome = if outcomes.len() == 1 {
            outcomes[0].clone()
        } else {
            let dist = WeightedIndex::new(outcomes.iter().map(|o| o.probability))
                .map_err(|e| GpiError::Environment(format!("{}: {e}", self.name)))?;
            outcomes[dist.sample(&mut self.rng)].clone()
        };

        self.current = Some(outcome.next_state.clone());
        Ok(Step::new(outcome.next_state, outcome.reward))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn coin() -> MdpEnvironment {
        let flip = Action::new(0, "flip");
        let start = MdpState::new(0, vec![flip.clone()], false).unwrap();
        let heads = MdpState::terminal(1);
        let tails = MdpState::terminal(2);
        let mut model = IndexMap::new();
        model.insert(
            (0, 0),
            vec![
                Outcome { next_state: heads.clone(), reward: 1.0, probability: 0.5 },
                Outcome { next_state: tails.clone(), reward: 0.0, probability: 0.5 },
            ],
        );
        MdpEnvironment::new("coin", vec![start, heads, tails], model, StdRng::seed_from_u64(1))
            .unwrap()
    }

    #[test]
    fn step_samples_both_outcomes() {
        let mut env = coin();
        let flip = Action::new(0, "flip");
        let mut seen = [false; 3];
        for _ in 0..64 {
            let start = env.reset().unwrap();
            assert_eq!(start.id(), 0);
            let step = env.step(&flip).unwrap();
            assert!(step.done);
            seen[step.next_state.id()] = true;
        }
        assert!(seen[1] && seen[2]);
    }

    #[test]
    fn rejects_incomplete_model() {
        let flip = Action::new(0, "flip");
        let start = MdpState::new(0, vec![flip], false).unwrap();
        let result =
            MdpEnvironment::new("bad", vec![start], IndexMap::new(), StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(GpiError::Environment(_))));
    }

    #[test]
    fn step_before_reset_fails() {
        let mut env = coin();
        assert!(env.step(&Action::new(0, "flip")).is_err());
        env.set_state(0).unwrap();
        assert!(matches!(
            env.step(&Action::new(5, "nope")),
            Err(GpiError::InfeasibleAction { .. })
        ));
    }
}
