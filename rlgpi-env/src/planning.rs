//! Learned environment models for Dyna-style planning

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};
use tracing::trace;

use rlgpi_core::{Action, Environment, GpiError, MdpState, PlanningEnvironment, Result, Step};

/// Observed (next state, reward) outcome and how often it occurred
#[derive(Debug, Clone)]
struct ObservedOutcome {
    next_state: MdpState,
    reward: f64,
    count: u64,
}

/// Count-based model of the environment's dynamics
#[derive(Debug, Clone, Default)]
pub struct StochasticEnvironmentModel {
    transitions: IndexMap<MdpState, IndexMap<Action, Vec<ObservedOutcome>>>,
}

impl StochasticEnvironmentModel {
    /// Create an empty model
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observed transition
    pub fn update(
        &mut self,
        state: &MdpState,
        action: &Action,
        next_state: &MdpState,
        reward: f64,
    ) {
        let outcomes = self
            .transitions
            .entry(state.clone())
            .or_default()
            .entry(action.clone())
            .or_default();
        match outcomes
            .iter_mut()
            .find(|o| o.next_state == *next_state && o.reward.to_bits() == reward.to_bits())
        {
            Some(outcome) => outcome.count += 1,
            None => outcomes.push(ObservedOutcome {
                next_state: next_state.clone(),
                reward,
                count: 1,
            }),
        }
    }

    /// Whether `action` has been observed in `state`
    #[must_use]
    pub fn is_defined_for(&self, state: &MdpState, action: &Action) -> bool {
        self.transitions
            .get(state)
            .is_some_and(|actions| actions.contains_key(action))
    }

    /// Number of states with at least one observed action
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }

    /// Draw a state that has at least one observed action
    pub fn sample_state(&self, rng: &mut StdRng) -> Option<MdpState> {
        if self.transitions.is_empty() {
            return None;
        }
        let i = rng.gen_range(0..self.transitions.len());
        self.transitions.get_index(i).map(|(s, _)| s.clone())
    }

    /// Draw an outcome in proportion to how often it was observed
    pub fn sample_outcome(
        &self,
        state: &MdpState,
        action: &Action,
        rng: &mut StdRng,
    ) -> Result<(MdpState, f64)> {
        let outcomes = self
            .transitions
            .get(state)
            .and_then(|actions| actions.get(action))
            .ok_or_else(|| GpiError::UnknownStateAction {
                state: state.to_string(),
                action: action.to_string(),
            })?;
        let dist = WeightedIndex::new(outcomes.iter().map(|o| o.count))
            .map_err(|e| GpiError::Environment(format!("model sampling failed: {e}")))?;
        let outcome = &outcomes[dist.sample(rng)];
        Ok((outcome.next_state.clone(), outcome.reward))
    }
}

/// Planning environment that simulates trajectories through a learned model.
///
/// Each planning episode starts in a randomly chosen modeled state, follows
/// the agent's own policy, and stops at a terminal state, after `max_steps`,
/// or when the agent picks an action the model has never seen.
#[derive(Debug, Clone)]
pub struct TrajectorySamplingPlanningEnvironment {
    name: String,
    model: StochasticEnvironmentModel,
    rng: StdRng,
    planning_episodes_per_improvement: usize,
    max_steps: usize,
    current: Option<MdpState>,
    steps: usize,
}

impl TrajectorySamplingPlanningEnvironment {
    /// Create a planning environment with an empty model
    pub fn new(
        name: impl Into<String>,
        rng: StdRng,
        planning_episodes_per_improvement: usize,
        max_steps: usize,
    ) -> Result<Self> {
        if max_steps == 0 {
            return Err(GpiError::config("planning episodes need max_steps >= 1"));
        }
        Ok(Self {
            name: name.into(),
            model: StochasticEnvironmentModel::new(),
            rng,
            planning_episodes_per_improvement,
            max_steps,
            current: None,
            steps: 0,
        })
    }

    /// The learned model
    #[must_use]
    pub fn model(&self) -> &StochasticEnvironmentModel {
        &self.model
    }
}

impl Environment for TrajectorySamplingPlanningEnvironment {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) -> Result<MdpState> {
        let state = self.model.sample_state(&mut self.rng).ok_or_else(|| {
            GpiError::Environment(format!("{}: model has no observed states", self.name))
        })?;
        trace!(env = %self.name, %state, "planning reset");
        self.current = Some(state.clone());
        self.steps = 0;
        Ok(state)
    }

    fn step(&mut self, action: &Action) -> Result<Step> {
        let state = self.current.clone().ok_or_else(|| {
            GpiError::Environment(format!("{}: step called before reset", self.name))
        })?;
        let (next_state, reward) = self.model.sample_outcome(&state, action, &mut self.rng)?;
        self.steps += 1;
        self.current = Some(next_state.clone());

        let mut step = Step::new(next_state, reward);
        if self.steps >= self.max_steps && !step.done {
            step.truncated = true;
        }
        Ok(step)
    }

    fn can_simulate(&self, state: &MdpState, action: &Action) -> bool {
        self.model.is_defined_for(state, action)
    }
}

impl PlanningEnvironment for TrajectorySamplingPlanningEnvironment {
    fn update_model(
        &mut self,
        state: &MdpState,
        action: &Action,
        next_state: &MdpState,
        reward: f64,
    ) {
        self.model.update(state, action, next_state, reward);
    }

    fn is_empty(&self) -> bool {
        self.model.num_states() == 0
    }

    fn planning_episodes_per_improvement(&self) -> usize {
        self.planning_episodes_per_improvement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn pair() -> (MdpState, Action, MdpState, MdpState) {
        let go = Action::new(0, "go");
        let s = MdpState::new(0, vec![go.clone()], false).unwrap();
        let t1 = MdpState::terminal(1);
        let t2 = MdpState::terminal(2);
        (s, go, t1, t2)
    }

    #[test]
    fn counts_repeated_outcomes() {
        let (s, go, t1, t2) = pair();
        let mut model = StochasticEnvironmentModel::new();
        for _ in 0..9 {
            model.update(&s, &go, &t1, 1.0);
        }
        model.update(&s, &go, &t2, 0.0);
        assert!(model.is_defined_for(&s, &go));
        assert!(!model.is_defined_for(&t1, &go));

        let mut rng = StdRng::seed_from_u64(5);
        let hits = (0..200)
            .filter(|_| model.sample_outcome(&s, &go, &mut rng).unwrap().0.id() == 1)
            .count();
        assert!(hits > 150);
    }

    #[test]
    fn planning_environment_replays_model() {
        let (s, go, t1, _) = pair();
        let mut env =
            TrajectorySamplingPlanningEnvironment::new("plan", StdRng::seed_from_u64(0), 2, 10)
                .unwrap();
        assert!(env.is_empty());
        assert!(env.reset().is_err());

        env.update_model(&s, &go, &t1, 1.0);
        assert!(!env.is_empty());
        assert_eq!(env.reset().unwrap(), s);
        assert!(env.can_simulate(&s, &go));

        let step = env.step(&go).unwrap();
        assert!(step.done);
        assert_eq!(step.next_state, t1);
        assert!((step.reward - 1.0).abs() < 1e-12);
    }

    #[test]
    fn truncates_long_planning_trajectories() {
        let stay = Action::new(0, "stay");
        let s = MdpState::new(0, vec![stay.clone()], false).unwrap();
        let mut env =
            TrajectorySamplingPlanningEnvironment::new("loop", StdRng::seed_from_u64(0), 1, 2)
                .unwrap();
        env.update_model(&s, &stay, &s, 0.0);
        env.reset().unwrap();
        assert!(!env.step(&stay).unwrap().truncated);
        assert!(env.step(&stay).unwrap().truncated);
    }
}
