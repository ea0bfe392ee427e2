//! Agent whose behaviour is derived from its own action-value estimates

use indexmap::IndexMap;
use rand::rngs::StdRng;
use tracing::{debug, trace};

use rlgpi_core::{
    Action, ActionValueEstimator, Agent, AgentConfig, AgentCore, GpiError, MdpState, Result,
    StateActionValueTable,
};

use crate::exploration::ActionSelector;

/// Agent that learns Q(s, a) and explores through a pluggable selector.
///
/// The table starts with a default of zero, so states discovered during an
/// episode are seeded on first touch.
pub struct ActionValueMdpAgent {
    core: AgentCore,
    q: StateActionValueTable,
    selector: Box<dyn ActionSelector>,
}

impl ActionValueMdpAgent {
    /// Create from configuration
    pub fn new(config: &AgentConfig, selector: Box<dyn ActionSelector>) -> Result<Self> {
        Ok(Self {
            core: AgentCore::from_config(config)?,
            q: StateActionValueTable::new(Some(0.0)),
            selector,
        })
    }

    /// Create with an explicit random source
    pub fn with_rng(
        name: impl Into<String>,
        gamma: f64,
        rng: StdRng,
        selector: Box<dyn ActionSelector>,
    ) -> Self {
        Self {
            core: AgentCore::new(name, gamma, rng),
            q: StateActionValueTable::new(Some(0.0)),
            selector,
        }
    }

    /// Start from an existing table instead of zeros
    #[must_use]
    pub fn with_table(mut self, q: StateActionValueTable) -> Self {
        self.q = q;
        self
    }

    /// Current estimates
    #[must_use]
    pub fn q(&self) -> &StateActionValueTable {
        &self.q
    }

    /// Mutable estimates, for the evaluation engines
    pub fn q_mut(&mut self) -> &mut StateActionValueTable {
        &mut self.q
    }

    /// Swap the exploration policy
    pub fn set_selector(&mut self, selector: Box<dyn ActionSelector>) {
        debug!(agent = self.core.name(), "exploration selector replaced");
        self.selector = selector;
    }
}

impl std::fmt::Debug for ActionValueMdpAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionValueMdpAgent")
            .field("name", &self.core.name())
            .field("gamma", &self.core.gamma())
            .field("states", &self.q.len())
            .finish_non_exhaustive()
    }
}

impl Agent for ActionValueMdpAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn select_action(&mut self, _t: usize) -> Result<Option<Action>> {
        let state = self.core.most_recent_state().cloned().ok_or_else(|| {
            GpiError::Agent(format!("agent {} has not sensed a state", self.core.name()))
        })?;
        let q: &dyn ActionValueEstimator = &self.q;
        let action = self.selector.choose_action(&state, q, self.core.rng_mut())?;
        trace!(agent = self.core.name(), %state, ?action, "action selected");
        Ok(action)
    }

    fn action_probabilities(&self, state: &MdpState) -> Result<IndexMap<Action, f64>> {
        self.selector.action_probabilities(state, &self.q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exploration::{EpsilonGreedy, Greedy};

    fn state() -> MdpState {
        MdpState::new(0, vec![Action::new(0, "a"), Action::new(1, "b")], false).unwrap()
    }

    #[test]
    fn greedy_agent_follows_table() {
        let s = state();
        let mut agent =
            ActionValueMdpAgent::new(&AgentConfig::new("q", 0.9, 1), Box::new(Greedy)).unwrap();
        agent.q_mut().set(&s, &Action::new(1, "b"), 3.0).unwrap();
        agent.sense(&s, 0);
        assert_eq!(agent.act(0).unwrap().id(), 1);
    }

    #[test]
    fn probabilities_come_from_selector() {
        let s = state();
        let agent = ActionValueMdpAgent::new(
            &AgentConfig::new("q", 1.0, 1),
            Box::new(EpsilonGreedy::new(0.5).unwrap()),
        )
        .unwrap();
        let probs = agent.action_probabilities(&s).unwrap();
        assert!((probs[&Action::new(0, "a")] - 0.5).abs() < 1e-12);
    }
}
