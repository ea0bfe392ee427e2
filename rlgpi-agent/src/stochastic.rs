//! Agent that samples actions from an explicit tabular policy

use indexmap::IndexMap;
use rand::rngs::StdRng;
use tracing::trace;

use rlgpi_core::{
    Action, Agent, AgentConfig, AgentCore, GpiError, MdpState, Policy, Result, TabularPolicy,
};

use crate::exploration::sample_action;

/// Policy-driven agent, the subject of dynamic-programming evaluation
#[derive(Debug, Clone)]
pub struct StochasticMdpAgent {
    core: AgentCore,
    policy: TabularPolicy,
}

impl StochasticMdpAgent {
    /// Create from configuration
    pub fn new(config: &AgentConfig, policy: TabularPolicy) -> Result<Self> {
        Ok(Self {
            core: AgentCore::from_config(config)?,
            policy,
        })
    }

    /// Create with an explicit random source
    pub fn with_rng(
        name: impl Into<String>,
        gamma: f64,
        rng: StdRng,
        policy: TabularPolicy,
    ) -> Self {
        Self {
            core: AgentCore::new(name, gamma, rng),
            policy,
        }
    }

    /// The agent's policy
    #[must_use]
    pub fn policy(&self) -> &TabularPolicy {
        &self.policy
    }

    /// Mutable access for improvement steps
    pub fn policy_mut(&mut self) -> &mut TabularPolicy {
        &mut self.policy
    }
}

impl Agent for StochasticMdpAgent {
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
        let probabilities = self.policy.action_probabilities(&state)?;
        let action = sample_action(&probabilities, self.core.rng_mut())?;
        trace!(agent = self.core.name(), %state, ?action, "policy sampled");
        Ok(action)
    }

    fn action_probabilities(&self, state: &MdpState) -> Result<IndexMap<Action, f64>> {
        self.policy.action_probabilities(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> MdpState {
        MdpState::new(0, vec![Action::new(0, "left"), Action::new(1, "right")], false).unwrap()
    }

    #[test]
    fn samples_only_supported_actions() {
        let s = state();
        let mut policy = TabularPolicy::new();
        let dist: IndexMap<Action, f64> = [(Action::new(1, "right"), 1.0)].into_iter().collect();
        policy.set_distribution(&s, dist).unwrap();

        let mut agent = StochasticMdpAgent::new(&AgentConfig::new("det", 1.0, 3), policy).unwrap();
        agent.sense(&s, 0);
        for t in 0..25 {
            assert_eq!(agent.act(t).unwrap().id(), 1);
        }
    }

    #[test]
    fn same_seed_same_actions() {
        let s = state();
        let run = |seed| {
            let config = AgentConfig::new("r", 1.0, seed);
            let mut agent = StochasticMdpAgent::new(&config, TabularPolicy::new()).unwrap();
            agent.sense(&s, 0);
            (0..50).map(|t| agent.act(t).unwrap().id()).collect::<Vec<_>>()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn terminal_state_produces_no_action_error() {
        let config = AgentConfig::new("end", 1.0, 0);
        let mut agent = StochasticMdpAgent::new(&config, TabularPolicy::new()).unwrap();
        agent.sense(&MdpState::terminal(4), 0);
        assert!(matches!(agent.act(0), Err(GpiError::NoAction { .. })));
    }
}
