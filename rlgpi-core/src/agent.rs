//! Agent traits and types

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::{Action, GpiError, MdpState, Result};

fn default_gamma() -> f64 {
    1.0
}

/// Configuration for agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Name used in logs and error messages
    pub name: String,
    /// Discount factor
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    /// Random seed; `None` draws a fresh seed from the OS
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "agent".to_string(),
            gamma: default_gamma(),
            seed: None,
        }
    }
}

impl AgentConfig {
    /// Create a named, seeded configuration
    pub fn new(name: impl Into<String>, gamma: f64, seed: u64) -> Self {
        Self {
            name: name.into(),
            gamma,
            seed: Some(seed),
        }
    }

    /// Check the discount factor
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(GpiError::config(format!(
                "gamma must lie in [0, 1], got {}",
                self.gamma
            )));
        }
        Ok(())
    }

    /// Build the agent's random source
    #[must_use]
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Interaction state shared by every agent implementation
#[derive(Debug, Clone)]
pub struct AgentCore {
    name: String,
    gamma: f64,
    rng: StdRng,
    most_recent_state: Option<MdpState>,
    most_recent_action: Option<Action>,
    t: usize,
    total_return: f64,
}

impl AgentCore {
    /// Create from a validated configuration
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.name.clone(), config.gamma, config.rng()))
    }

    /// Create with an explicit random source
    pub fn new(name: impl Into<String>, gamma: f64, rng: StdRng) -> Self {
        Self {
            name: name.into(),
            gamma,
            rng,
            most_recent_state: None,
            most_recent_action: None,
            t: 0,
            total_return: 0.0,
        }
    }

    /// Agent name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Discount factor
    #[must_use]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Random source
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Most recently sensed state
    #[must_use]
    pub fn most_recent_state(&self) -> Option<&MdpState> {
        self.most_recent_state.as_ref()
    }

    /// Most recently taken action
    #[must_use]
    pub fn most_recent_action(&self) -> Option<&Action> {
        self.most_recent_action.as_ref()
    }

    /// Timestep of the most recent sense or act
    #[must_use]
    pub fn t(&self) -> usize {
        self.t
    }

    /// Running total of rewards received since the last reset
    #[must_use]
    pub fn total_return(&self) -> f64 {
        self.total_return
    }

    /// Capture the per-episode interaction state
    #[must_use]
    pub fn save_interaction(&self) -> InteractionState {
        InteractionState {
            state: self.most_recent_state.clone(),
            action: self.most_recent_action.clone(),
            t: self.t,
            total_return: self.total_return,
        }
    }

    /// Put back a previously captured interaction state; the RNG is untouched
    pub fn restore_interaction(&mut self, saved: InteractionState) {
        self.most_recent_state = saved.state;
        self.most_recent_action = saved.action;
        self.t = saved.t;
        self.total_return = saved.total_return;
    }
}

/// Sensed state, last action, timestep and running return of an agent
#[derive(Debug, Clone)]
pub struct InteractionState {
    state: Option<MdpState>,
    action: Option<Action>,
    t: usize,
    total_return: f64,
}

/// Core agent trait.
///
/// Implementors supply the action-selection hook; `act` wraps it with the
/// contract checks so a faulty hook surfaces as an error instead of a bad
/// update.
pub trait Agent {
    /// Shared interaction state
    fn core(&self) -> &AgentCore;

    /// Mutable shared interaction state
    fn core_mut(&mut self) -> &mut AgentCore;

    /// Pick an action for the most recently sensed state
    fn select_action(&mut self, t: usize) -> Result<Option<Action>>;

    /// The agent's current action distribution in `state`
    fn action_probabilities(&self, state: &MdpState) -> Result<IndexMap<Action, f64>>;

    /// Agent name
    fn name(&self) -> &str {
        self.core().name()
    }

    /// Discount factor
    fn gamma(&self) -> f64 {
        self.core().gamma()
    }

    /// Most recently sensed state
    fn most_recent_state(&self) -> Option<&MdpState> {
        self.core().most_recent_state()
    }

    /// Most recently taken action
    fn most_recent_action(&self) -> Option<&Action> {
        self.core().most_recent_action()
    }

    /// Running total of rewards since the last reset
    fn total_return(&self) -> f64 {
        self.core().total_return()
    }

    /// Record the current state
    fn sense(&mut self, state: &MdpState, t: usize) {
        let core = self.core_mut();
        core.most_recent_state = Some(state.clone());
        core.t = t;
    }

    /// Select an action, failing if none is returned or it is infeasible
    fn act(&mut self, t: usize) -> Result<Action> {
        let action = self.select_action(t)?.ok_or_else(|| GpiError::NoAction {
            agent: self.name().to_string(),
        })?;

        let state = self.most_recent_state().ok_or_else(|| {
            GpiError::Agent(format!("agent {} acted before sensing a state", self.name()))
        })?;
        if !state.is_feasible(&action) {
            return Err(GpiError::InfeasibleAction {
                action: action.to_string(),
                state: state.to_string(),
            });
        }

        let core = self.core_mut();
        core.most_recent_action = Some(action.clone());
        core.t = t;
        Ok(action)
    }

    /// Add a reward to the running return
    fn reward(&mut self, reward: f64) {
        self.core_mut().total_return += reward;
    }

    /// Clear per-run state and sense the initial state
    fn reset_for_new_run(&mut self, state: &MdpState) {
        let core = self.core_mut();
        core.most_recent_action = None;
        core.total_return = 0.0;
        self.sense(state, 0);
    }
}
