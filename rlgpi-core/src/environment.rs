//! Environment traits and types
//!
//! Dynamic programming consumes an explicit model through [`MdpModel`];
//! temporal-difference learning drives an [`Environment`] one step at a time.

use serde::{Deserialize, Serialize};

use crate::{Action, MdpState, Result};

/// One weighted outcome of taking an action in a state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    /// Successor state
    pub next_state: MdpState,
    /// Reward received on the transition
    pub reward: f64,
    /// Probability of this (next state, reward) pair
    pub probability: f64,
}

/// Explicit transition model p(s', r | s, a)
pub trait MdpModel {
    /// Every state, in sweep order
    fn states(&self) -> &[MdpState];

    /// Outcomes of taking `action` in `state`; probabilities sum to one
    fn outcomes(&self, state: &MdpState, action: &Action) -> Result<&[Outcome]>;
}

/// Result of a single environment step
#[derive(Debug, Clone)]
pub struct Step {
    /// State after the step
    pub next_state: MdpState,
    /// Reward signal
    pub reward: f64,
    /// Whether the episode reached a terminal state
    pub done: bool,
    /// Whether the episode was cut short (e.g., time limit)
    pub truncated: bool,
}

impl Step {
    /// Build a step whose `done` flag follows the next state
    #[must_use]
    pub fn new(next_state: MdpState, reward: f64) -> Self {
        let done = next_state.is_terminal();
        Self {
            next_state,
            reward,
            done,
            truncated: false,
        }
    }
}

/// Step-by-step simulation contract used by TD evaluation
pub trait Environment {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Start a new episode and return its initial state
    fn reset(&mut self) -> Result<MdpState>;

    /// Advance simulated time by taking `action` in the current state
    fn step(&mut self, action: &Action) -> Result<Step>;

    /// Whether `step` can be taken for this pair.
    ///
    /// Learned models return `false` for pairs they have never observed.
    fn can_simulate(&self, _state: &MdpState, _action: &Action) -> bool {
        true
    }
}

/// An environment backed by a model that learns from real experience
pub trait PlanningEnvironment: Environment {
    /// Record a real transition
    fn update_model(
        &mut self,
        state: &MdpState,
        action: &Action,
        next_state: &MdpState,
        reward: f64,
    );

    /// Whether no transition has been recorded yet
    fn is_empty(&self) -> bool;

    /// Simulated episodes to run after each improvement point
    fn planning_episodes_per_improvement(&self) -> usize;
}
