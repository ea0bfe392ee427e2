//! Tabular MDP agents for generalized policy iteration
//!
//! This crate provides:
//! - a policy-driven agent for dynamic-programming evaluation
//! - an action-value agent with pluggable exploration for TD learning
//! - step-size schedules and return helpers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action_value;
pub mod exploration;
pub mod stochastic;
pub mod utils;

// Re-export agents
pub use action_value::ActionValueMdpAgent;
pub use stochastic::StochasticMdpAgent;

// Re-export exploration and utilities
pub use exploration::{sample_action, ActionSelector, EpsilonGreedy, Greedy, Softmax};
pub use utils::{discounted_return, ExponentialSchedule, LinearSchedule, Schedule, StepSize};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ActionSelector, ActionValueMdpAgent, EpsilonGreedy, Greedy, Schedule, StepSize,
        StochasticMdpAgent,
    };
    pub use rlgpi_core::prelude::*;
}
