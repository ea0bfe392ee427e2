//! Finite MDP environments for generalized policy iteration
//!
//! This crate provides:
//! - a tabular environment with an explicit transition model
//! - gridworld and Gambler's problem constructors
//! - a time-limit wrapper
//! - a learned-model planning environment for Dyna-style updates

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod gambler;
pub mod gridworld;
pub mod mdp;
pub mod planning;
pub mod wrappers;

// Re-export environments
pub use gambler::gamblers_problem;
pub use gridworld::{move_actions, Gridworld};
pub use mdp::MdpEnvironment;
pub use planning::{StochasticEnvironmentModel, TrajectorySamplingPlanningEnvironment};
pub use wrappers::TimeLimit;

// Re-export core types
pub use rlgpi_core::{Environment, MdpModel, MdpState, Outcome, PlanningEnvironment, Step};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        gamblers_problem, Gridworld, MdpEnvironment, TimeLimit,
        TrajectorySamplingPlanningEnvironment,
    };
    pub use rlgpi_core::prelude::*;
}
