//! Core MDP types and agent/environment contracts for generalized policy iteration
//!
//! This crate provides the state, action, value-table and policy types that
//! the evaluation engines read and write, together with the traits agents and
//! environments implement to take part in a run.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod agent;
pub mod environment;
pub mod error;
pub mod policy;
pub mod state;
pub mod trajectory;
pub mod value;

// Re-export core traits and types
pub use action::Action;
pub use agent::{Agent, AgentConfig, AgentCore, InteractionState};
pub use environment::{Environment, MdpModel, Outcome, PlanningEnvironment, Step};
pub use error::{GpiError, Result};
pub use policy::{equiprobable, Policy, TabularPolicy};
pub use state::MdpState;
pub use trajectory::Transition;
pub use value::{ActionValueEstimator, StateActionValueTable};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, ActionValueEstimator, Agent, AgentConfig, Environment, GpiError, MdpModel,
        MdpState, PlanningEnvironment, Policy, Result, StateActionValueTable, Step,
        TabularPolicy,
    };
}
