//! Policy evaluation and improvement engines for finite MDPs
//!
//! This crate provides:
//! - iterative policy evaluation, improvement, policy iteration and value
//!   iteration over an explicit model
//! - n-step SARSA, Q-learning and expected SARSA evaluation, with optional
//!   Dyna-style planning through a learned model
//! - serde run configurations for both engines

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dp;
pub mod td;
pub mod termination;

pub use config::{DpEvaluationConfig, TdEvaluationConfig};
pub use termination::check_termination_criteria;
pub use td::{Mode, TdEvaluator};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dp::{
        evaluate_q_pi as evaluate_q_pi_dp, evaluate_v_pi, improve_policy_with_q_pi,
        iterate_policy_q_pi, iterate_policy_v_pi, iterate_value_v_pi,
    };
    pub use crate::td::evaluate_q_pi as evaluate_q_pi_td;
    pub use crate::{
        check_termination_criteria, DpEvaluationConfig, Mode, TdEvaluationConfig, TdEvaluator,
    };
    pub use rlgpi_agent::prelude::*;
}
