//! Policy iteration and value iteration

use indexmap::IndexMap;
use tracing::info;

use rlgpi_agent::StochasticMdpAgent;
use rlgpi_core::{Agent, GpiError, MdpModel, MdpState, Result, StateActionValueTable};

use super::evaluation::{evaluate_q_pi, evaluate_v_pi, evaluate_v_pi_from};
use super::improvement::{improve_policy_with_q_pi, improve_policy_with_v_pi};

fn require_theta(theta: f64) -> Result<()> {
    if theta > 0.0 {
        Ok(())
    } else {
        Err(GpiError::config(format!("theta must be positive, got {theta}")))
    }
}

/// Alternate full state-value evaluation and greedy improvement until the
/// policy is stable. Returns the final values and the number of improvements.
pub fn iterate_policy_v_pi(
    agent: &mut StochasticMdpAgent,
    model: &dyn MdpModel,
    theta: f64,
    update_in_place: bool,
) -> Result<(IndexMap<MdpState, f64>, usize)> {
    require_theta(theta)?;

    let mut improvements = 0;
    loop {
        let (v_pi, _) = evaluate_v_pi(&*agent, model, Some(theta), None, update_in_place)?;
        let changed = improve_policy_with_v_pi(agent, model, &v_pi)?;
        improvements += 1;
        if changed == 0 {
            info!(agent = agent.name(), improvements, "policy iteration converged");
            return Ok((v_pi, improvements));
        }
    }
}

/// Policy iteration on action values, optionally epsilon-soft
pub fn iterate_policy_q_pi(
    agent: &mut StochasticMdpAgent,
    model: &dyn MdpModel,
    theta: f64,
    update_in_place: bool,
    epsilon: Option<f64>,
) -> Result<(StateActionValueTable, usize)> {
    require_theta(theta)?;

    let mut improvements = 0;
    loop {
        let (q_pi, _) = evaluate_q_pi(&*agent, model, Some(theta), None, update_in_place)?;
        let changed = improve_policy_with_q_pi(agent, &q_pi, epsilon)?;
        improvements += 1;
        if changed == 0 {
            info!(agent = agent.name(), improvements, "policy iteration converged");
            return Ok((q_pi, improvements));
        }
    }
}

/// Value iteration with truncated evaluation.
///
/// Each round runs `evaluation_iterations_per_improvement` sweeps starting
/// from the previous estimate, then improves greedily. Stops once a round's
/// final sweep changes no value by `theta` or more.
pub fn iterate_value_v_pi(
    agent: &mut StochasticMdpAgent,
    model: &dyn MdpModel,
    theta: f64,
    evaluation_iterations_per_improvement: usize,
    update_in_place: bool,
) -> Result<(IndexMap<MdpState, f64>, usize)> {
    require_theta(theta)?;
    let sweeps = i64::try_from(evaluation_iterations_per_improvement)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            GpiError::config("evaluation_iterations_per_improvement must be positive")
        })?;

    let mut v = IndexMap::new();
    let mut improvements = 0;
    loop {
        let evaluation =
            evaluate_v_pi_from(&*agent, model, v, None, Some(sweeps), update_in_place)?;
        improve_policy_with_v_pi(agent, model, &evaluation.values)?;
        improvements += 1;
        v = evaluation.values;
        if evaluation.delta < theta {
            info!(
                agent = agent.name(),
                improvements,
                delta = evaluation.delta,
                "value iteration converged"
            );
            return Ok((v, improvements));
        }
    }
}
