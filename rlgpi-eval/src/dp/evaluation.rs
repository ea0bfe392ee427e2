//! Iterative policy evaluation over an explicit model

use std::hash::Hash;

use indexmap::IndexMap;
use tracing::{debug, info};

use rlgpi_core::{Action, Agent, MdpModel, MdpState, Result, StateActionValueTable};

use crate::termination::check_termination_criteria;

/// Outcome of a state-value evaluation
#[derive(Debug, Clone)]
pub struct StateValueEvaluation {
    /// Estimated value of every state, in model order
    pub values: IndexMap<MdpState, f64>,
    /// Sweeps performed
    pub iterations: usize,
    /// Largest change in the final sweep
    pub delta: f64,
}

/// Run one sweep over `values`, returning the largest change.
///
/// With `update_in_place` each new value is visible to the keys after it in
/// the same sweep; otherwise every backup reads a snapshot taken before the
/// sweep. `backup` returns `None` for keys that keep their current value.
fn sweep<K, F>(values: &mut IndexMap<K, f64>, update_in_place: bool, mut backup: F) -> Result<f64>
where
    K: Clone + Eq + Hash,
    F: FnMut(&K, &IndexMap<K, f64>) -> Result<Option<f64>>,
{
    let snapshot = (!update_in_place).then(|| values.clone());
    let mut delta = 0.0_f64;

    for i in 0..values.len() {
        let Some((key, old)) = values.get_index(i).map(|(k, v)| (k.clone(), *v)) else {
            continue;
        };
        let source = snapshot.as_ref().unwrap_or(&*values);
        if let Some(new) = backup(&key, source)? {
            delta = delta.max((new - old).abs());
            if let Some((_, value)) = values.get_index_mut(i) {
                *value = new;
            }
        }
    }

    Ok(delta)
}

/// Repeat sweeps until a stopping criterion fires
fn run_sweeps<K, F>(
    values: &mut IndexMap<K, f64>,
    label: &str,
    theta: Option<f64>,
    num_iterations: Option<i64>,
    update_in_place: bool,
    mut backup: F,
) -> Result<(usize, f64)>
where
    K: Clone + Eq + Hash,
    F: FnMut(&K, &IndexMap<K, f64>) -> Result<Option<f64>>,
{
    let (theta, num_iterations) = check_termination_criteria(theta, num_iterations)?;

    let mut iterations = 0;
    loop {
        let delta = sweep(values, update_in_place, &mut backup)?;
        iterations += 1;
        debug!(label, iteration = iterations, delta, "sweep finished");

        let converged = theta.is_some_and(|theta| delta < theta);
        if converged || num_iterations.is_some_and(|cap| iterations >= cap) {
            info!(label, iterations, delta, converged, "evaluation finished");
            return Ok((iterations, delta));
        }
    }
}

fn policy_table<A>(
    agent: &A,
    model: &dyn MdpModel,
) -> Result<IndexMap<MdpState, IndexMap<Action, f64>>>
where
    A: Agent + ?Sized,
{
    model
        .states()
        .iter()
        .map(|s| Ok((s.clone(), agent.action_probabilities(s)?)))
        .collect()
}

/// Expected `r + gamma * v(s')` over the outcomes of `action` in `state`
pub(crate) fn expected_backup<F>(
    model: &dyn MdpModel,
    state: &MdpState,
    action: &Action,
    gamma: f64,
    mut next_value: F,
) -> Result<f64>
where
    F: FnMut(&MdpState) -> Result<f64>,
{
    model.outcomes(state, action)?.iter().try_fold(0.0, |total, o| {
        Ok(total + o.probability * (o.reward + gamma * next_value(&o.next_state)?))
    })
}

/// Evaluate the state-value function of the agent's policy.
///
/// Every state starts at zero. Returns the values and the number of sweeps.
pub fn evaluate_v_pi<A>(
    agent: &A,
    model: &dyn MdpModel,
    theta: Option<f64>,
    num_iterations: Option<i64>,
    update_in_place: bool,
) -> Result<(IndexMap<MdpState, f64>, usize)>
where
    A: Agent + ?Sized,
{
    let evaluation =
        evaluate_v_pi_from(agent, model, IndexMap::new(), theta, num_iterations, update_in_place)?;
    Ok((evaluation.values, evaluation.iterations))
}

/// Evaluate the state-value function starting from `initial_values`.
///
/// States missing from `initial_values` start at zero; terminal states are
/// pinned to zero.
pub fn evaluate_v_pi_from<A>(
    agent: &A,
    model: &dyn MdpModel,
    initial_values: IndexMap<MdpState, f64>,
    theta: Option<f64>,
    num_iterations: Option<i64>,
    update_in_place: bool,
) -> Result<StateValueEvaluation>
where
    A: Agent + ?Sized,
{
    let gamma = agent.gamma();
    let policy = policy_table(agent, model)?;

    let mut values: IndexMap<MdpState, f64> = model
        .states()
        .iter()
        .map(|s| {
            let v = if s.is_terminal() {
                0.0
            } else {
                initial_values.get(s).copied().unwrap_or(0.0)
            };
            (s.clone(), v)
        })
        .collect();

    let (iterations, delta) = run_sweeps(
        &mut values,
        "v_pi",
        theta,
        num_iterations,
        update_in_place,
        |state, current| {
            let Some(distribution) = policy.get(state).filter(|d| !d.is_empty()) else {
                return Ok(None);
            };
            let mut value = 0.0;
            for (action, p) in distribution {
                value += p * expected_backup(model, state, action, gamma, |next| {
                    Ok(current.get(next).copied().unwrap_or(0.0))
                })?;
            }
            Ok(Some(value))
        },
    )?;

    Ok(StateValueEvaluation {
        values,
        iterations,
        delta,
    })
}

/// Evaluate the action-value function of the agent's policy.
///
/// Returns a table holding every non-terminal state-action pair and the
/// number of sweeps.
pub fn evaluate_q_pi<A>(
    agent: &A,
    model: &dyn MdpModel,
    theta: Option<f64>,
    num_iterations: Option<i64>,
    update_in_place: bool,
) -> Result<(StateActionValueTable, usize)>
where
    A: Agent + ?Sized,
{
    let gamma = agent.gamma();
    let policy = policy_table(agent, model)?;

    let mut values: IndexMap<(MdpState, Action), f64> = model
        .states()
        .iter()
        .flat_map(|s| s.actions().iter().map(move |a| ((s.clone(), a.clone()), 0.0)))
        .collect();

    let (iterations, _) = run_sweeps(
        &mut values,
        "q_pi",
        theta,
        num_iterations,
        update_in_place,
        |(state, action), current| {
            let value = expected_backup(model, state, action, gamma, |next| {
                let Some(distribution) = policy.get(next) else {
                    return Ok(0.0);
                };
                Ok(distribution
                    .iter()
                    .map(|(a, p)| {
                        p * current
                            .get(&(next.clone(), a.clone()))
                            .copied()
                            .unwrap_or(0.0)
                    })
                    .sum())
            })?;
            Ok(Some(value))
        },
    )?;

    let mut table = StateActionValueTable::new(None);
    table.initialize(model.states());
    for ((state, action), value) in values {
        table.set(&state, &action, value)?;
    }
    Ok((table, iterations))
}
