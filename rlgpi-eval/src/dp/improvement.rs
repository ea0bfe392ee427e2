//! Greedy policy improvement

use indexmap::IndexMap;
use tracing::debug;

use rlgpi_agent::exploration::TIE_TOLERANCE;
use rlgpi_agent::StochasticMdpAgent;
use rlgpi_core::{
    Action, Agent, GpiError, MdpModel, MdpState, Policy, Result, StateActionValueTable,
};

use super::evaluation::expected_backup;

fn improved_distribution(
    state: &MdpState,
    q_pi: &StateActionValueTable,
    epsilon: f64,
) -> Result<IndexMap<Action, f64>> {
    let greedy = q_pi.greedy_actions(state, TIE_TOLERANCE)?;
    let explore = epsilon / state.actions().len() as f64;
    let exploit = (1.0 - epsilon) / greedy.len() as f64;
    Ok(state
        .actions()
        .iter()
        .map(|a| {
            let p = if greedy.contains(a) { explore + exploit } else { explore };
            (a.clone(), p)
        })
        .collect())
}

fn differs(old: &IndexMap<Action, f64>, new: &IndexMap<Action, f64>) -> bool {
    new.iter()
        .any(|(a, p)| (old.get(a).copied().unwrap_or(0.0) - p).abs() > TIE_TOLERANCE)
}

/// Make the agent's policy greedy with respect to `q_pi`.
///
/// Tied actions share the greedy mass. With `epsilon`, every action first
/// receives `epsilon / |A|`. Returns the number of states whose distribution
/// changed.
pub fn improve_policy_with_q_pi(
    agent: &mut StochasticMdpAgent,
    q_pi: &StateActionValueTable,
    epsilon: Option<f64>,
) -> Result<usize> {
    let epsilon = epsilon.unwrap_or(0.0);
    if !(0.0..=1.0).contains(&epsilon) {
        return Err(GpiError::config(format!("epsilon must lie in [0, 1], got {epsilon}")));
    }

    let mut changed = 0;
    for (state, values) in q_pi.iter() {
        if values.is_empty() {
            continue;
        }
        let new = improved_distribution(state, q_pi, epsilon)?;
        if differs(&agent.policy().action_probabilities(state)?, &new) {
            changed += 1;
        }
        agent.policy_mut().set_distribution(state, new)?;
    }

    debug!(agent = agent.name(), changed, "policy improved");
    Ok(changed)
}

/// One-step lookahead from `v_pi` followed by greedy improvement
pub fn improve_policy_with_v_pi(
    agent: &mut StochasticMdpAgent,
    model: &dyn MdpModel,
    v_pi: &IndexMap<MdpState, f64>,
) -> Result<usize> {
    let q_pi = lookahead(model, v_pi, agent.gamma())?;
    improve_policy_with_q_pi(agent, &q_pi, None)
}

/// `q(s, a) = E[r + gamma * v(s')]` for every pair in the model
pub(crate) fn lookahead(
    model: &dyn MdpModel,
    v: &IndexMap<MdpState, f64>,
    gamma: f64,
) -> Result<StateActionValueTable> {
    let mut q = StateActionValueTable::new(None);
    q.initialize(model.states());
    for state in model.states() {
        for action in state.actions() {
            let value = expected_backup(model, state, action, gamma, |next| {
                v.get(next)
                    .copied()
                    .ok_or_else(|| GpiError::UnknownState(next.to_string()))
            })?;
            q.set(state, action, value)?;
        }
    }
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rlgpi_core::TabularPolicy;

    fn setup() -> (StochasticMdpAgent, MdpState, StateActionValueTable) {
        let state = MdpState::new(
            0,
            vec![Action::new(0, "a"), Action::new(1, "b"), Action::new(2, "c")],
            false,
        )
        .unwrap();
        let mut q = StateActionValueTable::new(None);
        q.initialize([&state, &MdpState::terminal(1)]);
        q.set(&state, &Action::new(0, "a"), 1.0).unwrap();
        q.set(&state, &Action::new(1, "b"), 1.0).unwrap();
        q.set(&state, &Action::new(2, "c"), -1.0).unwrap();
        let rng = StdRng::seed_from_u64(1);
        let agent = StochasticMdpAgent::with_rng("improver", 1.0, rng, TabularPolicy::new());
        (agent, state, q)
    }

    #[test]
    fn ties_share_greedy_mass() {
        let (mut agent, state, q) = setup();
        assert_eq!(improve_policy_with_q_pi(&mut agent, &q, None).unwrap(), 1);
        let p = agent.policy().action_probabilities(&state).unwrap();
        assert_abs_diff_eq!(p[0], 0.5);
        assert_abs_diff_eq!(p[1], 0.5);
        assert_abs_diff_eq!(p[2], 0.0);

        // a second pass over the same estimates changes nothing
        assert_eq!(improve_policy_with_q_pi(&mut agent, &q, None).unwrap(), 0);
    }

    #[test]
    fn epsilon_soft_keeps_every_action_reachable() {
        let (mut agent, state, q) = setup();
        improve_policy_with_q_pi(&mut agent, &q, Some(0.3)).unwrap();
        let p = agent.policy().action_probabilities(&state).unwrap();
        assert_abs_diff_eq!(p[0], 0.1 + 0.35, epsilon = 1e-12);
        assert_abs_diff_eq!(p[2], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn epsilon_out_of_range_is_rejected() {
        let (mut agent, _, q) = setup();
        let err = improve_policy_with_q_pi(&mut agent, &q, Some(1.5)).unwrap_err();
        assert!(err.is_configuration());
    }
}
