//! Policy iteration and value iteration on the textbook examples

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use rlgpi_agent::StochasticMdpAgent;
use rlgpi_core::{MdpModel, Policy, TabularPolicy};
use rlgpi_env::{gamblers_problem, Gridworld};
use rlgpi_eval::dp::{iterate_policy_q_pi, iterate_policy_v_pi, iterate_value_v_pi};

fn agent() -> StochasticMdpAgent {
    StochasticMdpAgent::with_rng("test", 1.0, StdRng::seed_from_u64(12345), TabularPolicy::new())
}

/// Moves to the nearest terminal corner of the 4x4 grid
fn distance_to_corner(cell: usize) -> f64 {
    let (row, col) = (cell / 4, cell % 4);
    (row + col).min((3 - row) + (3 - col)) as f64
}

#[test]
fn policy_iteration_finds_shortest_paths() {
    let env = Gridworld::example_4_1(StdRng::seed_from_u64(0)).unwrap();
    let mut agent = agent();

    let (v, improvements) = iterate_policy_v_pi(&mut agent, &env, 1e-6, true).unwrap();

    assert!(improvements >= 2, "the equiprobable policy is not optimal");
    for (state, value) in &v {
        assert_abs_diff_eq!(*value, -distance_to_corner(state.id()), epsilon = 1e-6);
    }

    // cell 1 should head left, never right
    let cell_1 = env.states()[1].clone();
    let p = agent.policy().action_probabilities(&cell_1).unwrap();
    assert_abs_diff_eq!(p[2], 1.0);
}

#[test]
fn action_value_policy_iteration_agrees() {
    let env = Gridworld::example_4_1(StdRng::seed_from_u64(0)).unwrap();
    let mut agent = agent();

    let (q, _) = iterate_policy_q_pi(&mut agent, &env, 1e-6, false, None).unwrap();
    for state in env.states().iter().filter(|s| !s.is_terminal()) {
        let best = q.max_value(state).unwrap().unwrap();
        assert_abs_diff_eq!(best, -distance_to_corner(state.id()), epsilon = 1e-6);
    }
}

#[test]
fn value_iteration_solves_gamblers_problem() {
    for update_in_place in [true, false] {
        let env = gamblers_problem(0.4, 100, StdRng::seed_from_u64(0)).unwrap();
        let mut agent = agent();

        let (v, _) = iterate_value_v_pi(&mut agent, &env, 1e-9, 1, update_in_place).unwrap();

        let value = |capital: usize| v[&env.states()[capital]];
        assert_abs_diff_eq!(value(50), 0.4, epsilon = 1e-6);
        assert_abs_diff_eq!(value(25), 0.16, epsilon = 1e-6);
        assert_abs_diff_eq!(value(75), 0.64, epsilon = 1e-6);
        assert_abs_diff_eq!(value(0), 0.0);
        assert_abs_diff_eq!(value(100), 0.0);
    }
}

#[test]
fn iteration_rejects_bad_settings() {
    let env = Gridworld::example_4_1(StdRng::seed_from_u64(0)).unwrap();
    let mut agent = agent();
    assert!(iterate_policy_v_pi(&mut agent, &env, 0.0, true)
        .unwrap_err()
        .is_configuration());
    assert!(iterate_value_v_pi(&mut agent, &env, 1e-3, 0, true)
        .unwrap_err()
        .is_configuration());
    assert!(iterate_policy_q_pi(&mut agent, &env, 1e-3, true, Some(2.0))
        .unwrap_err()
        .is_configuration());
}
