//! Example: evaluate, improve and learn on the 4x4 gridworld
//!
//! Run with `RUST_LOG=rlgpi_eval=debug` to see every sweep and episode.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rlgpi_agent::{ActionValueMdpAgent, EpsilonGreedy, StochasticMdpAgent};
use rlgpi_core::{AgentConfig, MdpModel, TabularPolicy};
use rlgpi_env::{Gridworld, TimeLimit, TrajectorySamplingPlanningEnvironment};
use rlgpi_eval::dp::{evaluate_v_pi, iterate_policy_v_pi};
use rlgpi_eval::td::{evaluate_q_pi, Mode};
use rlgpi_eval::{DpEvaluationConfig, TdEvaluationConfig};

fn print_grid(label: &str, values: impl Iterator<Item = f64>) {
    println!("{label}");
    let values: Vec<f64> = values.collect();
    for row in values.chunks(4) {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:7.2}")).collect();
        println!("  {}", cells.join(" "));
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let env = Gridworld::example_4_1(StdRng::seed_from_u64(12345))?;

    // Iterative policy evaluation of the equiprobable policy
    let dp = DpEvaluationConfig::default();
    let mut agent = StochasticMdpAgent::new(
        &AgentConfig::new("planner", 1.0, 12345),
        TabularPolicy::equiprobable_over(env.states()),
    )?;
    let (v_pi, sweeps) =
        evaluate_v_pi(&agent, &env, dp.theta, dp.num_iterations, dp.update_in_place)?;
    info!(sweeps, "evaluated the equiprobable policy");
    print_grid("v_pi (equiprobable):", v_pi.values().copied());

    // Policy iteration
    let (v_star, improvements) = iterate_policy_v_pi(&mut agent, &env, 1e-6, true)?;
    info!(improvements, "policy iteration converged");
    print_grid("v_* (policy iteration):", v_star.values().copied());

    // Q-learning with Dyna planning
    let mut learner = ActionValueMdpAgent::new(
        &AgentConfig::new("learner", 1.0, 12345),
        Box::new(EpsilonGreedy::new(0.1)?),
    )?;
    let mut planning =
        TrajectorySamplingPlanningEnvironment::new("dyna", StdRng::seed_from_u64(7), 5, 50)?;
    let mut world = TimeLimit::new(env.clone(), 500);
    let td = TdEvaluationConfig::new(200, 0.1, Mode::QLearning, Some(1));
    let (q, episodes) = evaluate_q_pi(&mut learner, &mut world, &td, Some(&mut planning))?;
    info!(episodes, "Q-learning finished");

    let greedy_values = env
        .states()
        .iter()
        .map(|s| q.max_value(s).map(|v| v.unwrap_or(0.0)))
        .collect::<rlgpi_core::Result<Vec<_>>>()?;
    print_grid("max_a Q(s, a) (Dyna-Q):", greedy_values.into_iter());

    Ok(())
}
