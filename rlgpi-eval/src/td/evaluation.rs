//! n-step temporal-difference evaluation with optional Dyna-style planning

use tracing::{debug, info, trace};

use rlgpi_agent::{ActionValueMdpAgent, Schedule};
use rlgpi_core::{
    Action, ActionValueEstimator, Agent, Environment, MdpState, PlanningEnvironment, Result,
    StateActionValueTable, Transition,
};

use super::buffer::NStepBuffer;
use crate::config::TdEvaluationConfig;

/// What happened during a single episode
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpisodeSummary {
    /// Environment steps taken
    pub steps: usize,
    /// Value updates applied
    pub updates: usize,
    /// Undiscounted sum of rewards
    pub total_return: f64,
    /// Whether the episode reached a terminal state
    pub terminated: bool,
}

/// Drives episodes and applies n-step updates to an agent's value table.
///
/// The step size is read from the configured schedule at the running count
/// of updates, planning updates included.
#[derive(Debug)]
pub struct TdEvaluator<'a> {
    config: &'a TdEvaluationConfig,
    n_steps: Option<usize>,
    updates: usize,
    planning_updates: usize,
    planning_episodes: usize,
    updates_since_improvement: usize,
    in_planning: bool,
}

impl<'a> TdEvaluator<'a> {
    /// Validate `config` and create an evaluator
    pub fn new(config: &'a TdEvaluationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            n_steps: config.lookahead()?,
            updates: 0,
            planning_updates: 0,
            planning_episodes: 0,
            updates_since_improvement: 0,
            in_planning: false,
        })
    }

    /// Updates applied so far, real and planned
    #[must_use]
    pub fn num_updates(&self) -> usize {
        self.updates
    }

    /// Updates applied during planning episodes
    #[must_use]
    pub fn num_planning_updates(&self) -> usize {
        self.planning_updates
    }

    /// Planning episodes run so far
    #[must_use]
    pub fn num_planning_episodes(&self) -> usize {
        self.planning_episodes
    }

    /// Run the configured number of real episodes, returning how many ran
    pub fn run<'p, E>(
        &mut self,
        agent: &mut ActionValueMdpAgent,
        environment: &mut E,
        mut planning_environment: Option<&mut (dyn PlanningEnvironment + 'p)>,
    ) -> Result<usize>
    where
        E: Environment + ?Sized,
    {
        for episode in 0..self.config.num_episodes {
            let summary =
                self.run_episode(agent, environment, planning_environment.as_deref_mut())?;
            debug!(
                agent = agent.name(),
                env = environment.name(),
                episode,
                steps = summary.steps,
                updates = summary.updates,
                total_return = summary.total_return,
                terminated = summary.terminated,
                "episode finished"
            );

            if self.config.num_updates_per_improvement.is_none() {
                if let Some(planning) = planning_environment.as_deref_mut() {
                    self.plan(agent, planning)?;
                }
            }
        }

        info!(
            agent = agent.name(),
            mode = %self.config.mode,
            episodes = self.config.num_episodes,
            updates = self.updates,
            planning_episodes = self.planning_episodes,
            "TD evaluation finished"
        );
        Ok(self.config.num_episodes)
    }

    fn run_episode<'p, E>(
        &mut self,
        agent: &mut ActionValueMdpAgent,
        environment: &mut E,
        mut planning: Option<&mut (dyn PlanningEnvironment + 'p)>,
    ) -> Result<EpisodeSummary>
    where
        E: Environment + ?Sized,
    {
        let mut summary = EpisodeSummary::default();
        let mut state = environment.reset()?;
        agent.reset_for_new_run(&state);
        if state.is_terminal() {
            summary.terminated = true;
            return Ok(summary);
        }

        let gamma = agent.gamma();
        let mut buffer = NStepBuffer::new(self.n_steps);
        let mut action = agent.act(0)?;
        let mut t = 0;

        // `None` once a terminal state is reached; otherwise the pair whose
        // value stands in for the unobserved rest of the episode
        let horizon = loop {
            if !environment.can_simulate(&state, &action) {
                break Some((state, action));
            }

            let step = environment.step(&action)?;
            t += 1;
            agent.reward(step.reward);
            if let Some(model) = planning.as_deref_mut() {
                model.update_model(&state, &action, &step.next_state, step.reward);
            }
            buffer.push(Transition::new(state, action, step.reward));
            agent.sense(&step.next_state, t);

            if step.done {
                summary.terminated = true;
                break None;
            }

            let next_action = agent.act(t)?;
            if buffer.is_full() {
                let horizon = Some((&step.next_state, &next_action));
                self.update_oldest(agent, &mut buffer, gamma, horizon)?;
                summary.updates += 1;
                self.plan_if_due(agent, planning.as_deref_mut())?;
            }

            if step.truncated {
                break Some((step.next_state, next_action));
            }
            state = step.next_state;
            action = next_action;
        };

        let horizon = horizon.as_ref().map(|(s, a)| (s, a));
        while !buffer.is_empty() {
            self.update_oldest(agent, &mut buffer, gamma, horizon)?;
            summary.updates += 1;
            self.plan_if_due(agent, planning.as_deref_mut())?;
        }

        summary.steps = t;
        summary.total_return = agent.total_return();
        Ok(summary)
    }

    /// Move the oldest buffered pair toward its n-step return
    fn update_oldest(
        &mut self,
        agent: &mut ActionValueMdpAgent,
        buffer: &mut NStepBuffer,
        gamma: f64,
        horizon: Option<(&MdpState, &Action)>,
    ) -> Result<()> {
        let tail = match horizon {
            Some((state, action)) => self.config.mode.bootstrap(agent, state, action)?,
            None => 0.0,
        };
        let target = buffer.discounted_return(gamma, tail);
        let Some(oldest) = buffer.pop_front() else {
            return Ok(());
        };

        let alpha = self.config.alpha.value(self.updates);
        agent.q_mut().update(&oldest.state, &oldest.action, target, alpha)?;
        self.updates += 1;
        if self.in_planning {
            self.planning_updates += 1;
        }
        Ok(())
    }

    fn plan_if_due<'p>(
        &mut self,
        agent: &mut ActionValueMdpAgent,
        planning: Option<&mut (dyn PlanningEnvironment + 'p)>,
    ) -> Result<()> {
        let (Some(planning), Some(every)) = (planning, self.config.num_updates_per_improvement)
        else {
            return Ok(());
        };
        self.updates_since_improvement += 1;
        if self.updates_since_improvement < every {
            return Ok(());
        }
        self.updates_since_improvement = 0;
        self.plan(agent, planning)
    }

    /// Replay simulated episodes from the learned model.
    ///
    /// The agent's interaction state is restored afterwards so that an
    /// interrupted real episode continues where it stopped.
    fn plan(
        &mut self,
        agent: &mut ActionValueMdpAgent,
        planning: &mut dyn PlanningEnvironment,
    ) -> Result<()> {
        if planning.is_empty() {
            return Ok(());
        }

        let saved = agent.core().save_interaction();
        self.in_planning = true;
        let mut result = Ok(());
        for _ in 0..planning.planning_episodes_per_improvement() {
            match self.run_episode(agent, &mut *planning, None) {
                Ok(summary) => {
                    self.planning_episodes += 1;
                    trace!(
                        env = planning.name(),
                        steps = summary.steps,
                        updates = summary.updates,
                        "planning episode finished"
                    );
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        self.in_planning = false;
        agent.core_mut().restore_interaction(saved);
        result
    }
}

/// Evaluate the agent's action values by n-step temporal-difference updates.
///
/// The agent's own table is updated as episodes run, so its exploration
/// policy follows the improving estimates. With a planning environment, every
/// real transition trains its model and simulated episodes are replayed
/// through the same update at each improvement point. Returns a copy of the
/// final table and the number of real episodes.
pub fn evaluate_q_pi<E>(
    agent: &mut ActionValueMdpAgent,
    environment: &mut E,
    config: &TdEvaluationConfig,
    planning_environment: Option<&mut dyn PlanningEnvironment>,
) -> Result<(StateActionValueTable, usize)>
where
    E: Environment + ?Sized,
{
    let mut evaluator = TdEvaluator::new(config)?;
    let episodes = evaluator.run(agent, environment, planning_environment)?;
    Ok((agent.q().clone(), episodes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rlgpi_agent::Greedy;
    use rlgpi_core::{AgentConfig, Step};

    use crate::td::Mode;

    /// `s0 --go(+1)--> s1 --go(+2)--> end`, always starting in `s0`
    struct Corridor {
        states: Vec<MdpState>,
        current: usize,
    }

    impl Corridor {
        fn new() -> Self {
            let go = vec![Action::new(0, "go")];
            Self {
                states: vec![
                    MdpState::new(0, go.clone(), false).unwrap(),
                    MdpState::new(1, go, false).unwrap(),
                    MdpState::terminal(2),
                ],
                current: 0,
            }
        }
    }

    impl Environment for Corridor {
        fn name(&self) -> &str {
            "corridor"
        }

        fn reset(&mut self) -> Result<MdpState> {
            self.current = 0;
            Ok(self.states[0].clone())
        }

        fn step(&mut self, _action: &Action) -> Result<Step> {
            self.current += 1;
            let reward = self.current as f64;
            Ok(Step::new(self.states[self.current].clone(), reward))
        }
    }

    fn agent() -> ActionValueMdpAgent {
        ActionValueMdpAgent::new(&AgentConfig::new("td", 1.0, 3), Box::new(Greedy)).unwrap()
    }

    #[test]
    fn one_step_updates_bootstrap_from_the_next_pair() {
        let mut env = Corridor::new();
        let mut agent = agent();
        let config = TdEvaluationConfig::new(1, 0.5, Mode::Sarsa, Some(1));
        let (q, episodes) = evaluate_q_pi(&mut agent, &mut env, &config, None).unwrap();

        let go = Action::new(0, "go");
        assert_eq!(episodes, 1);
        // s0 updated first while Q(s1) is still zero
        assert_abs_diff_eq!(q.get(&env.states[0], &go).unwrap(), 0.5);
        assert_abs_diff_eq!(q.get(&env.states[1], &go).unwrap(), 1.0);
    }

    #[test]
    fn full_episode_returns_use_every_reward() {
        let mut env = Corridor::new();
        let mut agent = agent();
        let config = TdEvaluationConfig::new(1, 1.0, Mode::QLearning, None);
        let (q, _) = evaluate_q_pi(&mut agent, &mut env, &config, None).unwrap();

        let go = Action::new(0, "go");
        assert_abs_diff_eq!(q.get(&env.states[0], &go).unwrap(), 3.0);
        assert_abs_diff_eq!(q.get(&env.states[1], &go).unwrap(), 2.0);
    }

    #[test]
    fn counts_one_update_per_step() {
        let mut env = Corridor::new();
        let mut agent = agent();
        let config = TdEvaluationConfig::new(4, 0.1, Mode::ExpectedSarsa, Some(2));
        let mut evaluator = TdEvaluator::new(&config).unwrap();
        evaluator.run(&mut agent, &mut env, None).unwrap();
        assert_eq!(evaluator.num_updates(), 8);
        assert_eq!(evaluator.num_planning_updates(), 0);
        assert_eq!(agent.total_return(), 3.0);
    }

    #[test]
    fn non_positive_lookahead_fails_before_any_episode() {
        let mut env = Corridor::new();
        let mut agent = agent();
        for mode in [Mode::Sarsa, Mode::QLearning, Mode::ExpectedSarsa] {
            for n in [0, -1] {
                let config = TdEvaluationConfig::new(5, 0.1, mode, Some(n));
                let err = evaluate_q_pi(&mut agent, &mut env, &config, None).unwrap_err();
                assert!(err.is_configuration());
            }
        }
        assert!(agent.q().is_empty());
        assert!(agent.most_recent_state().is_none());
    }
}
