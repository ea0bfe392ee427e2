//! Environment wrappers

use rlgpi_core::{Action, Environment, MdpState, Result, Step};

/// Time limit wrapper
pub struct TimeLimit<E> {
    /// Inner environment
    pub env: E,
    /// Maximum steps
    pub max_steps: usize,
    /// Current step count
    pub steps: usize,
}

impl<E> TimeLimit<E> {
    /// Create a new time limit wrapper
    pub fn new(env: E, max_steps: usize) -> Self {
        Self {
            env,
            max_steps,
            steps: 0,
        }
    }
}

impl<E> Environment for TimeLimit<E>
where
    E: Environment,
{
    fn name(&self) -> &str {
        self.env.name()
    }

    fn reset(&mut self) -> Result<MdpState> {
        self.steps = 0;
        self.env.reset()
    }

    fn step(&mut self, action: &Action) -> Result<Step> {
        self.steps += 1;
        let mut step = self.env.step(action)?;

        if self.steps >= self.max_steps && !step.done {
            step.truncated = true;
        }

        Ok(step)
    }

    fn can_simulate(&self, state: &MdpState, action: &Action) -> bool {
        self.env.can_simulate(state, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gridworld::{move_actions, Gridworld};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn truncates_after_max_steps() {
        let env = Gridworld::example_4_1(StdRng::seed_from_u64(0)).unwrap();
        let mut env = TimeLimit::new(env, 3);
        env.reset().unwrap();
        env.env.set_state(5).unwrap();

        // walk into the left wall until the limit
        let left = &move_actions()[2];
        let steps: Vec<Step> = (0..3).map(|_| env.step(left).unwrap()).collect();
        assert!(!steps[0].truncated);
        assert!(!steps[1].truncated);
        assert!(steps[2].truncated);
        assert!(!steps[2].done);

        env.reset().unwrap();
        assert_eq!(env.steps, 0);
    }
}
