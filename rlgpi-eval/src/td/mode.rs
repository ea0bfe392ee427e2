//! Bootstrap targets for temporal-difference control

use std::fmt;

use serde::{Deserialize, Serialize};

use rlgpi_agent::ActionValueMdpAgent;
use rlgpi_core::{Action, ActionValueEstimator, Agent, MdpState, Result};

/// How the value of the horizon state is estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Value of the action actually selected at the horizon
    Sarsa,
    /// Value of the best action at the horizon
    QLearning,
    /// Expected value under the agent's exploration policy
    ExpectedSarsa,
}

impl Mode {
    /// Estimated value of continuing from `state`, where `action` is the
    /// action the agent selected there.
    pub fn bootstrap(
        self,
        agent: &ActionValueMdpAgent,
        state: &MdpState,
        action: &Action,
    ) -> Result<f64> {
        match self {
            Self::Sarsa => agent.q().value(state, action),
            Self::QLearning => Ok(agent.q().max_value(state)?.unwrap_or(0.0)),
            Self::ExpectedSarsa => {
                let values = agent.q().action_values(state)?;
                let probabilities = agent.action_probabilities(state)?;
                Ok(probabilities
                    .iter()
                    .map(|(a, p)| p * values.get(a).copied().unwrap_or(0.0))
                    .sum())
            }
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sarsa => "SARSA",
            Self::QLearning => "Q-learning",
            Self::ExpectedSarsa => "expected SARSA",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rlgpi_agent::EpsilonGreedy;
    use rlgpi_core::AgentConfig;

    fn setup() -> (ActionValueMdpAgent, MdpState, Action, Action) {
        let low = Action::new(0, "low");
        let high = Action::new(1, "high");
        let state = MdpState::new(0, vec![low.clone(), high.clone()], false).unwrap();
        let mut agent = ActionValueMdpAgent::new(
            &AgentConfig::new("td", 1.0, 7),
            Box::new(EpsilonGreedy::new(0.5).unwrap()),
        )
        .unwrap();
        agent.q_mut().set(&state, &low, 1.0).unwrap();
        agent.q_mut().set(&state, &high, 3.0).unwrap();
        (agent, state, low, high)
    }

    #[test]
    fn each_mode_reads_its_own_target() {
        let (agent, state, low, _) = setup();
        assert_abs_diff_eq!(Mode::Sarsa.bootstrap(&agent, &state, &low).unwrap(), 1.0);
        assert_abs_diff_eq!(Mode::QLearning.bootstrap(&agent, &state, &low).unwrap(), 3.0);
        // 0.25 * 1 + 0.75 * 3
        assert_abs_diff_eq!(
            Mode::ExpectedSarsa.bootstrap(&agent, &state, &low).unwrap(),
            2.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn serde_uses_snake_case() {
        let mode: Mode = serde_json::from_str(r#""expected_sarsa""#).unwrap();
        assert_eq!(mode, Mode::ExpectedSarsa);
        assert_eq!(Mode::QLearning.to_string(), "Q-learning");
    }
}
