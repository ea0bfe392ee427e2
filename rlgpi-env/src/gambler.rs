//! Gambler's problem (Sutton & Barto example 4.3)

use indexmap::IndexMap;
use rand::rngs::StdRng;

use rlgpi_core::{Action, GpiError, MdpState, Outcome, Result};

use crate::mdp::MdpEnvironment;

/// Capital 0..=goal, stake 1..=min(s, goal - s), reward 1 on reaching the goal.
///
/// The coin lands heads with probability `p_h`.
pub fn gamblers_problem(p_h: f64, goal: usize, rng: StdRng) -> Result<MdpEnvironment> {
    if !(0.0..=1.0).contains(&p_h) {
        return Err(GpiError::config(format!("p_h must lie in [0, 1], got {p_h}")));
    }
    if goal < 2 {
        return Err(GpiError::config(format!("goal must be at least 2, got {goal}")));
    }

    let states = (0..=goal)
        .map(|capital| {
            if capital == 0 || capital == goal {
                Ok(MdpState::terminal(capital))
            } else {
                let stakes = (1..=capital.min(goal - capital))
                    .map(|stake| Action::new(stake, format!("stake {stake}")))
                    .collect();
                MdpState::new(capital, stakes, false)
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let mut model = IndexMap::new();
    for state in states.iter().filter(|s| !s.is_terminal()) {
        let capital = state.id();
        for action in state.actions() {
            let stake = action.id();
            let win = capital + stake;
            let lose = capital - stake;
            model.insert(
                (capital, stake),
                vec![
                    Outcome {
                        next_state: states[win].clone(),
                        reward: if win == goal { 1.0 } else { 0.0 },
                        probability: p_h,
                    },
                    Outcome {
                        next_state: states[lose].clone(),
                        reward: 0.0,
                        probability: 1.0 - p_h,
                    },
                ],
            );
        }
    }

    MdpEnvironment::new(format!("gambler-{goal}"), states, model, rng)
}
