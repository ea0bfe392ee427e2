//! Rectangular gridworlds with deterministic moves

use indexmap::IndexMap;
use rand::rngs::StdRng;

use rlgpi_core::{Action, GpiError, MdpState, Outcome, Result};

use crate::mdp::MdpEnvironment;

/// Compass moves, in action-id order
pub const MOVES: [(&str, isize, isize); 4] = [
    ("up", -1, 0),
    ("down", 1, 0),
    ("left", 0, -1),
    ("right", 0, 1),
];

/// The four move actions
#[must_use]
pub fn move_actions() -> Vec<Action> {
    MOVES
        .iter()
        .enumerate()
        .map(|(id, (name, _, _))| Action::new(id, *name))
        .collect()
}

/// Gridworld constructors
pub struct Gridworld;

impl Gridworld {
    /// Build a `rows` x `cols` grid.
    ///
    /// Cells are numbered row-major. Moving off the grid leaves the agent in
    /// place; every move costs `step_reward`. Cells in `terminal_cells` absorb.
    pub fn new(
        rows: usize,
        cols: usize,
        terminal_cells: &[usize],
        step_reward: f64,
        rng: StdRng,
    ) -> Result<MdpEnvironment> {
        let cells = rows * cols;
        if cells == 0 {
            return Err(GpiError::Environment("gridworld needs at least one cell".into()));
        }
        if let Some(bad) = terminal_cells.iter().find(|c| **c >= cells) {
            return Err(GpiError::Environment(format!(
                "terminal cell {bad} lies outside a {rows}x{cols} grid"
            )));
        }

        let actions = move_actions();
        let states = (0..cells)
            .map(|id| {
                if terminal_cells.contains(&id) {
                    Ok(MdpState::terminal(id))
                } else {
                    MdpState::new(id, actions.clone(), false)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let mut model = IndexMap::new();
        for state in states.iter().filter(|s| !s.is_terminal()) {
            let (row, col) = (state.id() / cols, state.id() % cols);
            for (action, (_, dr, dc)) in actions.iter().zip(MOVES) {
                let next_row = row.checked_add_signed(dr).filter(|r| *r < rows);
                let next_col = col.checked_add_signed(dc).filter(|c| *c < cols);
                let next_id = match (next_row, next_col) {
                    (Some(r), Some(c)) => r * cols + c,
                    _ => state.id(),
                };
                model.insert(
                    (state.id(), action.id()),
                    vec![Outcome {
                        next_state: states[next_id].clone(),
                        reward: step_reward,
                        probability: 1.0,
                    }],
                );
            }
        }

        MdpEnvironment::new(format!("gridworld-{rows}x{cols}"), states, model, rng)
    }

    /// Sutton & Barto example 4.1: 4x4 grid, terminal corners, reward -1 per move
    pub fn example_4_1(rng: StdRng) -> Result<MdpEnvironment> {
        Self::new(4, 4, &[0, 15], -1.0, rng)
    }
}
