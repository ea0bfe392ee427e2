//! Trajectory records

use serde::{Deserialize, Serialize};

use crate::{Action, MdpState};

/// Single transition in a trajectory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    /// State the action was taken in
    pub state: MdpState,
    /// Action taken
    pub action: Action,
    /// Reward received
    pub reward: f64,
}

impl Transition {
    /// Create a new transition
    #[must_use]
    pub fn new(state: MdpState, action: Action, reward: f64) -> Self {
        Self {
            state,
            action,
            reward,
        }
    }
}
