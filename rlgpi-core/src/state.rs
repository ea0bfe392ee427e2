//! States of a finite MDP

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{Action, GpiError, Result};

/// A situation in the MDP together with the actions available in it.
///
/// Terminal states have no feasible actions and every non-terminal state has
/// at least one. Equality and hashing use the identifier only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawMdpState")]
pub struct MdpState {
    id: usize,
    actions: Vec<Action>,
    terminal: bool,
}

/// Unchecked wire form, validated on the way in
#[derive(Deserialize)]
struct RawMdpState {
    id: usize,
    actions: Vec<Action>,
    terminal: bool,
}

impl TryFrom<RawMdpState> for MdpState {
    type Error = GpiError;

    fn try_from(raw: RawMdpState) -> Result<Self> {
        Self::new(raw.id, raw.actions, raw.terminal)
    }
}

impl MdpState {
    /// Create a new state, validating the terminal/action invariant
    pub fn new(id: usize, actions: Vec<Action>, terminal: bool) -> Result<Self> {
        if terminal && !actions.is_empty() {
            return Err(GpiError::InvalidState(format!(
                "terminal state {id} has {} feasible actions",
                actions.len()
            )));
        }
        if !terminal && actions.is_empty() {
            return Err(GpiError::InvalidState(format!(
                "non-terminal state {id} has no feasible actions"
            )));
        }
        Ok(Self {
            id,
            actions,
            terminal,
        })
    }

    /// Create a terminal state
    #[must_use]
    pub fn terminal(id: usize) -> Self {
        Self {
            id,
            actions: Vec::new(),
            terminal: true,
        }
    }

    /// Identifier
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Feasible actions, in environment order
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Check if this is a terminal state
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Check whether an action may be taken here
    #[must_use]
    pub fn is_feasible(&self, action: &Action) -> bool {
        self.actions.contains(action)
    }
}

impl PartialEq for MdpState {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MdpState {}

impl Hash for MdpState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for MdpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terminal {
            write!(f, "state {} (terminal)", self.id)
        } else {
            write!(f, "state {}", self.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_is_enforced() {
        let a = Action::new(0, "a");
        assert!(MdpState::new(0, vec![a.clone()], true).is_err());
        assert!(MdpState::new(0, vec![], false).is_err());
        assert!(MdpState::new(0, vec![], true).is_ok());

        let s = MdpState::new(1, vec![a.clone()], false).unwrap();
        assert!(s.is_feasible(&a));
        assert!(!s.is_feasible(&Action::new(1, "b")));
    }

    #[test]
    fn deserialization_checks_the_invariant() {
        let json = r#"{"id": 3, "actions": [{"id": 0, "name": "go"}], "terminal": false}"#;
        let s: MdpState = serde_json::from_str(json).unwrap();
        assert!(s.is_feasible(&Action::new(0, "go")));

        let terminal_with_actions =
            r#"{"id": 4, "actions": [{"id": 0, "name": "go"}], "terminal": true}"#;
        assert!(serde_json::from_str::<MdpState>(terminal_with_actions).is_err());
        let stuck = r#"{"id": 5, "actions": [], "terminal": false}"#;
        assert!(serde_json::from_str::<MdpState>(stuck).is_err());
    }

    #[test]
    fn display_marks_terminal() {
        assert_eq!(MdpState::terminal(7).to_string(), "state 7 (terminal)");
    }
}
