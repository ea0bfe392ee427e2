//! Sliding window of transitions awaiting an n-step update

use std::collections::VecDeque;

use rlgpi_core::Transition;

/// Transitions whose return is not yet fully observed, oldest first
#[derive(Debug, Clone)]
pub struct NStepBuffer {
    transitions: VecDeque<Transition>,
    n_steps: Option<usize>,
}

impl NStepBuffer {
    /// Create a buffer; `None` keeps every transition until the episode ends
    #[must_use]
    pub fn new(n_steps: Option<usize>) -> Self {
        Self {
            transitions: VecDeque::with_capacity(n_steps.unwrap_or(64)),
            n_steps,
        }
    }

    /// Add the newest transition
    pub fn push(&mut self, transition: Transition) {
        self.transitions.push_back(transition);
    }

    /// Whether the oldest transition has its full n-step lookahead
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.n_steps.is_some_and(|n| self.transitions.len() >= n)
    }

    /// Oldest transition
    #[must_use]
    pub fn front(&self) -> Option<&Transition> {
        self.transitions.front()
    }

    /// Drop and return the oldest transition
    pub fn pop_front(&mut self) -> Option<Transition> {
        self.transitions.pop_front()
    }

    /// Return of the oldest transition: its discounted rewards up to the
    /// newest, plus `gamma^len * tail`
    #[must_use]
    pub fn discounted_return(&self, gamma: f64, tail: f64) -> f64 {
        rlgpi_agent::discounted_return(self.transitions.iter().map(|t| &t.reward), gamma, tail)
    }

    /// Number of buffered transitions
    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if the buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rlgpi_core::{Action, MdpState};

    fn transition(reward: f64) -> Transition {
        Transition::new(MdpState::terminal(0), Action::new(0, "a"), reward)
    }

    #[test]
    fn fills_at_lookahead() {
        let mut buffer = NStepBuffer::new(Some(2));
        buffer.push(transition(1.0));
        assert!(!buffer.is_full());
        buffer.push(transition(2.0));
        assert!(buffer.is_full());
        assert_abs_diff_eq!(buffer.discounted_return(0.5, 0.0), 2.0);
        assert_abs_diff_eq!(buffer.discounted_return(0.5, 4.0), 3.0);

        buffer.pop_front();
        assert!(!buffer.is_full());
        assert_abs_diff_eq!(buffer.front().unwrap().reward, 2.0);
    }

    #[test]
    fn full_episode_window_never_fills() {
        let mut buffer = NStepBuffer::new(None);
        for r in 0..100 {
            buffer.push(transition(f64::from(r)));
        }
        assert!(!buffer.is_full());
        assert_eq!(buffer.len(), 100);
    }
}
