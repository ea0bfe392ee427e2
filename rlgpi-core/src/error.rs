//! Error types for the GPI core library

use thiserror::Error;

/// Core error type for evaluation and interaction failures
#[derive(Error, Debug)]
pub enum GpiError {
    /// Invalid run configuration (stopping criteria, step counts, probabilities)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The agent's action-selection hook produced nothing
    #[error("Agent {agent} returned action of None")]
    NoAction {
        /// Name of the offending agent
        agent: String,
    },

    /// The agent proposed an action outside the sensed state's feasible set
    #[error("Action {action} is not feasible in state {state}")]
    InfeasibleAction {
        /// Rendered action
        action: String,
        /// Rendered state
        state: String,
    },

    /// Value lookup for a pair the table does not hold
    #[error("No value for action {action} in state {state}")]
    UnknownStateAction {
        /// Rendered state
        state: String,
        /// Rendered action
        action: String,
    },

    /// Lookup for a state that was never initialized
    #[error("Unknown state: {0}")]
    UnknownState(String),

    /// State construction violated the terminal/feasible-action invariant
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Agent-related errors
    #[error("Agent error: {0}")]
    Agent(String),

    /// Policy-related errors
    #[error("Policy error: {0}")]
    Policy(String),

    /// Environment-related errors
    #[error("Environment error: {0}")]
    Environment(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl GpiError {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether this error was raised by run validation rather than during the run
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type alias for GPI operations
pub type Result<T> = std::result::Result<T, GpiError>;
