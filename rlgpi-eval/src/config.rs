//! Run configuration for the evaluation engines

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use rlgpi_agent::StepSize;
use rlgpi_core::{GpiError, Result};

use crate::td::Mode;

fn default_update_in_place() -> bool {
    true
}

/// Settings for dynamic-programming evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpEvaluationConfig {
    /// Stop once a sweep changes no value by this much or more
    #[serde(default)]
    pub theta: Option<f64>,
    /// Sweep cap
    #[serde(default)]
    pub num_iterations: Option<i64>,
    /// Let later states of a sweep see values written earlier in it
    #[serde(default = "default_update_in_place")]
    pub update_in_place: bool,
}

impl Default for DpEvaluationConfig {
    fn default() -> Self {
        Self {
            theta: Some(0.001),
            num_iterations: None,
            update_in_place: default_update_in_place(),
        }
    }
}

impl DpEvaluationConfig {
    /// Load from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        parse(json)
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        parse(&std::fs::read_to_string(path)?)
    }
}

/// Settings for temporal-difference evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdEvaluationConfig {
    /// Real episodes to run
    pub num_episodes: usize,
    /// Real updates between planning rounds; `None` plans after every episode
    #[serde(default)]
    pub num_updates_per_improvement: Option<usize>,
    /// Step size
    #[serde(default)]
    pub alpha: StepSize,
    /// Bootstrap target
    pub mode: Mode,
    /// Lookahead length; `None` uses the full-episode return
    #[serde(default)]
    pub n_steps: Option<i64>,
}

impl TdEvaluationConfig {
    /// One-step configuration with a constant step size
    #[must_use]
    pub fn new(num_episodes: usize, alpha: f64, mode: Mode, n_steps: Option<i64>) -> Self {
        Self {
            num_episodes,
            num_updates_per_improvement: None,
            alpha: StepSize::constant(alpha),
            mode,
            n_steps,
        }
    }

    /// Check every field that can be wrong before a run starts
    pub fn validate(&self) -> Result<()> {
        self.lookahead()?;
        if self.num_updates_per_improvement == Some(0) {
            return Err(GpiError::config("num_updates_per_improvement must be positive"));
        }
        if let StepSize::Constant { alpha } = self.alpha {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(GpiError::config(format!("alpha must lie in (0, 1], got {alpha}")));
            }
        }
        Ok(())
    }

    /// The validated lookahead, `None` for full-episode returns
    pub fn lookahead(&self) -> Result<Option<usize>> {
        match self.n_steps {
            None => Ok(None),
            Some(n) if n > 0 => usize::try_from(n)
                .map(Some)
                .map_err(|_| GpiError::config(format!("n_steps {n} is too large"))),
            Some(n) => Err(GpiError::config(format!(
                "n_steps must be a positive integer or absent, got {n}"
            ))),
        }
    }

    /// Load from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = parse(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}

fn parse<T: DeserializeOwned>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlgpi_agent::Schedule;

    #[test]
    fn dp_defaults_to_in_place() {
        let config = DpEvaluationConfig::from_json_str(r#"{"theta": 0.01}"#).unwrap();
        assert_eq!(config.theta, Some(0.01));
        assert!(config.num_iterations.is_none());
        assert!(config.update_in_place);
    }

    #[test]
    fn td_parses_schedule_and_mode() {
        let config = TdEvaluationConfig::from_json_str(
            r#"{
                "num_episodes": 10,
                "mode": "q_learning",
                "n_steps": 3,
                "alpha": {"kind": "linear", "start": 0.5, "end": 0.1, "steps": 100}
            }"#,
        )
        .unwrap();
        assert_eq!(config.mode, Mode::QLearning);
        assert_eq!(config.lookahead().unwrap(), Some(3));
        assert!((config.alpha.value(0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn non_positive_lookahead_is_rejected() {
        for n in [0, -1] {
            let config = TdEvaluationConfig::new(1, 0.1, Mode::Sarsa, Some(n));
            assert!(config.validate().unwrap_err().is_configuration());
        }
        let config = TdEvaluationConfig::new(1, 0.1, Mode::Sarsa, None);
        assert_eq!(config.lookahead().unwrap(), None);
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = TdEvaluationConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, GpiError::Serialization(_)));
    }
}
