//! Step-size schedules and return helpers

use serde::{Deserialize, Serialize};

/// Trait for schedules (e.g., for step-size decay)
pub trait Schedule: Send + Sync {
    /// Get value at update t
    fn value(&self, t: usize) -> f64;
}

/// Linear schedule that decays from start to end over steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSchedule {
    /// Starting value
    pub start: f64,
    /// Ending value
    pub end: f64,
    /// Number of steps for decay
    pub steps: usize,
}

impl LinearSchedule {
    /// Create a new linear schedule
    #[must_use]
    pub fn new(start: f64, end: f64, steps: usize) -> Self {
        Self { start, end, steps }
    }
}

impl Schedule for LinearSchedule {
    fn value(&self, t: usize) -> f64 {
        if t >= self.steps {
            self.end
        } else {
            let progress = t as f64 / self.steps as f64;
            self.start + (self.end - self.start) * progress
        }
    }
}

/// Exponential decay schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExponentialSchedule {
    /// Starting value
    pub start: f64,
    /// Minimum value
    pub min_value: f64,
    /// Decay rate
    pub decay_rate: f64,
}

impl ExponentialSchedule {
    /// Create a new exponential schedule
    #[must_use]
    pub fn new(start: f64, min_value: f64, decay_rate: f64) -> Self {
        Self {
            start,
            min_value,
            decay_rate,
        }
    }
}

impl Schedule for ExponentialSchedule {
    fn value(&self, t: usize) -> f64 {
        let value = self.start * self.decay_rate.powf(t as f64);
        value.max(self.min_value)
    }
}

/// Step size for TD updates, as stored in run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSize {
    /// Fixed alpha
    Constant {
        /// Step size
        alpha: f64,
    },
    /// Linearly decaying alpha
    Linear(LinearSchedule),
    /// Exponentially decaying alpha
    Exponential(ExponentialSchedule),
}

impl StepSize {
    /// Fixed step size
    #[must_use]
    pub fn constant(alpha: f64) -> Self {
        Self::Constant { alpha }
    }
}

impl Default for StepSize {
    fn default() -> Self {
        Self::constant(0.1)
    }
}

impl From<f64> for StepSize {
    fn from(alpha: f64) -> Self {
        Self::constant(alpha)
    }
}

impl Schedule for StepSize {
    fn value(&self, t: usize) -> f64 {
        match self {
            Self::Constant { alpha } => *alpha,
            Self::Linear(schedule) => schedule.value(t),
            Self::Exponential(schedule) => schedule.value(t),
        }
    }
}

/// Discounted sum of `rewards` followed by `tail` discounted past the last reward
#[must_use]
pub fn discounted_return<'a>(
    rewards: impl IntoIterator<Item = &'a f64>,
    gamma: f64,
    tail: f64,
) -> f64 {
    let mut discount = 1.0;
    let mut total = 0.0;
    for reward in rewards {
        total += discount * reward;
        discount *= gamma;
    }
    total + discount * tail
}
