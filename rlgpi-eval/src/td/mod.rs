//! Temporal-difference evaluation

pub mod buffer;
pub mod evaluation;
pub mod mode;

pub use buffer::NStepBuffer;
pub use evaluation::{evaluate_q_pi, EpisodeSummary, TdEvaluator};
pub use mode::Mode;
