//! Dynamic-programming evaluation, improvement and iteration

pub mod evaluation;
pub mod improvement;
pub mod iteration;

pub use evaluation::{evaluate_q_pi, evaluate_v_pi, evaluate_v_pi_from, StateValueEvaluation};
pub use improvement::{improve_policy_with_q_pi, improve_policy_with_v_pi};
pub use iteration::{iterate_policy_q_pi, iterate_policy_v_pi, iterate_value_v_pi};
