//! Stopping criteria for iterative evaluation

use tracing::warn;

use rlgpi_core::{GpiError, Result};

/// Normalize the stopping criteria of an iterative evaluation.
///
/// A non-positive or absent `theta` turns the delta test off, and a
/// non-positive or absent `num_iterations` turns the sweep cap off. At least
/// one of them must remain active.
pub fn check_termination_criteria(
    theta: Option<f64>,
    num_iterations: Option<i64>,
) -> Result<(Option<f64>, Option<usize>)> {
    let theta = theta.filter(|t| *t > 0.0);
    let num_iterations = num_iterations
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok());

    match (theta, num_iterations) {
        (None, None) => Err(GpiError::config(
            "either theta or num_iterations (or both) must be positive",
        )),
        (Some(theta), None) => {
            warn!(theta, "no iteration cap; evaluation runs until the delta falls below theta");
            Ok((Some(theta), None))
        }
        criteria => Ok(criteria),
    }
}
