//! Exploitation rules: value estimates to action selection weights.
use super::ArmStatistics;
use ndarray::{ArrayView1, ArrayViewMut1, Zip};
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derives action selection weights from the arm statistics.
///
/// The weights need not be normalized but must be non-negative with a positive sum.
pub trait ActionWeighting {
    /// Adjust model-specific statistics after the shared statistics record `(action, reward)`.
    fn update_model_specific(&mut self, _action: usize, _reward: f64) {}

    /// Clear model-specific statistics at the start of an episode.
    fn reset(&mut self) {}

    /// Write the selection weight of each arm into `weights`.
    fn calculate_weights(&self, statistics: &ArmStatistics, weights: ArrayViewMut1<f64>);
}

/// Greedy exploitation.
///
/// Arms tied for the maximum value estimate have weight 1; all other arms have weight zero.
/// The weights stay valid whatever the sign of the estimates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GreedyWeights;

impl ActionWeighting for GreedyWeights {
    fn calculate_weights(&self, statistics: &ArmStatistics, weights: ArrayViewMut1<f64>) {
        greedy_weights(statistics.estimates(), weights)
    }
}

impl fmt::Display for GreedyWeights {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Greedy")
    }
}

fn greedy_weights(estimates: ArrayView1<f64>, mut weights: ArrayViewMut1<f64>) {
    match estimates.max() {
        Ok(&max) => Zip::from(&mut weights)
            .and(&estimates)
            .for_each(|weight, &estimate| *weight = if estimate == max { 1.0 } else { 0.0 }),
        // NaN estimates have no maximum; leave them for `decide` to reject.
        Err(_) => weights.assign(&estimates),
    }
}
