//! Per-arm reward statistics shared by all bandit agents.
use ndarray::{Array, Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Pull counts and reward sums for each arm, with smoothed value estimates.
///
/// The value estimate of an arm is its mean reward with one extra pseudo-observation of
/// `reward_initial`:
/// `(reward_sum + reward_initial) / (pull_count + 1)`.
/// Unpulled arms are therefore valued at `reward_initial`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmStatistics {
    reward_initial: f64,
    pull_counts: Array1<u64>,
    reward_sums: Array1<f64>,
    /// Cached; recomputed whenever the statistics change.
    estimates: Array1<f64>,
}

impl ArmStatistics {
    pub fn new(num_arms: usize, reward_initial: f64) -> Self {
        Self {
            reward_initial,
            pull_counts: Array::zeros(num_arms),
            reward_sums: Array::zeros(num_arms),
            estimates: Array::from_elem(num_arms, reward_initial),
        }
    }

    /// Reward of the pseudo-observation added to every arm.
    pub const fn reward_initial(&self) -> f64 {
        self.reward_initial
    }

    #[inline]
    pub fn num_arms(&self) -> usize {
        self.pull_counts.len()
    }

    /// Zero all counts and sums.
    pub fn reset(&mut self) {
        self.pull_counts.fill(0);
        self.reward_sums.fill(0.0);
        self.estimates.fill(self.reward_initial);
    }

    /// Record a reward for an arm. `arm` must already be validated.
    pub fn record(&mut self, arm: usize, reward: f64) {
        self.pull_counts[arm] += 1;
        self.reward_sums[arm] += reward;
        self.estimates[arm] = self.estimate(arm);
    }

    fn estimate(&self, arm: usize) -> f64 {
        (self.reward_sums[arm] + self.reward_initial) / (self.pull_counts[arm] + 1) as f64
    }

    pub fn pull_counts(&self) -> ArrayView1<'_, u64> {
        self.pull_counts.view()
    }

    pub fn reward_sums(&self) -> ArrayView1<'_, f64> {
        self.reward_sums.view()
    }

    pub fn estimates(&self) -> ArrayView1<'_, f64> {
        self.estimates.view()
    }
}
