use super::Trajectory;
use ndarray::ArrayView1;
use ndarray_stats::QuantileExt;
use std::fmt;

/// Basic summary statistics of an episode trajectory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TrajectorySummary {
    pub num_steps: u64,
    pub total_reward: f64,
    /// Number of times each arm was chosen.
    pub action_counts: Vec<u64>,
    /// Fraction of steps that chose an arm with the highest mean.
    ///
    /// `None` if the arm means are unknown or there are no steps.
    pub optimal_action_fraction: Option<f64>,
}

impl TrajectorySummary {
    /// Summarize a trajectory.
    ///
    /// # Args
    /// * `trajectory` - The recorded episode.
    /// * `num_arms` - Number of bandit arms.
    /// * `means` - The true mean reward of each arm, if known.
    pub fn new(trajectory: &Trajectory, num_arms: usize, means: Option<&[f64]>) -> Self {
        let mut action_counts = vec![0; num_arms];
        for &action in &trajectory.actions {
            if let Some(count) = action_counts.get_mut(action) {
                *count += 1;
            }
        }

        let num_steps = trajectory.len() as u64;
        let optimal_action_fraction = means.and_then(|means| {
            let best = *ArrayView1::from(means).max().ok()?;
            if num_steps == 0 {
                return None;
            }
            let optimal = trajectory
                .actions
                .iter()
                .filter(|&&action| means.get(action) == Some(&best))
                .count();
            Some(optimal as f64 / num_steps as f64)
        });

        Self {
            num_steps,
            total_reward: trajectory.rewards.iter().sum(),
            action_counts,
            optimal_action_fraction,
        }
    }

    /// Mean reward per step; `NaN` for an empty trajectory.
    pub fn mean_reward(&self) -> f64 {
        self.total_reward / self.num_steps as f64
    }
}

impl fmt::Display for TrajectorySummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "num_steps: {}", self.num_steps)?;
        writeln!(f, "total_reward: {}", self.total_reward)?;
        writeln!(f, "step_reward_mean: {}", self.mean_reward())?;
        writeln!(f, "action_counts: {:?}", self.action_counts)?;
        if let Some(fraction) = self.optimal_action_fraction {
            writeln!(f, "optimal_action_fraction: {}", fraction)?;
        }
        Ok(())
    }
}
