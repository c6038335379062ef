//! Exploration schedules: functions of the episode step count.
use serde::{Deserialize, Serialize};

/// Selects the exploration probability as a function of the episode step.
///
/// The episode step starts at 1 and advances on every agent update.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExplorationSchedule {
    /// Never explore.
    Never,
    /// Explore with a fixed probability.
    Constant { epsilon: f64 },
    /// Explore with probability `epsilon / log2(step + 1)`.
    LogDecaying { epsilon: f64 },
}

impl Default for ExplorationSchedule {
    fn default() -> Self {
        Self::Never
    }
}

impl ExplorationSchedule {
    /// Probability of exploring on the given (1-based) episode step.
    ///
    /// Values above 1 mean always explore.
    #[must_use]
    pub fn exploration_rate(&self, episode_step: u64) -> f64 {
        use ExplorationSchedule::*;
        match self {
            Never => 0.0,
            Constant { epsilon } => *epsilon,
            LogDecaying { epsilon } => *epsilon / ((episode_step + 1) as f64).log2(),
        }
    }

    /// The base exploration rate, if any.
    #[must_use]
    pub const fn epsilon(&self) -> Option<f64> {
        match self {
            Self::Never => None,
            Self::Constant { epsilon } | Self::LogDecaying { epsilon } => Some(*epsilon),
        }
    }
}
