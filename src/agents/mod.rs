//! Multi-armed bandit agents.
//!
//! An agent is composed of shared per-arm statistics, an exploitation rule that maps value
//! estimates to action weights, and an exploration schedule that sets how often to ignore the
//! weights and pick an arm uniformly at random.
mod bandit;
mod error;
mod schedules;
mod statistics;
#[cfg(test)]
pub mod testing;
mod weights;

pub use bandit::{
    BanditAgent, DecayingEpsilonGreedyAgentConfig, EpsilonGreedyAgentConfig, GreedyAgent,
    GreedyAgentConfig,
};
pub use error::BuildAgentError;
pub use schedules::ExplorationSchedule;
pub use statistics::ArmStatistics;
pub use weights::{ActionWeighting, GreedyWeights};

use crate::BanditError;
use ndarray::ArrayView1;
use std::convert::TryInto;
use std::fmt;

/// A learning bandit policy.
///
/// Calls are sequential within an episode: `decide`, then `update` with the outcome.
pub trait Policy {
    /// Number of arms the policy chooses between.
    fn num_arms(&self) -> usize;

    /// Clear all learned statistics to start a fresh episode.
    fn reset(&mut self);

    /// Choose an arm.
    ///
    /// # Errors
    /// [`BanditError::InvalidState`] if the action weights cannot be normalized.
    fn decide(&mut self) -> Result<usize, BanditError>;

    /// Update the policy with the reward received for `action`.
    ///
    /// # Errors
    /// [`BanditError::InvalidArgument`] if `action` is not in `[0, num_arms)`.
    fn update(&mut self, action: usize, reward: f64) -> Result<(), BanditError>;

    /// Current per-arm value estimates.
    fn value_estimates(&self) -> ArrayView1<'_, f64>;

    /// Current (unnormalized) per-arm selection weights.
    fn action_weights(&self) -> ArrayView1<'_, f64>;
}

impl<P: Policy + ?Sized> Policy for &mut P {
    fn num_arms(&self) -> usize {
        P::num_arms(self)
    }
    fn reset(&mut self) {
        P::reset(self)
    }
    fn decide(&mut self) -> Result<usize, BanditError> {
        P::decide(self)
    }
    fn update(&mut self, action: usize, reward: f64) -> Result<(), BanditError> {
        P::update(self, action, reward)
    }
    fn value_estimates(&self) -> ArrayView1<'_, f64> {
        P::value_estimates(self)
    }
    fn action_weights(&self) -> ArrayView1<'_, f64> {
        P::action_weights(self)
    }
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn num_arms(&self) -> usize {
        P::num_arms(self)
    }
    fn reset(&mut self) {
        P::reset(self)
    }
    fn decide(&mut self) -> Result<usize, BanditError> {
        P::decide(self)
    }
    fn update(&mut self, action: usize, reward: f64) -> Result<(), BanditError> {
        P::update(self, action, reward)
    }
    fn value_estimates(&self) -> ArrayView1<'_, f64> {
        P::value_estimates(self)
    }
    fn action_weights(&self) -> ArrayView1<'_, f64> {
        P::action_weights(self)
    }
}

/// Build an agent instance.
pub trait BuildAgent {
    type Agent: Policy;

    /// Build an agent for a bandit with `num_arms` arms.
    ///
    /// # Args
    /// * `num_arms` - Number of arms in the bandit.
    /// * `seed` - Seed for the agent's pseudo-random action selection.
    fn build_agent(&self, num_arms: usize, seed: u64) -> Result<Self::Agent, BuildAgentError>;
}

/// Convert an action into an arm index in `[0, num_arms)`.
///
/// # Example
/// ```
/// use bandit_sim::agents::to_arm_index;
///
/// assert_eq!(to_arm_index(2_i64, 3), Ok(2));
/// assert!(to_arm_index(-1_i64, 3).is_err());
/// ```
///
/// # Errors
/// [`BanditError::InvalidArgument`] if the action is negative, too large, or not convertible.
pub fn to_arm_index<T>(action: T, num_arms: usize) -> Result<usize, BanditError>
where
    T: TryInto<usize> + fmt::Display + Copy,
{
    match action.try_into() {
        Ok(index) if index < num_arms => Ok(index),
        _ => Err(BanditError::InvalidArgument {
            action: action.to_string(),
            num_arms,
        }),
    }
}
