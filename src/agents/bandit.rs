//! Value-estimating bandit agents with epsilon-greedy exploration.
use super::{
    to_arm_index, ActionWeighting, ArmStatistics, BuildAgent, BuildAgentError,
    ExplorationSchedule, GreedyWeights, Policy,
};
use crate::BanditError;
use ndarray::{Array, Array1, ArrayView1};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a greedy [`GreedyAgent`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreedyAgentConfig {
    /// Optimistic initial value estimate of each arm.
    pub reward_initial: f64,
}

impl GreedyAgentConfig {
    pub const fn new(reward_initial: f64) -> Self {
        Self { reward_initial }
    }
}

impl Default for GreedyAgentConfig {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl BuildAgent for GreedyAgentConfig {
    type Agent = GreedyAgent;

    fn build_agent(&self, num_arms: usize, seed: u64) -> Result<Self::Agent, BuildAgentError> {
        BanditAgent::new(
            num_arms,
            self.reward_initial,
            ExplorationSchedule::Never,
            GreedyWeights,
            seed,
        )
    }
}

/// Configuration for an epsilon-greedy [`GreedyAgent`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedyAgentConfig {
    /// Probability of choosing an arm uniformly at random.
    pub epsilon: f64,
    /// Optimistic initial value estimate of each arm.
    pub reward_initial: f64,
}

impl EpsilonGreedyAgentConfig {
    pub const fn new(epsilon: f64, reward_initial: f64) -> Self {
        Self {
            epsilon,
            reward_initial,
        }
    }
}

impl Default for EpsilonGreedyAgentConfig {
    fn default() -> Self {
        Self::new(0.1, 1.0)
    }
}

impl BuildAgent for EpsilonGreedyAgentConfig {
    type Agent = GreedyAgent;

    fn build_agent(&self, num_arms: usize, seed: u64) -> Result<Self::Agent, BuildAgentError> {
        BanditAgent::new(
            num_arms,
            self.reward_initial,
            ExplorationSchedule::Constant {
                epsilon: self.epsilon,
            },
            GreedyWeights,
            seed,
        )
    }
}

/// Configuration for an epsilon-greedy [`GreedyAgent`] with a log-decaying exploration rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayingEpsilonGreedyAgentConfig {
    /// Exploration probability on the first step of each episode.
    ///
    /// Step `t` explores with probability `epsilon / log2(t + 1)`.
    pub epsilon: f64,
    /// Optimistic initial value estimate of each arm.
    pub reward_initial: f64,
}

impl DecayingEpsilonGreedyAgentConfig {
    pub const fn new(epsilon: f64, reward_initial: f64) -> Self {
        Self {
            epsilon,
            reward_initial,
        }
    }
}

impl Default for DecayingEpsilonGreedyAgentConfig {
    fn default() -> Self {
        Self::new(0.5, 1.0)
    }
}

impl BuildAgent for DecayingEpsilonGreedyAgentConfig {
    type Agent = GreedyAgent;

    fn build_agent(&self, num_arms: usize, seed: u64) -> Result<Self::Agent, BuildAgentError> {
        BanditAgent::new(
            num_arms,
            self.reward_initial,
            ExplorationSchedule::LogDecaying {
                epsilon: self.epsilon,
            },
            GreedyWeights,
            seed,
        )
    }
}

/// A greedy bandit agent with optional epsilon exploration.
pub type GreedyAgent = BanditAgent<GreedyWeights>;

/// A bandit agent that estimates arm values from observed rewards.
///
/// Each decision first explores (uniformly random arm) with the probability given by the
/// exploration schedule for the current episode step, and otherwise exploits by sampling an arm
/// in proportion to the weights of the exploitation rule `W`.
#[derive(Debug, Clone)]
pub struct BanditAgent<W> {
    /// Exploration probability as a function of the episode step.
    pub schedule: ExplorationSchedule,
    /// Exploitation rule
    rule: W,

    statistics: ArmStatistics,
    /// Selection weights; recomputed on every update.
    weights: Array1<f64>,
    /// Starts at 1, incremented on every update.
    episode_step: u64,

    rng: StdRng,
}

impl<W: ActionWeighting> BanditAgent<W> {
    pub fn new(
        num_arms: usize,
        reward_initial: f64,
        schedule: ExplorationSchedule,
        rule: W,
        seed: u64,
    ) -> Result<Self, BuildAgentError> {
        if num_arms == 0 {
            return Err(BuildAgentError::NoArms);
        }
        if !(reward_initial.is_finite() && reward_initial > 0.0) {
            return Err(BuildAgentError::InvalidInitialReward(reward_initial));
        }
        if let Some(epsilon) = schedule.epsilon() {
            if !(epsilon.is_finite() && epsilon >= 0.0) {
                return Err(BuildAgentError::InvalidExplorationRate(epsilon));
            }
        }

        let mut agent = Self {
            schedule,
            rule,
            statistics: ArmStatistics::new(num_arms, reward_initial),
            weights: Array::zeros(num_arms),
            episode_step: 1,
            rng: StdRng::seed_from_u64(seed),
        };
        agent.reset();
        Ok(agent)
    }
}

impl<W> BanditAgent<W> {
    /// Per-arm statistics of the current episode.
    pub const fn statistics(&self) -> &ArmStatistics {
        &self.statistics
    }

    pub const fn rule(&self) -> &W {
        &self.rule
    }

    /// Step count within the current episode (starts at 1).
    pub const fn episode_step(&self) -> u64 {
        self.episode_step
    }

    /// Probability that the next decision explores.
    pub fn exploration_rate(&self) -> f64 {
        self.schedule.exploration_rate(self.episode_step)
    }

    /// Choose an arm uniformly at random.
    fn explore(&mut self) -> usize {
        self.rng.gen_range(0..self.statistics.num_arms())
    }

    /// Sample an arm in proportion to the action weights.
    fn exploit(&mut self) -> Result<usize, BanditError> {
        if let Some(weight) = self.weights.iter().find(|w| !w.is_finite()) {
            return Err(BanditError::InvalidState(format!(
                "non-finite weight {} in {}",
                weight, self.weights
            )));
        }
        let distribution = WeightedIndex::new(self.weights.iter())
            .map_err(|err| BanditError::InvalidState(format!("{}: {}", err, self.weights)))?;
        Ok(distribution.sample(&mut self.rng))
    }
}

impl<W: ActionWeighting> BanditAgent<W> {
    fn calculate_weights(&mut self) {
        self.rule
            .calculate_weights(&self.statistics, self.weights.view_mut());
    }
}

impl<W: fmt::Display> fmt::Display for BanditAgent<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "BanditAgent({}, {:?}, r0={})",
            self.rule,
            self.schedule,
            self.statistics.reward_initial()
        )
    }
}

impl<W: ActionWeighting> Policy for BanditAgent<W> {
    fn num_arms(&self) -> usize {
        self.statistics.num_arms()
    }

    fn reset(&mut self) {
        self.statistics.reset();
        self.rule.reset();
        self.episode_step = 1;
        self.calculate_weights();
    }

    fn decide(&mut self) -> Result<usize, BanditError> {
        let exploration_rate = self.exploration_rate();
        if exploration_rate > 0.0 && self.rng.gen::<f64>() < exploration_rate {
            Ok(self.explore())
        } else {
            self.exploit()
        }
    }

    fn update(&mut self, action: usize, reward: f64) -> Result<(), BanditError> {
        let arm = to_arm_index(action, self.num_arms())?;
        self.statistics.record(arm, reward);
        self.rule.update_model_specific(arm, reward);
        self.calculate_weights();
        self.episode_step += 1;
        Ok(())
    }

    fn value_estimates(&self) -> ArrayView1<'_, f64> {
        self.statistics.estimates()
    }

    fn action_weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }
}
