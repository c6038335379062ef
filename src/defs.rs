//! Serializable experiment definitions.
use crate::agents::{
    BuildAgent, BuildAgentError, DecayingEpsilonGreedyAgentConfig, EpsilonGreedyAgentConfig,
    GreedyAgent, GreedyAgentConfig,
};
use crate::envs::{
    BetaMeansBanditConfig, BuildEnv, BuildEnvError, FixedMeansBanditConfig, RewardSource,
    UniformMeansBanditConfig,
};
use crate::logging::Logger;
use crate::simulation::{Simulation, TrajectorySummary};
use crate::utils::stats::OnlineMeanVariance;
use crate::SimError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Agent definition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentDef {
    /// Always exploit the arms with the highest value estimate.
    Greedy(GreedyAgentConfig),
    /// Explore with a fixed probability.
    EpsilonGreedy(EpsilonGreedyAgentConfig),
    /// Explore with a probability that decays with the episode step.
    DecayingEpsilonGreedy(DecayingEpsilonGreedyAgentConfig),
}

impl Default for AgentDef {
    fn default() -> Self {
        Self::Greedy(GreedyAgentConfig::default())
    }
}

impl BuildAgent for AgentDef {
    type Agent = GreedyAgent;

    fn build_agent(&self, num_arms: usize, seed: u64) -> Result<Self::Agent, BuildAgentError> {
        use AgentDef::*;
        match self {
            Greedy(config) => config.build_agent(num_arms, seed),
            EpsilonGreedy(config) => config.build_agent(num_arms, seed),
            DecayingEpsilonGreedy(config) => config.build_agent(num_arms, seed),
        }
    }
}

/// Environment definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvDef {
    /// Bernoulli bandit with fixed arm means.
    FixedMeans(FixedMeansBanditConfig),
    /// Bernoulli bandit with arm means sampled uniformly on each reset.
    UniformMeans(UniformMeansBanditConfig),
    /// Bernoulli bandit with Beta-distributed arm means sampled on each reset.
    BetaMeans(BetaMeansBanditConfig),
}

impl Default for EnvDef {
    fn default() -> Self {
        Self::UniformMeans(UniformMeansBanditConfig::default())
    }
}

impl BuildEnv for EnvDef {
    type Environment = Box<dyn RewardSource>;

    fn build_env(&self, seed: u64) -> Result<Self::Environment, BuildEnvError> {
        use EnvDef::*;
        Ok(match self {
            FixedMeans(config) => Box::new(config.build_env(seed)?),
            UniformMeans(config) => Box::new(config.build_env(seed)?),
            BetaMeans(config) => Box::new(config.build_env(seed)?),
        })
    }
}

/// A repeated bandit experiment: independent episodes of a fixed length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentDef {
    pub env: EnvDef,
    pub agent: AgentDef,
    /// Number of independent episodes.
    pub num_trials: u64,
    /// Number of steps per episode.
    pub num_steps: u64,
    /// Environment seed; the agent is seeded with `seed + 1`.
    pub seed: u64,
}

impl Default for ExperimentDef {
    fn default() -> Self {
        Self {
            env: EnvDef::default(),
            agent: AgentDef::default(),
            num_trials: 1,
            num_steps: 1000,
            seed: 0,
        }
    }
}

/// Outcome of an [`ExperimentDef`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentResult {
    /// Summary of each trial, in order.
    pub trials: Vec<TrajectorySummary>,
    /// Statistics of the per-step mean reward across trials.
    pub mean_reward: OnlineMeanVariance<f64>,
}

impl ExperimentDef {
    /// Load an experiment definition from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Run every trial with a single agent and environment, resetting both between trials.
    ///
    /// # Args
    /// * `logger` - Logger for step and episode statistics. Pass `()` for no logging.
    /// * `on_trial` - Called with the index and summary of each completed trial.
    pub fn run<L, F>(&self, logger: L, mut on_trial: F) -> Result<ExperimentResult, SimError>
    where
        L: Logger,
        F: FnMut(u64, &TrajectorySummary),
    {
        let env = self.env.build_env(self.seed)?;
        let agent = self.agent.build_agent(env.num_arms(), self.seed.wrapping_add(1))?;
        let mut simulation = Simulation::with_logger(agent, env, logger);

        let mut trials = Vec::new();
        let mut mean_reward = OnlineMeanVariance::default();
        for trial in 0..self.num_trials {
            simulation.reset()?;
            simulation.forward(self.num_steps)?;
            if let Some(summary) = simulation.summary() {
                on_trial(trial, &summary);
                if summary.num_steps > 0 {
                    mean_reward.push(summary.mean_reward());
                }
                trials.push(summary);
            }
        }
        Ok(ExperimentResult {
            trials,
            mean_reward,
        })
    }
}
