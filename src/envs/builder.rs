use super::{BernoulliBandit, FixedMeans, PriorMeans};
use rand::distributions::Uniform;
use rand_distr::{Beta, BetaError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Build an environment instance.
pub trait BuildEnv {
    type Environment;

    /// Build an environment instance.
    ///
    /// # Args
    /// * `seed` - Seed for pseudo-randomness used by the environment.
    ///     Includes both sampling of the arm means on reset and
    ///     sampling of rewards within an episode.
    fn build_env(&self, seed: u64) -> Result<Self::Environment, BuildEnvError>;
}

/// Error building an environment
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildEnvError {
    #[error("a bandit needs at least one arm")]
    NoArms,
    #[error(transparent)]
    BetaError(#[from] BetaError),
}

/// Configuration for a [`BernoulliBandit`] with fixed arm means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedMeansBanditConfig {
    pub means: Vec<f64>,
}

impl Default for FixedMeansBanditConfig {
    fn default() -> Self {
        Self {
            means: vec![0.2, 0.8],
        }
    }
}

impl BuildEnv for FixedMeansBanditConfig {
    type Environment = BernoulliBandit<FixedMeans>;

    fn build_env(&self, seed: u64) -> Result<Self::Environment, BuildEnvError> {
        if self.means.is_empty() {
            return Err(BuildEnvError::NoArms);
        }
        Ok(BernoulliBandit::new(FixedMeans::new(self.means.clone()), seed))
    }
}

/// Configuration for a [`BernoulliBandit`] with means sampled uniformly from `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniformMeansBanditConfig {
    pub num_arms: usize,
}

impl Default for UniformMeansBanditConfig {
    fn default() -> Self {
        Self { num_arms: 10 }
    }
}

impl BuildEnv for UniformMeansBanditConfig {
    type Environment = BernoulliBandit<PriorMeans<Uniform<f64>>>;

    fn build_env(&self, seed: u64) -> Result<Self::Environment, BuildEnvError> {
        if self.num_arms == 0 {
            return Err(BuildEnvError::NoArms);
        }
        Ok(BernoulliBandit::uniform(self.num_arms, seed))
    }
}

/// Configuration for a [`BernoulliBandit`] with means sampled from a Beta distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaMeansBanditConfig {
    pub num_arms: usize,
    pub alpha: f64,
    pub beta: f64,
}

impl Default for BetaMeansBanditConfig {
    fn default() -> Self {
        Self {
            num_arms: 10,
            alpha: 1.0,
            beta: 1.0,
        }
    }
}

impl BuildEnv for BetaMeansBanditConfig {
    type Environment = BernoulliBandit<PriorMeans<Beta<f64>>>;

    fn build_env(&self, seed: u64) -> Result<Self::Environment, BuildEnvError> {
        if self.num_arms == 0 {
            return Err(BuildEnvError::NoArms);
        }
        let prior = PriorMeans::beta(self.num_arms, self.alpha, self.beta)?;
        Ok(BernoulliBandit::new(prior, seed))
    }
}
