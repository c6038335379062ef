//! Bandit reward sources
mod bandits;
mod builder;

pub use bandits::{ArmPrior, BernoulliBandit, FixedMeans, PriorMeans};
pub use builder::{
    BetaMeansBanditConfig, BuildEnv, BuildEnvError, FixedMeansBanditConfig,
    UniformMeansBanditConfig,
};

use crate::BanditError;

/// A multi-armed bandit environment: produces a reward for each pulled arm.
///
/// The latent arm parameters are sampled on `reset()`, which must be called before the first
/// `step()` and may be called again to start a new episode.
pub trait RewardSource {
    /// Number of arms.
    fn num_arms(&self) -> usize;

    /// Sample new latent arm parameters for a fresh episode.
    ///
    /// # Errors
    /// [`BanditError::InvalidMean`] if a sampled arm parameter is invalid.
    /// The source is left uninitialized in that case.
    fn reset(&mut self) -> Result<(), BanditError>;

    /// Pull an arm and sample its reward.
    ///
    /// # Errors
    /// * [`BanditError::NotInitialized`] if `reset()` has not succeeded yet.
    /// * [`BanditError::InvalidArgument`] if `action` is not in `[0, num_arms)`.
    fn step(&mut self, action: usize) -> Result<f64, BanditError>;

    /// The expected reward of each arm in the current episode, if initialized.
    fn means(&self) -> Option<&[f64]>;
}

impl<E: RewardSource + ?Sized> RewardSource for &mut E {
    fn num_arms(&self) -> usize {
        E::num_arms(self)
    }
    fn reset(&mut self) -> Result<(), BanditError> {
        E::reset(self)
    }
    fn step(&mut self, action: usize) -> Result<f64, BanditError> {
        E::step(self, action)
    }
    fn means(&self) -> Option<&[f64]> {
        E::means(self)
    }
}

impl<E: RewardSource + ?Sized> RewardSource for Box<E> {
    fn num_arms(&self) -> usize {
        E::num_arms(self)
    }
    fn reset(&mut self) -> Result<(), BanditError> {
        E::reset(self)
    }
    fn step(&mut self, action: usize) -> Result<f64, BanditError> {
        E::step(self, action)
    }
    fn means(&self) -> Option<&[f64]> {
        E::means(self)
    }
}
