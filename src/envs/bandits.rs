use super::RewardSource;
use crate::agents::to_arm_index;
use crate::BanditError;
use rand::distributions::{Bernoulli, Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Beta, BetaError};
use std::fmt;

/// A prior over the success probability of each bandit arm.
pub trait ArmPrior {
    /// Number of arms the prior produces means for.
    fn num_arms(&self) -> usize;

    /// Sample the mean of one arm. Called once per arm on every bandit reset.
    fn sample_mean(&self, arm: usize, rng: &mut StdRng) -> f64;
}

/// Fixed arm means; every reset produces the same values.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedMeans {
    means: Vec<f64>,
}

impl FixedMeans {
    pub fn new(means: Vec<f64>) -> Self {
        Self { means }
    }
}

impl ArmPrior for FixedMeans {
    fn num_arms(&self) -> usize {
        self.means.len()
    }

    fn sample_mean(&self, arm: usize, _: &mut StdRng) -> f64 {
        self.means[arm]
    }
}

impl fmt::Display for FixedMeans {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FixedMeans({:?})", self.means)
    }
}

/// Arm means sampled independently from a distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorMeans<D> {
    pub num_arms: usize,
    pub distribution: D,
}

impl<D> PriorMeans<D> {
    pub const fn new(num_arms: usize, distribution: D) -> Self {
        Self {
            num_arms,
            distribution,
        }
    }
}

impl PriorMeans<Uniform<f64>> {
    /// Means sampled uniformly from `[0, 1]`.
    pub fn uniform(num_arms: usize) -> Self {
        Self::new(num_arms, Uniform::new_inclusive(0.0, 1.0))
    }
}

impl PriorMeans<Beta<f64>> {
    /// Means sampled from a `Beta(alpha, beta)` distribution.
    pub fn beta(num_arms: usize, alpha: f64, beta: f64) -> Result<Self, BetaError> {
        Ok(Self::new(num_arms, Beta::new(alpha, beta)?))
    }
}

impl<D: Distribution<f64>> ArmPrior for PriorMeans<D> {
    fn num_arms(&self) -> usize {
        self.num_arms
    }

    fn sample_mean(&self, _: usize, rng: &mut StdRng) -> f64 {
        self.distribution.sample(rng)
    }
}

impl<D: fmt::Debug> fmt::Display for PriorMeans<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PriorMeans({}, {:?})", self.num_arms, self.distribution)
    }
}

/// Arm parameters of the current episode.
#[derive(Debug, Clone)]
struct Arms {
    means: Vec<f64>,
    rewards: Vec<Bernoulli>,
}

/// A multi-armed bandit with Bernoulli-distributed arm rewards.
///
/// The success probability of each arm is sampled from the prior on every reset.
/// Rewards are `0.0` or `1.0`.
#[derive(Debug, Clone)]
pub struct BernoulliBandit<P> {
    prior: P,
    /// `None` until the first successful reset.
    arms: Option<Arms>,
    rng: StdRng,
}

impl<P: ArmPrior> BernoulliBandit<P> {
    pub fn new(prior: P, seed: u64) -> Self {
        Self {
            prior,
            arms: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub const fn prior(&self) -> &P {
        &self.prior
    }
}

impl BernoulliBandit<PriorMeans<Uniform<f64>>> {
    /// A bandit whose arm means are sampled uniformly from `[0, 1]` on each reset.
    pub fn uniform(num_arms: usize, seed: u64) -> Self {
        Self::new(PriorMeans::uniform(num_arms), seed)
    }
}

impl<P: fmt::Display> fmt::Display for BernoulliBandit<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BernoulliBandit({})", self.prior)
    }
}

impl<P: ArmPrior> RewardSource for BernoulliBandit<P> {
    fn num_arms(&self) -> usize {
        self.prior.num_arms()
    }

    fn reset(&mut self) -> Result<(), BanditError> {
        self.arms = None;
        let num_arms = self.prior.num_arms();
        let mut means = Vec::with_capacity(num_arms);
        let mut rewards = Vec::with_capacity(num_arms);
        for arm in 0..num_arms {
            let mean = self.prior.sample_mean(arm, &mut self.rng);
            let reward = Bernoulli::new(mean).map_err(|_| BanditError::InvalidMean { arm, mean })?;
            means.push(mean);
            rewards.push(reward);
        }
        self.arms = Some(Arms { means, rewards });
        Ok(())
    }

    fn step(&mut self, action: usize) -> Result<f64, BanditError> {
        let arms = self
            .arms
            .as_ref()
            .ok_or(BanditError::NotInitialized("bandit"))?;
        let arm = to_arm_index(action, arms.rewards.len())?;
        let success = arms.rewards[arm].sample(&mut self.rng);
        Ok(if success { 1.0 } else { 0.0 })
    }

    fn means(&self) -> Option<&[f64]> {
        self.arms.as_ref().map(|arms| arms.means.as_slice())
    }
}

#[cfg(test)]
mod bernoulli_bandit {
    use super::*;
    use rstest::rstest;

    #[test]
    fn step_before_reset() {
        let mut env = BernoulliBandit::uniform(3, 0);
        assert_eq!(env.step(0), Err(BanditError::NotInitialized("bandit")));
        assert!(env.means().is_none());
    }

    #[rstest]
    #[case(2)]
    #[case(5)]
    fn step_out_of_range(#[case] action: usize) {
        let mut env = BernoulliBandit::uniform(2, 0);
        env.reset().unwrap();
        assert!(matches!(
            env.step(action),
            Err(BanditError::InvalidArgument { num_arms: 2, .. })
        ));
    }

    #[test]
    fn fixed_means_are_deterministic() {
        let mut env = BernoulliBandit::new(FixedMeans::new(vec![0.0, 1.0]), 0);
        env.reset().unwrap();
        assert_eq!(env.means(), Some(&[0.0, 1.0][..]));
        for _ in 0..100 {
            assert_eq!(env.step(0), Ok(0.0));
            assert_eq!(env.step(1), Ok(1.0));
        }
    }

    #[test]
    fn reward_frequency_matches_mean() {
        let mut env = BernoulliBandit::new(FixedMeans::new(vec![0.3]), 1);
        env.reset().unwrap();
        let total: f64 = (0..10_000).map(|_| env.step(0).unwrap()).sum();
        assert!((total / 10_000.0 - 0.3).abs() < 0.03, "{}", total);
    }

    #[rstest]
    #[case(vec![0.5, 1.5], 1, 1.5)]
    #[case(vec![-0.1], 0, -0.1)]
    fn invalid_mean(#[case] means: Vec<f64>, #[case] arm: usize, #[case] mean: f64) {
        let mut env = BernoulliBandit::new(FixedMeans::new(means), 0);
        assert_eq!(env.reset(), Err(BanditError::InvalidMean { arm, mean }));
        assert!(env.means().is_none());
        assert!(matches!(env.step(0), Err(BanditError::NotInitialized(_))));
    }

    #[test]
    fn uniform_resamples_on_reset() {
        let mut env = BernoulliBandit::uniform(4, 7);
        env.reset().unwrap();
        let first = env.means().unwrap().to_vec();
        assert!(first.iter().all(|m| (0.0..=1.0).contains(m)));
        env.reset().unwrap();
        assert_ne!(env.means().unwrap(), first.as_slice());
    }

    #[test]
    fn seeded_rewards_repeat() {
        let rewards = |seed| {
            let mut env = BernoulliBandit::uniform(3, seed);
            env.reset().unwrap();
            (0..50)
                .map(|i| env.step(i % 3).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(rewards(11), rewards(11));
    }

    #[test]
    fn beta_prior_means_in_range() {
        let mut env = BernoulliBandit::new(PriorMeans::beta(5, 2.0, 5.0).unwrap(), 3);
        env.reset().unwrap();
        assert_eq!(env.means().unwrap().len(), 5);
        assert!(env.means().unwrap().iter().all(|m| (0.0..=1.0).contains(m)));
    }

    #[test]
    fn invalid_beta_prior() {
        assert!(PriorMeans::beta(2, 0.0, 1.0).is_err());
    }
}
