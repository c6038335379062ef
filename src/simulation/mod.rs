//! Simulating agent-environment interaction
mod summary;

pub use summary::TrajectorySummary;

use crate::agents::Policy;
use crate::envs::RewardSource;
use crate::logging::{Event, Loggable, Logger, LoggerHelper};
use crate::BanditError;
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};

/// Per-step record of one episode.
///
/// The four sequences are parallel: entry `i` of each describes step `i`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// The arm chosen on each step.
    pub actions: Vec<usize>,
    /// The reward observed on each step.
    pub rewards: Vec<f64>,
    /// The agent's value estimate of the chosen arm, before the update.
    pub chosen_estimates: Vec<f64>,
    /// The agent's maximum value estimate over all arms, before the update.
    pub max_estimates: Vec<f64>,
}

impl Trajectory {
    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn clear(&mut self) {
        self.actions.clear();
        self.rewards.clear();
        self.chosen_estimates.clear();
        self.max_estimates.clear();
    }
}

/// Serial agent-environment simulation that records the episode trajectory.
///
/// The agent and environment may be owned values or mutable references
/// (both [`Policy`] and [`RewardSource`] are implemented for `&mut T`).
pub struct Simulation<A, E, L = ()> {
    agent: A,
    env: E,
    logger: L,
    /// `None` until the first successful reset.
    trajectory: Option<Trajectory>,
}

impl<A, E> Simulation<A, E> {
    /// Create a simulation that does not log.
    pub const fn new(agent: A, env: E) -> Self {
        Self::with_logger(agent, env, ())
    }
}

impl<A, E, L> Simulation<A, E, L> {
    pub const fn with_logger(agent: A, env: E, logger: L) -> Self {
        Self {
            agent,
            env,
            logger,
            trajectory: None,
        }
    }

    /// The trajectory of the current episode; `None` before the first reset.
    pub const fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    pub const fn agent(&self) -> &A {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut A {
        &mut self.agent
    }

    pub const fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn logger_mut(&mut self) -> &mut L {
        &mut self.logger
    }

    pub fn into_parts(self) -> (A, E, L) {
        (self.agent, self.env, self.logger)
    }
}

impl<A, E, L> Simulation<A, E, L>
where
    A: Policy,
    E: RewardSource,
    L: Logger,
{
    /// Start a new episode.
    ///
    /// Clears the recorded trajectory then resets the environment and the agent.
    ///
    /// # Errors
    /// Any error from resetting the environment. The simulation is then uninitialized.
    pub fn reset(&mut self) -> Result<(), BanditError> {
        match self.trajectory.take() {
            Some(mut trajectory) => {
                if !trajectory.is_empty() {
                    self.log_episode(&trajectory);
                }
                trajectory.clear();
                self.env.reset()?;
                self.trajectory = Some(trajectory);
            }
            None => {
                self.env.reset()?;
                self.trajectory = Some(Trajectory::default());
            }
        }
        self.agent.reset();
        Ok(())
    }

    /// Run `num_steps` steps of agent-environment interaction.
    ///
    /// # Errors
    /// * [`BanditError::NotInitialized`] if called before [`Simulation::reset`].
    /// * Any error from the agent or environment. The failing step is not recorded;
    ///   earlier steps remain recorded.
    pub fn forward(&mut self, num_steps: u64) -> Result<(), BanditError> {
        let trajectory = self
            .trajectory
            .as_mut()
            .ok_or(BanditError::NotInitialized("simulation"))?;
        let num_arms = self.agent.num_arms();
        for _ in 0..num_steps {
            let action = self.agent.decide()?;
            let estimates = self.agent.value_estimates();
            let chosen_estimate = estimates[action];
            let max_estimate = *estimates
                .max()
                .map_err(|err| BanditError::InvalidState(format!("value estimates: {}", err)))?;

            let reward = self.env.step(action)?;
            self.agent.update(action, reward)?;

            trajectory.actions.push(action);
            trajectory.rewards.push(reward);
            trajectory.chosen_estimates.push(chosen_estimate);
            trajectory.max_estimates.push(max_estimate);

            let logger = &mut self.logger;
            logger.unwrap_log(Event::Step, "reward", reward);
            logger.unwrap_log(
                Event::Step,
                "action",
                Loggable::IndexSample {
                    value: action,
                    size: num_arms,
                },
            );
            logger.unwrap_log(Event::Step, "estimate", chosen_estimate);
            logger.unwrap_log(Event::Step, "max_estimate", max_estimate);
            logger.done(Event::Step);
        }
        Ok(())
    }

    /// Summary statistics of the current episode; `None` before the first reset.
    pub fn summary(&self) -> Option<TrajectorySummary> {
        let trajectory = self.trajectory.as_ref()?;
        Some(TrajectorySummary::new(
            trajectory,
            self.agent.num_arms(),
            self.env.means(),
        ))
    }

    fn log_episode(&mut self, trajectory: &Trajectory) {
        let summary = TrajectorySummary::new(trajectory, self.agent.num_arms(), self.env.means());
        let logger = &mut self.logger;
        logger.unwrap_log(Event::Episode, "episode_reward", summary.total_reward);
        logger.unwrap_log(Event::Episode, "episode_length", summary.num_steps as f64);
        if let Some(fraction) = summary.optimal_action_fraction {
            logger.unwrap_log(Event::Episode, "optimal_action_fraction", fraction);
        }
        logger.done(Event::Episode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{
        BuildAgent, EpsilonGreedyAgentConfig, GreedyAgent, GreedyAgentConfig,
    };
    use crate::envs::{BernoulliBandit, FixedMeans, PriorMeans};
    use crate::logging::LogError;
    use rand::distributions::Uniform;

    fn deterministic_env() -> BernoulliBandit<FixedMeans> {
        BernoulliBandit::new(FixedMeans::new(vec![0.0, 1.0]), 0)
    }

    fn greedy_agent(seed: u64) -> GreedyAgent {
        GreedyAgentConfig::new(1.0).build_agent(2, seed).unwrap()
    }

    #[test]
    fn forward_before_reset() {
        let mut sim = Simulation::new(greedy_agent(0), deterministic_env());
        assert_eq!(
            sim.forward(3),
            Err(BanditError::NotInitialized("simulation"))
        );
        assert!(sim.trajectory().is_none());
    }

    #[test]
    fn forward_zero_after_reset() {
        let mut sim = Simulation::new(greedy_agent(0), deterministic_env());
        sim.reset().unwrap();
        sim.forward(0).unwrap();
        assert_eq!(sim.trajectory(), Some(&Trajectory::default()));
    }

    #[test]
    fn sequences_are_parallel() {
        let mut sim = Simulation::new(
            EpsilonGreedyAgentConfig::new(0.3, 1.0)
                .build_agent(5, 0)
                .unwrap(),
            BernoulliBandit::uniform(5, 1),
        );
        sim.reset().unwrap();
        sim.forward(40).unwrap();
        sim.forward(10).unwrap();
        let trajectory = sim.trajectory().unwrap();
        assert_eq!(trajectory.len(), 50);
        assert_eq!(trajectory.rewards.len(), 50);
        assert_eq!(trajectory.chosen_estimates.len(), 50);
        assert_eq!(trajectory.max_estimates.len(), 50);
        for (chosen, max) in trajectory
            .chosen_estimates
            .iter()
            .zip(&trajectory.max_estimates)
        {
            assert!(chosen <= max);
        }
    }

    /// Two arms with means 0 and 1: once the rewarding arm pays out, greedy sticks to it.
    #[rstest::rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn greedy_deterministic_scenario(#[case] seed: u64) {
        let mut sim = Simulation::new(greedy_agent(seed), deterministic_env());
        sim.reset().unwrap();
        sim.forward(3).unwrap();
        let trajectory = sim.trajectory().unwrap();

        // Both arms start tied at 1.0
        assert_eq!(trajectory.chosen_estimates[0], 1.0);
        assert_eq!(trajectory.max_estimates[0], 1.0);
        for (&action, &reward) in trajectory.actions.iter().zip(&trajectory.rewards) {
            assert_eq!(reward, action as f64);
        }
        // Arm 1 stays at (1 + 1) / 2 = 1.0 after paying out, arm 0 drops to 0.5 once pulled.
        // So arm 0 is pulled at most once and never after its only pull.
        let arm_0_pulls = trajectory.actions.iter().filter(|&&a| a == 0).count();
        assert!(arm_0_pulls <= 1);
        if let Some(first_0) = trajectory.actions.iter().position(|&a| a == 0) {
            assert!(trajectory.actions[first_0 + 1..].iter().all(|&a| a == 1));
        }
        // Pre-update estimates: every recorded max is 1.0 since arm 1 never drops below 1.0
        assert!(trajectory.max_estimates.iter().all(|&m| m == 1.0));
    }

    #[test]
    fn greedy_settles_after_one_exploratory_pull() {
        let mut sim = Simulation::new(greedy_agent(0), deterministic_env());
        sim.reset().unwrap();
        sim.forward(200).unwrap();
        let actions = &sim.trajectory().unwrap().actions;
        // With 200 ties-or-better steps, arm 0 is tried exactly once (probability 1 - 2^-199).
        assert_eq!(actions.iter().filter(|&&a| a == 0).count(), 1);
        let estimates = sim.agent().value_estimates();
        assert_eq!(estimates[0], 0.5);
        assert_eq!(estimates[1], 1.0);
    }

    #[test]
    fn reset_clears_and_restarts() {
        let mut sim = Simulation::new(greedy_agent(0), deterministic_env());
        sim.reset().unwrap();
        sim.forward(5).unwrap();
        sim.reset().unwrap();
        assert!(sim.trajectory().unwrap().is_empty());
        assert_eq!(
            sim.agent().statistics().pull_counts().to_vec(),
            vec![0, 0]
        );
        sim.forward(2).unwrap();
        assert_eq!(sim.trajectory().unwrap().len(), 2);
    }

    #[test]
    fn seeded_runs_repeat() {
        let run = |seed: u64| {
            let agent = EpsilonGreedyAgentConfig::new(0.2, 1.0)
                .build_agent(6, seed)
                .unwrap();
            let mut sim = Simulation::new(agent, BernoulliBandit::uniform(6, seed + 1));
            sim.reset().unwrap();
            sim.forward(100).unwrap();
            sim.trajectory().unwrap().clone()
        };
        assert_eq!(run(4), run(4));
    }

    #[test]
    fn borrowed_parts_stay_with_caller() {
        let mut agent = greedy_agent(0);
        let mut env = deterministic_env();
        {
            let mut sim = Simulation::new(&mut agent, &mut env);
            sim.reset().unwrap();
            sim.forward(4).unwrap();
        }
        assert_eq!(agent.statistics().pull_counts().sum(), 4);
        assert!(env.means().is_some());
    }

    #[test]
    fn environment_error_aborts_without_rollback() {
        // The agent believes there are three arms but the bandit has two.
        let agent = GreedyAgentConfig::new(1.0).build_agent(3, 0).unwrap();
        let mut sim = Simulation::new(agent, deterministic_env());
        sim.reset().unwrap();
        let mut result = Ok(());
        for _ in 0..100 {
            result = sim.forward(1);
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(BanditError::InvalidArgument { .. })));
        let trajectory = sim.trajectory().unwrap();
        assert!(trajectory.actions.iter().all(|&a| a < 2));
        assert_eq!(trajectory.rewards.len(), trajectory.len());
    }

    #[test]
    fn invalid_prior_fails_reset() {
        let env = BernoulliBandit::new(PriorMeans::new(2, Uniform::new(1.5, 2.0)), 0);
        let mut sim = Simulation::new(greedy_agent(0), env);
        assert!(matches!(sim.reset(), Err(BanditError::InvalidMean { .. })));
        assert_eq!(
            sim.forward(1),
            Err(BanditError::NotInitialized("simulation"))
        );
    }

    /// Records every logged (event, name, value).
    #[derive(Debug, Default)]
    struct RecordingLogger {
        entries: Vec<(Event, String, Loggable)>,
        done: Vec<Event>,
    }

    impl Logger for RecordingLogger {
        fn log<'a>(
            &mut self,
            event: Event,
            name: &'a str,
            value: Loggable,
        ) -> Result<(), LogError<'a>> {
            self.entries.push((event, name.into(), value));
            Ok(())
        }

        fn done(&mut self, event: Event) {
            self.done.push(event);
        }
    }

    #[test]
    fn logs_steps_and_episodes() {
        let mut sim = Simulation::with_logger(
            greedy_agent(0),
            deterministic_env(),
            RecordingLogger::default(),
        );
        sim.reset().unwrap();
        sim.forward(3).unwrap();
        sim.reset().unwrap();

        let logger = sim.logger_mut();
        assert_eq!(
            logger.done,
            vec![Event::Step, Event::Step, Event::Step, Event::Episode]
        );
        let rewards = logger
            .entries
            .iter()
            .filter(|(event, name, _)| *event == Event::Step && name == "reward")
            .count();
        assert_eq!(rewards, 3);
        assert!(logger.entries.contains(&(
            Event::Episode,
            "episode_length".into(),
            Loggable::Scalar(3.0)
        )));
    }

    #[test]
    fn summary_matches_trajectory() {
        let mut sim = Simulation::new(greedy_agent(0), deterministic_env());
        assert!(sim.summary().is_none());
        sim.reset().unwrap();
        sim.forward(10).unwrap();
        let summary = sim.summary().unwrap();
        assert_eq!(summary.num_steps, 10);
        assert_eq!(summary.action_counts.iter().sum::<u64>(), 10);
        // Only arm 1 pays out and it is the only optimal arm.
        let arm_1_pulls = summary.action_counts[1] as f64;
        assert_eq!(summary.total_reward, arm_1_pulls);
        assert_eq!(summary.optimal_action_fraction, Some(arm_1_pulls / 10.0));
    }
}
