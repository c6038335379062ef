//! Agent testing utilities
use super::Policy;
use crate::envs::{BernoulliBandit, FixedMeans};
use crate::simulation::Simulation;

/// Check that the agent can be trained to perform well on a trivial bandit environment.
///
/// The environment is a deterministic multi-armed bandit with two arms:
/// the first arm always gives 0 reward and the second 1.
pub fn train_deterministic_bandit<A, F>(make_agent: F, num_train_steps: u64, threshold: f64)
where
    A: Policy,
    F: FnOnce(usize) -> A,
{
    let env = BernoulliBandit::new(FixedMeans::new(vec![0.0, 1.0]), 0);
    let agent = make_agent(2);
    let mut simulation = Simulation::new(agent, env);
    simulation.reset().unwrap();
    simulation.forward(num_train_steps).unwrap();

    let (agent, _, _) = simulation.into_parts();
    eval_deterministic_bandit(agent, threshold);
}

/// Evaluate a trained agent on the 0-1 deterministic bandit environment.
///
/// Decisions are made without further updates.
#[allow(clippy::cast_possible_truncation)]
pub fn eval_deterministic_bandit<A: Policy>(mut agent: A, threshold: f64) {
    let num_eval_steps = 1000;
    let action_1_count = (0..num_eval_steps)
        .filter(|_| agent.decide().unwrap() == 1)
        .count() as u64;
    assert!(
        action_1_count >= ((num_eval_steps as f64) * threshold) as u64,
        "chose the rewarding arm {} / {} times",
        action_1_count,
        num_eval_steps
    );
}
