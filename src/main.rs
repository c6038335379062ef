use bandit_sim::agents::{
    DecayingEpsilonGreedyAgentConfig, EpsilonGreedyAgentConfig, GreedyAgentConfig,
};
use bandit_sim::envs::{BetaMeansBanditConfig, FixedMeansBanditConfig, UniformMeansBanditConfig};
use bandit_sim::logging::CLILogger;
use bandit_sim::{AgentDef, EnvDef, ExperimentDef, SimError};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// How bandit arm means are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ArmPriorType {
    /// Sampled uniformly from [0, 1] on each reset.
    Uniform,
    /// Sampled from Beta(--alpha, --beta) on each reset.
    Beta,
    /// Fixed to --means.
    Fixed,
}

/// Agent name
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AgentType {
    Greedy,
    EpsilonGreedy,
    DecayingEpsilonGreedy,
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Simulate bandit agents on Bernoulli multi-armed bandits",
    after_help = "Options are ignored when --config is given."
)]
struct Options {
    /// JSON experiment definition
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of bandit arms
    #[arg(long, default_value_t = 10, help_heading = "ENVIRONMENT OPTIONS")]
    arms: usize,

    /// How arm means are generated
    #[arg(long, value_enum, default_value_t = ArmPriorType::Uniform, help_heading = "ENVIRONMENT OPTIONS")]
    prior: ArmPriorType,

    /// Arm means for the fixed prior
    #[arg(long, value_delimiter = ',', help_heading = "ENVIRONMENT OPTIONS")]
    means: Vec<f64>,

    /// Beta prior alpha
    #[arg(long, default_value_t = 1.0, help_heading = "ENVIRONMENT OPTIONS")]
    alpha: f64,

    /// Beta prior beta
    #[arg(long, default_value_t = 1.0, help_heading = "ENVIRONMENT OPTIONS")]
    beta: f64,

    /// Agent type
    #[arg(long, value_enum, default_value_t = AgentType::Greedy, help_heading = "AGENT OPTIONS")]
    agent: AgentType,

    /// Exploration rate (initial rate for the decaying agent)
    #[arg(long, default_value_t = 0.1, help_heading = "AGENT OPTIONS")]
    epsilon: f64,

    /// Optimistic initial value estimate of each arm
    #[arg(long, default_value_t = 1.0, help_heading = "AGENT OPTIONS")]
    reward_initial: f64,

    /// Steps per trial
    #[arg(long, default_value_t = 1000)]
    steps: u64,

    /// Number of independent trials
    #[arg(long, default_value_t = 1)]
    trials: u64,

    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Milliseconds between logger summaries
    #[arg(long, default_value_t = 1000)]
    log_period_ms: u64,
}

impl From<&Options> for EnvDef {
    fn from(opts: &Options) -> Self {
        match opts.prior {
            ArmPriorType::Uniform => Self::UniformMeans(UniformMeansBanditConfig {
                num_arms: opts.arms,
            }),
            ArmPriorType::Beta => Self::BetaMeans(BetaMeansBanditConfig {
                num_arms: opts.arms,
                alpha: opts.alpha,
                beta: opts.beta,
            }),
            ArmPriorType::Fixed => Self::FixedMeans(FixedMeansBanditConfig {
                means: opts.means.clone(),
            }),
        }
    }
}

impl From<&Options> for AgentDef {
    fn from(opts: &Options) -> Self {
        match opts.agent {
            AgentType::Greedy => Self::Greedy(GreedyAgentConfig::new(opts.reward_initial)),
            AgentType::EpsilonGreedy => Self::EpsilonGreedy(EpsilonGreedyAgentConfig::new(
                opts.epsilon,
                opts.reward_initial,
            )),
            AgentType::DecayingEpsilonGreedy => Self::DecayingEpsilonGreedy(
                DecayingEpsilonGreedyAgentConfig::new(opts.epsilon, opts.reward_initial),
            ),
        }
    }
}

impl From<&Options> for ExperimentDef {
    fn from(opts: &Options) -> Self {
        Self {
            env: opts.into(),
            agent: opts.into(),
            num_trials: opts.trials,
            num_steps: opts.steps,
            seed: opts.seed,
        }
    }
}

fn main() -> Result<(), SimError> {
    let opts = Options::parse();
    let experiment = match &opts.config {
        Some(path) => ExperimentDef::from_json_file(path)?,
        None => ExperimentDef::from(&opts),
    };
    println!("Experiment:\n{:#?}", experiment);

    let mut logger = CLILogger::new(Duration::from_millis(opts.log_period_ms), true);
    let result = experiment.run(&mut logger, |trial, summary| {
        println!("==== Trial {} ====\n{}", trial, summary);
    })?;
    drop(logger);

    println!("Mean reward per step: {}", result.mean_reward);
    Ok(())
}
