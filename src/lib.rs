//! Multi-armed bandit agents and simulation.
//!
//! An agent ([`Policy`]) repeatedly chooses one of several arms of a bandit ([`RewardSource`])
//! and learns from the rewards. A [`Simulation`] couples the two and records the trajectory.
#![warn(clippy::cast_lossless)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::missing_const_for_fn)] // has some false positives
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::use_self)]
pub mod agents;
pub mod defs;
pub mod envs;
mod error;
pub mod logging;
pub mod simulation;
pub mod utils;

pub use agents::{BuildAgent, Policy};
pub use defs::{AgentDef, EnvDef, ExperimentDef};
pub use envs::{BuildEnv, RewardSource};
pub use error::{BanditError, SimError};
pub use simulation::{Simulation, Trajectory};
