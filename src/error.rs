//! Error types
use crate::agents::BuildAgentError;
use crate::envs::BuildEnvError;
use std::io;
use thiserror::Error;

/// Error raised while running a bandit simulation.
///
/// Raised immediately to the caller; nothing is clamped or retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BanditError {
    /// An action index is outside `[0, num_arms)` or not convertible to an index.
    #[error("invalid action {action}: must be an integer in [0, {num_arms})")]
    InvalidArgument { action: String, num_arms: usize },
    /// An operation requires a prior call to `reset()`.
    #[error("{0} is not initialized; call reset() first")]
    NotInitialized(&'static str),
    /// The action weights cannot be normalized into a distribution.
    #[error("invalid action weights: {0}")]
    InvalidState(String),
    /// An arm prior produced a success probability outside `[0, 1]`.
    #[error("arm {arm} has invalid success probability {mean}")]
    InvalidMean { arm: usize, mean: f64 },
}

/// Error from the bandit simulation crate.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("error building agent")]
    BuildAgent(#[from] BuildAgentError),
    #[error("error building environment")]
    BuildEnv(#[from] BuildEnvError),
    #[error(transparent)]
    Bandit(#[from] BanditError),
    #[error("error reading experiment config")]
    Io(#[from] io::Error),
    #[error("error parsing experiment config")]
    Json(#[from] serde_json::Error),
}
