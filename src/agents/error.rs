//! Agent errors
use thiserror::Error;

/// Error building an agent
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildAgentError {
    #[error("a bandit agent needs at least one arm")]
    NoArms,
    #[error("initial reward must be positive and finite, got {0}")]
    InvalidInitialReward(f64),
    #[error("exploration rate must be non-negative and finite, got {0}")]
    InvalidExplorationRate(f64),
}
