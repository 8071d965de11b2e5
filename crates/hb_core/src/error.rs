use thiserror::Error;

use crate::engine::MatchPhase;

/// Engine error taxonomy.
///
/// Gameplay failures (an evaded tackle, a misjudged pass) are never errors:
/// they travel as `ActionResult` outcomes through the event handler.
#[derive(Error, Debug)]
pub enum SimError {
    /// Rejected before the simulation starts.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A phase setup invariant was violated. Fatal for the match.
    #[error("Setup error entering {phase:?}: {reason}")]
    Setup { phase: MatchPhase, reason: String },

    /// Unexpected inconsistency detected during a tick. Fatal for the match.
    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SimError {
    /// Errors that abort a running match (as opposed to boundary errors).
    pub fn is_abort(&self) -> bool {
        matches!(self, SimError::Setup { .. } | SimError::Runtime(_))
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
