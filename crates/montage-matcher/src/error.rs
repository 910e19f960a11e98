//! Error types for the matcher.

use montage_core::{EnergyLevel, MontageError};
use montage_timeline::ValidationError;
use thiserror::Error;

/// Errors that abort a matching run.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Blueprint, clip or configuration data the engine cannot use.
    #[error(transparent)]
    Input(#[from] MontageError),

    /// No clip in the index has a usable duration.
    #[error("Clip pool has no usable clips")]
    EmptyClipPool,

    /// The assembled EDL broke an internal invariant.
    #[error("EDL validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Why an advisor's nomination could not be used.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdviceError {
    /// The collaborator could not be reached.
    #[error("Advisor unavailable: {0}")]
    Unavailable(String),

    /// The collaborator answered with an error.
    #[error("Advisor failed: {0}")]
    Failed(String),

    /// The answer could not be parsed or is internally inconsistent.
    #[error("Malformed advice: {0}")]
    Malformed(String),

    /// The nominated clip and energy match no enumerated candidate.
    #[error("Advice names unknown candidate {clip_id} ({energy:?})")]
    UnknownCandidate { clip_id: String, energy: EnergyLevel },
}
