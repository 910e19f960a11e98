//! Montage Matcher - Clip-to-segment matching engine
//!
//! Assigns spans of source clips to the segments of a blueprint:
//! - Clip pool index by declared energy
//! - Per-run usage tracking (counts and playhead cursors)
//! - Candidate enumeration with semantic, musical and continuity scores
//! - Swappable selection policies (deterministic rotation, external advisor)
//! - Segment filling with chaining until each segment is covered
//!
//! The engine is single-threaded by construction: every step reads the
//! usage state the previous step wrote.

pub mod advisor;
pub mod candidate;
pub mod config;
pub mod engine;
pub mod error;
pub mod filler;
pub mod policy;
pub mod pool;
pub mod scoring;
pub mod usage;

pub use advisor::{parse_advice_reply, Advice, Advisor, CandidateSummary, SegmentContext};
pub use candidate::{CandidateBuilder, MomentCandidate};
pub use config::MatchConfig;
pub use engine::{MatchEngine, MatchOutcome};
pub use error::{AdviceError, MatchError};
pub use filler::{SegmentFill, SegmentFiller};
pub use policy::{
    AdvisedPolicy, RotationPolicy, Selection, SelectionContext, SelectionPolicy, SelectionSource,
};
pub use pool::{ClipPool, PoolLookup};
pub use scoring::{AlignmentScores, PreviousPick};
pub use usage::{CursorEvent, UsageState};
