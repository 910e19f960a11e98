//! Montage Timeline - Edit decision lists
//!
//! Implements the output side of a matching run:
//! - Edit decisions and the EDL they form
//! - Recoverable-condition warnings carried alongside the EDL
//! - Assembly with contiguous timeline offsets and post-hoc validation
//! - Versioned JSON persistence

pub mod assemble;
pub mod decision;
pub mod serialization;

pub use assemble::{check_timeline, validate, EdlAssembler, SegmentCut, ValidationError};
pub use decision::{EditDecision, Edl, EdlStats, EdlWarning};
pub use serialization::EdlFile;
