//! EDL assembly and validation.
//!
//! The assembler owns the timeline axis: callers hand it clip spans per
//! segment and it assigns offsets, so contiguity is exact by construction.
//! `validate` re-checks every invariant after the fact; a failure here means
//! an internal bug, not bad input data.

use montage_core::ClipIndex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::decision::{EditDecision, Edl, EdlWarning};

/// Clip-side length mismatch accepted between a decision's two spans.
const SPAN_EPSILON: f64 = 1e-9;

/// Hard validator failures.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// The first decision does not start the timeline.
    #[error("timeline starts at {start}s instead of 0")]
    NonZeroStart { start: f64 },

    /// A gap or overlap between consecutive decisions.
    #[error("decision {index} starts at {actual}s, previous ends at {expected}s")]
    Discontinuity {
        index: usize,
        expected: f64,
        actual: f64,
    },

    /// A decision with empty or mismatched spans.
    #[error("decision {index} is malformed: {reason}")]
    InvalidDecision { index: usize, reason: String },

    /// A decision references a clip that is not in the pool.
    #[error("decision {index} references unknown clip {clip_path}")]
    UnknownClip { index: usize, clip_path: String },
}

/// A span of a source clip allocated to a segment, before timeline placement.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentCut {
    pub clip_path: String,
    pub clip_start: f64,
    pub clip_end: f64,
    pub reasoning: String,
}

impl SegmentCut {
    pub fn duration(&self) -> f64 {
        self.clip_end - self.clip_start
    }
}

/// Concatenates per-segment cuts into one EDL.
#[derive(Debug)]
pub struct EdlAssembler {
    total_duration: f64,
    decisions: Vec<EditDecision>,
    warnings: Vec<EdlWarning>,
    cursor: f64,
}

impl EdlAssembler {
    /// Start an EDL for a blueprint declaring `total_duration`.
    pub fn new(total_duration: f64) -> Self {
        Self {
            total_duration,
            decisions: Vec::new(),
            warnings: Vec::new(),
            cursor: 0.0,
        }
    }

    /// Current end of the assembled timeline.
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Append one segment's cuts in order.
    pub fn push_segment(&mut self, segment_id: u32, cuts: impl IntoIterator<Item = SegmentCut>) {
        for cut in cuts {
            let timeline_start = self.cursor;
            let timeline_end = timeline_start + cut.duration();
            debug!(
                segment = segment_id,
                clip = %cut.clip_path,
                timeline_start,
                timeline_end,
                "Placing cut"
            );
            self.decisions.push(EditDecision {
                segment_id,
                clip_path: cut.clip_path,
                clip_start: cut.clip_start,
                clip_end: cut.clip_end,
                timeline_start,
                timeline_end,
                reasoning: cut.reasoning,
            });
            self.cursor = timeline_end;
        }
    }

    /// Record a recoverable condition.
    pub fn warn(&mut self, warning: EdlWarning) {
        self.warnings.push(warning);
    }

    /// Record several recoverable conditions.
    pub fn extend_warnings(&mut self, warnings: impl IntoIterator<Item = EdlWarning>) {
        self.warnings.extend(warnings);
    }

    /// Validate and produce the EDL.
    pub fn finish(self, clips: &ClipIndex, tolerance: f64) -> Result<Edl, ValidationError> {
        let mut edl = Edl {
            total_duration: self.total_duration,
            decisions: self.decisions,
            warnings: self.warnings,
        };
        if let Some(mismatch) = validate(&edl, clips, tolerance)? {
            edl.warnings.push(mismatch);
        }
        Ok(edl)
    }
}

/// Check the EDL's invariants against the clip pool.
///
/// Returns a `DurationMismatch` warning when the decisions add up to more
/// than `tolerance` away from the declared total; that is reported, not fatal.
pub fn validate(
    edl: &Edl,
    clips: &ClipIndex,
    tolerance: f64,
) -> Result<Option<EdlWarning>, ValidationError> {
    check_timeline(edl)?;
    for (index, decision) in edl.decisions.iter().enumerate() {
        if !clips.contains(&decision.clip_path) {
            return Err(ValidationError::UnknownClip {
                index,
                clip_path: decision.clip_path.clone(),
            });
        }
    }

    let actual: f64 = edl.decisions.iter().map(EditDecision::duration).sum();
    if (actual - edl.total_duration).abs() > tolerance {
        warn!(
            declared = edl.total_duration,
            actual, "EDL duration differs from blueprint"
        );
        return Ok(Some(EdlWarning::DurationMismatch {
            declared: edl.total_duration,
            actual,
        }));
    }
    Ok(None)
}

/// The checks that need no clip pool: the timeline starts at zero, runs
/// without gaps or overlaps, and every decision spans positive, equal
/// lengths on both sides.
pub fn check_timeline(edl: &Edl) -> Result<(), ValidationError> {
    if let Some(first) = edl.decisions.first() {
        if first.timeline_start != 0.0 {
            return Err(ValidationError::NonZeroStart {
                start: first.timeline_start,
            });
        }
    }

    let mut previous_end = 0.0;
    for (index, decision) in edl.decisions.iter().enumerate() {
        if index > 0 && decision.timeline_start != previous_end {
            return Err(ValidationError::Discontinuity {
                index,
                expected: previous_end,
                actual: decision.timeline_start,
            });
        }
        check_decision(index, decision)?;
        previous_end = decision.timeline_end;
    }
    Ok(())
}

fn check_decision(index: usize, decision: &EditDecision) -> Result<(), ValidationError> {
    let clip_len = decision.clip_end - decision.clip_start;
    let timeline_len = decision.timeline_end - decision.timeline_start;
    let reason = if clip_len.is_nan() || clip_len <= 0.0 {
        Some(format!("clip span {} is empty", decision.clip_span()))
    } else if timeline_len.is_nan() || timeline_len <= 0.0 {
        Some(format!("timeline span {} is empty", decision.timeline_span()))
    } else if (clip_len - timeline_len).abs() > SPAN_EPSILON {
        Some(format!(
            "clip length {clip_len:.6}s differs from timeline length {timeline_len:.6}s"
        ))
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ValidationError::InvalidDecision { index, reason }),
        None => Ok(()),
    }
}
