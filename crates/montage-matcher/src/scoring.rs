//! Alignment scores for a candidate moment.
//!
//! Three independent scores in `[0, 1]`: semantic fit with the segment's
//! intent, musical fit with the beat grid, and narrative continuity with the
//! previous pick.

use montage_core::{BeatGrid, ClipAsset, MomentRole, TargetSegment};
use serde::{Deserialize, Serialize};

const VIBE_WEIGHT: f64 = 0.4;
const SHOT_FUNCTION_WEIGHT: f64 = 0.3;
const ARC_ROLE_WEIGHT: f64 = 0.3;
const SEMANTIC_CHECKS: f64 = 3.0;

const BEAT_EDGE_SCORE: f64 = 0.4;
const BEAT_MULTIPLE_BONUS: f64 = 0.2;
const NEUTRAL_MUSICAL: f64 = 0.5;

const CONTINUITY_BASE: f64 = 0.5;
const REPEAT_PENALTY: f64 = 0.3;
const FLOW_BONUS: f64 = 0.3;

/// The clip and moment role chosen last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousPick {
    pub clip_path: String,
    pub role: Option<MomentRole>,
}

/// Scores attached to each candidate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AlignmentScores {
    pub semantic: f64,
    pub musical: f64,
    pub continuity: f64,
}

impl AlignmentScores {
    /// Unweighted mean of the three scores.
    pub fn mean(&self) -> f64 {
        (self.semantic + self.musical + self.continuity) / 3.0
    }
}

/// Semantic fit of a clip moment with a segment.
///
/// Vibe overlap contributes 0.4, a shot-function / utility match 0.3 and a
/// role / arc-stage match 0.3; the sum is averaged over the three checks.
pub fn semantic_alignment(
    segment: &TargetSegment,
    clip: &ClipAsset,
    role: Option<MomentRole>,
) -> f64 {
    let mut score = 0.0;

    if segment.shares_vibe(&clip.vibes) {
        score += VIBE_WEIGHT;
    }

    if let Some(function) = segment.shot_function {
        if function
            .served_by()
            .iter()
            .any(|u| clip.utilities.contains(u))
        {
            score += SHOT_FUNCTION_WEIGHT;
        }
    }

    if role.is_some_and(|r| segment.arc_stage.accepts(r)) {
        score += ARC_ROLE_WEIGHT;
    }

    (score / SEMANTIC_CHECKS).clamp(0.0, 1.0)
}

/// Musical fit of a cut placed at `[start, end)` on the timeline.
///
/// 0.4 each for a start and an end on a beat, plus 0.2 when the length is a
/// whole number of average beat intervals. Neutral 0.5 without a grid.
pub fn musical_alignment(beats: Option<&BeatGrid>, start: f64, end: f64, tolerance: f64) -> f64 {
    let Some(grid) = beats.filter(|g| !g.is_empty()) else {
        return NEUTRAL_MUSICAL;
    };

    let mut score = 0.0;
    if grid.is_on_beat(start, tolerance) {
        score += BEAT_EDGE_SCORE;
    }
    if grid.is_on_beat(end, tolerance) {
        score += BEAT_EDGE_SCORE;
    }

    if let Some(interval) = grid.average_interval() {
        let length = end - start;
        let multiple = (length / interval).round();
        if multiple >= 1.0 && (length - multiple * interval).abs() <= tolerance {
            score += BEAT_MULTIPLE_BONUS;
        }
    }

    score.min(1.0)
}

/// Continuity of a candidate with the previous pick.
///
/// Starts neutral, loses 0.3 for repeating the previous clip and gains 0.3
/// when its role is a natural successor of the previous role.
pub fn narrative_continuity(
    clip_path: &str,
    role: Option<MomentRole>,
    previous: Option<&PreviousPick>,
) -> f64 {
    let Some(previous) = previous else {
        return CONTINUITY_BASE;
    };

    let mut score = CONTINUITY_BASE;
    if previous.clip_path == clip_path {
        score -= REPEAT_PENALTY;
    }
    if let (Some(prev), Some(next)) = (previous.role, role) {
        if prev.flows_into(next) {
            score += FLOW_BONUS;
        }
    }
    score.clamp(0.0, 1.0)
}
