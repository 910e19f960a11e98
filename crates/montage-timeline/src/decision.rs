//! Edit decisions, warnings and the EDL.

use montage_core::{EnergyLevel, TimeSpan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One span of the output timeline mapped to a span of a source clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditDecision {
    pub segment_id: u32,
    pub clip_path: String,
    pub clip_start: f64,
    pub clip_end: f64,
    pub timeline_start: f64,
    pub timeline_end: f64,
    pub reasoning: String,
}

impl EditDecision {
    /// Length on the timeline.
    pub fn duration(&self) -> f64 {
        self.timeline_end - self.timeline_start
    }

    pub fn clip_span(&self) -> TimeSpan {
        TimeSpan::new(self.clip_start, self.clip_end)
    }

    pub fn timeline_span(&self) -> TimeSpan {
        TimeSpan::new(self.timeline_start, self.timeline_end)
    }
}

/// A recoverable condition met while producing an EDL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EdlWarning {
    /// No clip declared the segment's energy; the full pool was used.
    DegradedPool { segment_id: u32, energy: EnergyLevel },
    /// A clip's cursor reached its end and was rewound.
    ClipExhausted { segment_id: u32, clip_path: String },
    /// An allocation came out shorter than the minimum cut and was dropped.
    DegenerateAllocation {
        segment_id: u32,
        clip_path: String,
        length: f64,
    },
    /// No compatible follow-up candidate; the segment is short by `shortfall`.
    UnderFilled { segment_id: u32, shortfall: f64 },
    /// The advisor failed or answered badly; rotation chose instead.
    AdvisorFallback { segment_id: u32, reason: String },
    /// Decisions do not add up to the blueprint's declared total.
    DurationMismatch { declared: f64, actual: f64 },
}

impl EdlWarning {
    /// Segment the warning refers to, if any.
    pub fn segment_id(&self) -> Option<u32> {
        match self {
            Self::DegradedPool { segment_id, .. }
            | Self::ClipExhausted { segment_id, .. }
            | Self::DegenerateAllocation { segment_id, .. }
            | Self::UnderFilled { segment_id, .. }
            | Self::AdvisorFallback { segment_id, .. } => Some(*segment_id),
            Self::DurationMismatch { .. } => None,
        }
    }

    /// Whether this warning lowers the quality of the edit itself, as opposed
    /// to recording routine bookkeeping such as a cursor rewind.
    pub fn is_degradation(&self) -> bool {
        matches!(
            self,
            Self::DegradedPool { .. } | Self::UnderFilled { .. } | Self::DurationMismatch { .. }
        )
    }
}

impl fmt::Display for EdlWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegradedPool { segment_id, energy } => write!(
                f,
                "segment {segment_id}: no {} clips, used full pool",
                energy.display_name()
            ),
            Self::ClipExhausted {
                segment_id,
                clip_path,
            } => write!(f, "segment {segment_id}: {clip_path} exhausted, cursor reset"),
            Self::DegenerateAllocation {
                segment_id,
                clip_path,
                length,
            } => write!(
                f,
                "segment {segment_id}: discarded {length:.3}s cut from {clip_path}"
            ),
            Self::UnderFilled {
                segment_id,
                shortfall,
            } => write!(f, "segment {segment_id}: under-filled by {shortfall:.3}s"),
            Self::AdvisorFallback { segment_id, reason } => {
                write!(f, "segment {segment_id}: advisor fallback ({reason})")
            }
            Self::DurationMismatch { declared, actual } => write!(
                f,
                "timeline is {actual:.3}s, blueprint declares {declared:.3}s"
            ),
        }
    }
}

/// An ordered edit decision list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edl {
    /// Total declared by the blueprint.
    pub total_duration: f64,
    pub decisions: Vec<EditDecision>,
    #[serde(default)]
    pub warnings: Vec<EdlWarning>,
}

impl Edl {
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// End of the last decision, or zero for an empty list.
    pub fn timeline_end(&self) -> f64 {
        self.decisions.last().map(|d| d.timeline_end).unwrap_or(0.0)
    }

    /// Decisions belonging to one segment.
    pub fn decisions_for_segment(&self, segment_id: u32) -> impl Iterator<Item = &EditDecision> {
        self.decisions
            .iter()
            .filter(move |d| d.segment_id == segment_id)
    }

    /// Whether any warning lowered the edit's quality.
    pub fn is_degraded(&self) -> bool {
        self.warnings.iter().any(EdlWarning::is_degradation)
    }

    /// Summary statistics of the cut list.
    pub fn stats(&self) -> EdlStats {
        let lengths: Vec<f64> = self.decisions.iter().map(EditDecision::duration).collect();
        let mut clip_usage = BTreeMap::new();
        for decision in &self.decisions {
            *clip_usage.entry(decision.clip_path.clone()).or_insert(0) += 1;
        }

        let avg_cut = if lengths.is_empty() {
            0.0
        } else {
            lengths.iter().sum::<f64>() / lengths.len() as f64
        };

        EdlStats {
            cut_count: lengths.len(),
            avg_cut,
            min_cut: lengths.iter().copied().reduce(f64::min).unwrap_or(0.0),
            max_cut: lengths.iter().copied().reduce(f64::max).unwrap_or(0.0),
            clip_usage,
            warning_count: self.warnings.len(),
            degraded: self.is_degraded(),
        }
    }
}

/// Summary of an EDL for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdlStats {
    pub cut_count: usize,
    /// Average cut length in seconds.
    pub avg_cut: f64,
    pub min_cut: f64,
    pub max_cut: f64,
    /// Number of decisions per clip path.
    pub clip_usage: BTreeMap<String, usize>,
    pub warning_count: usize,
    pub degraded: bool,
}
