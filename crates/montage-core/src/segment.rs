//! Target segments and the blueprint they form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{MontageError, Result};
use crate::tags::{ArcStage, EnergyLevel, MotionLevel, ShotFunction};
use crate::time::TimeSpan;

/// One span of the reference timeline with its editorial intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSegment {
    /// Ordinal id
    pub id: u32,
    /// Start on the reference timeline
    pub start: f64,
    /// End on the reference timeline
    pub end: f64,
    /// Duration to fill
    pub duration: f64,
    pub energy: EnergyLevel,
    #[serde(default)]
    pub motion: MotionLevel,
    /// Free-text vibe tags
    #[serde(default)]
    pub vibes: Vec<String>,
    pub arc_stage: ArcStage,
    #[serde(default)]
    pub shot_function: Option<ShotFunction>,
    /// Suggested hold length for a single shot, in seconds.
    #[serde(default)]
    pub expected_hold: Option<f64>,
    /// Opaque scoring hints forwarded to an advisor untouched.
    #[serde(default)]
    pub hints: BTreeMap<String, String>,
}

impl TargetSegment {
    /// Create a segment spanning `[start, end)` with no tags.
    pub fn new(id: u32, start: f64, end: f64, energy: EnergyLevel, arc_stage: ArcStage) -> Self {
        Self {
            id,
            start,
            end,
            duration: end - start,
            energy,
            motion: MotionLevel::default(),
            vibes: Vec::new(),
            arc_stage,
            shot_function: None,
            expected_hold: None,
            hints: BTreeMap::new(),
        }
    }

    /// Add vibe tags.
    pub fn with_vibes<I, S>(mut self, vibes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vibes.extend(vibes.into_iter().map(Into::into));
        self
    }

    /// Set the shot function.
    pub fn with_shot_function(mut self, function: ShotFunction) -> Self {
        self.shot_function = Some(function);
        self
    }

    /// Attach an opaque hint.
    pub fn with_hint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.hints.insert(key.into(), value.into());
        self
    }

    /// Span on the reference timeline.
    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.end)
    }

    /// Whether any of the given tags matches one of this segment's vibes
    /// (case-insensitive).
    pub fn shares_vibe(&self, tags: &[String]) -> bool {
        self.vibes
            .iter()
            .any(|v| tags.iter().any(|t| t.eq_ignore_ascii_case(v)))
    }
}

/// The reference video's structure: declared total and ordered segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Declared total duration in seconds.
    pub total_duration: f64,
    /// Segments in timeline order.
    pub segments: Vec<TargetSegment>,
}

impl Blueprint {
    /// Build a blueprint whose declared total is the sum of its segments.
    pub fn from_segments(segments: Vec<TargetSegment>) -> Self {
        let total_duration = segments.iter().map(|s| s.duration).sum();
        Self {
            total_duration,
            segments,
        }
    }

    /// Sum of all segment durations.
    pub fn segment_total(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// Check the blueprint is something the matcher can fill.
    pub fn validate(&self) -> Result<()> {
        if self.segments.is_empty() {
            return Err(MontageError::InvalidInput(
                "blueprint has no segments".into(),
            ));
        }
        if !self.total_duration.is_finite() || self.total_duration < 0.0 {
            return Err(MontageError::InvalidInput(format!(
                "blueprint total duration {} is not a valid length",
                self.total_duration
            )));
        }
        for segment in &self.segments {
            if !segment.duration.is_finite() || segment.duration <= 0.0 {
                return Err(MontageError::InvalidInput(format!(
                    "segment {} has non-positive duration {}",
                    segment.id, segment.duration
                )));
            }
        }
        Ok(())
    }
}
