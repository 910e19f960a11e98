//! Candidate enumeration for a target segment.
//!
//! Every (clip, energy, window) triple in the segment's pool becomes a
//! candidate, not only windows at the segment's own energy, so a policy can
//! weigh the trade-off itself. Enumeration order is fixed: clips in index
//! order, energies Low → Medium → High, windows in declaration order. The
//! `ordinal` field records that order and is the final tie-break everywhere.

use montage_core::{BeatGrid, ClipAsset, EnergyLevel, MomentRole, MomentWindow, TargetSegment};
use tracing::debug;

use crate::advisor::CandidateSummary;
use crate::config::MatchConfig;
use crate::scoring::{
    musical_alignment, narrative_continuity, semantic_alignment, AlignmentScores, PreviousPick,
};
use crate::usage::UsageState;

/// One (clip, energy, window) option for a segment.
#[derive(Debug, Clone)]
pub struct MomentCandidate<'a> {
    /// Position in enumeration order.
    pub ordinal: usize,
    pub clip: &'a ClipAsset,
    /// Energy level the window was analysed for.
    pub energy: EnergyLevel,
    /// Window clipped to the clip's bounds.
    pub window: MomentWindow,
    /// Synthesised from a clip without analysed moments.
    pub whole_clip: bool,
    pub scores: AlignmentScores,
}

impl<'a> MomentCandidate<'a> {
    pub fn clip_path(&self) -> &'a str {
        self.clip.path.as_str()
    }

    pub fn role(&self) -> Option<MomentRole> {
        self.window.role
    }

    pub fn is_stable(&self) -> bool {
        self.window.stable
    }

    /// Where allocation starts given the clip's cursor: the cursor if it
    /// lies inside the window, otherwise the window start.
    pub fn entry_point(&self, cursor: f64) -> f64 {
        if cursor > self.window.start && cursor < self.window.end {
            cursor
        } else {
            self.window.start
        }
    }

    /// Footage left in the window from the entry point.
    pub fn usable_length(&self, cursor: f64) -> f64 {
        self.window.end - self.entry_point(cursor)
    }

    /// Serializable view handed to an advisor.
    pub fn summary(&self, usage: &UsageState) -> CandidateSummary {
        CandidateSummary {
            clip_id: self.clip.path.clone(),
            energy: self.energy,
            start: self.window.start,
            end: self.window.end,
            role: self.window.role,
            stable: self.window.stable,
            reason: self.window.reason.clone(),
            usage_count: usage.usage_count(&self.clip.path),
            cursor: usage.cursor(&self.clip.path),
            semantic: self.scores.semantic,
            musical: self.scores.musical,
            continuity: self.scores.continuity,
        }
    }

    /// Human-readable account of why this moment was used.
    pub fn describe(&self, usage: &UsageState) -> String {
        let role = self
            .role()
            .map(|r| format!("{r:?}"))
            .unwrap_or_else(|| "untagged".into());
        let mut text = if self.whole_clip {
            format!("Whole-clip playback of {}", self.clip.path)
        } else {
            format!(
                "{} {} moment of {}",
                self.energy.display_name(),
                role,
                self.clip.path
            )
        };
        text.push_str(&format!(
            " (used {}x; semantic {:.2}, musical {:.2}, continuity {:.2})",
            usage.usage_count(&self.clip.path),
            self.scores.semantic,
            self.scores.musical,
            self.scores.continuity
        ));
        if !self.window.reason.is_empty() {
            text.push_str(": ");
            text.push_str(&self.window.reason);
        }
        text
    }
}

/// Builds scored candidates for one segment at a time.
pub struct CandidateBuilder<'b> {
    config: &'b MatchConfig,
    beats: Option<&'b BeatGrid>,
}

impl<'b> CandidateBuilder<'b> {
    pub fn new(config: &'b MatchConfig, beats: Option<&'b BeatGrid>) -> Self {
        Self { config, beats }
    }

    /// Enumerate and score every candidate in `clips` for `segment`.
    ///
    /// Clips without usable windows contribute one whole-clip candidate at
    /// their declared energy.
    pub fn build<'a>(
        &self,
        segment: &TargetSegment,
        clips: &[&'a ClipAsset],
        usage: &UsageState,
        previous: Option<&PreviousPick>,
    ) -> Vec<MomentCandidate<'a>> {
        let mut candidates = Vec::new();

        for &clip in clips {
            let windows = clip.usable_windows();
            let whole_clip = windows.is_empty();
            let windows = if whole_clip {
                vec![(clip.energy, MomentWindow::new(0.0, clip.duration))]
            } else {
                windows
            };

            for (energy, window) in windows {
                let mut candidate = MomentCandidate {
                    ordinal: candidates.len(),
                    clip,
                    energy,
                    window,
                    whole_clip,
                    scores: AlignmentScores::default(),
                };
                candidate.scores = self.score(segment, &candidate, usage, previous);
                candidates.push(candidate);
            }
        }

        debug!(
            segment = segment.id,
            candidates = candidates.len(),
            "Candidates enumerated"
        );
        candidates
    }

    fn score(
        &self,
        segment: &TargetSegment,
        candidate: &MomentCandidate<'_>,
        usage: &UsageState,
        previous: Option<&PreviousPick>,
    ) -> AlignmentScores {
        // Project the first cut onto the timeline at the segment start.
        let usable = candidate.usable_length(usage.cursor(candidate.clip_path()));
        let length = segment
            .duration
            .min(usable)
            .min(self.config.max_cut_secs)
            .max(0.0);

        AlignmentScores {
            semantic: semantic_alignment(segment, candidate.clip, candidate.role()),
            musical: musical_alignment(
                self.beats,
                segment.start,
                segment.start + length,
                self.config.beat_tolerance_secs,
            ),
            continuity: narrative_continuity(candidate.clip_path(), candidate.role(), previous),
        }
    }
}
