//! Selection policies: which candidate opens a segment.
//!
//! The engine is generic over `SelectionPolicy`, so rotation and advised
//! selection swap without touching the filler.

use montage_core::{BeatGrid, TargetSegment};
use tracing::{debug, warn};

use crate::advisor::{Advice, Advisor, CandidateSummary, SegmentContext};
use crate::candidate::MomentCandidate;
use crate::error::AdviceError;
use crate::scoring::PreviousPick;
use crate::usage::UsageState;

/// Slack allowed when matching an advised start against window bounds.
const ADVICE_START_TOLERANCE: f64 = 0.05;

/// Run state a policy may consult.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'c> {
    pub segment_index: usize,
    pub segment_count: usize,
    pub previous: Option<&'c PreviousPick>,
    pub usage: &'c UsageState,
    pub beats: Option<&'c BeatGrid>,
}

/// Who made the choice.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionSource {
    Rotation,
    Advisor { confidence: f64 },
    /// The advisor failed and rotation chose instead.
    Fallback { reason: String },
}

/// The chosen first candidate for a segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index into the candidate slice.
    pub candidate: usize,
    /// Preferred start inside the window, overriding the cursor rule.
    pub entry_point: Option<f64>,
    pub reasoning: String,
    pub source: SelectionSource,
}

/// Chooses one candidate per segment.
pub trait SelectionPolicy {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Pick the candidate that opens `segment`; `None` only when
    /// `candidates` is empty.
    fn select(
        &mut self,
        segment: &TargetSegment,
        candidates: &[MomentCandidate<'_>],
        context: &SelectionContext<'_>,
    ) -> Option<Selection>;
}

/// Deterministic least-used rotation.
///
/// Restricts to candidates at the segment's energy (all candidates if none),
/// avoids the previous clip unless it is the only option, and takes the
/// least-used clip. Ties go to the earlier candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationPolicy;

impl RotationPolicy {
    fn choose(
        &self,
        segment: &TargetSegment,
        candidates: &[MomentCandidate<'_>],
        context: &SelectionContext<'_>,
    ) -> Option<usize> {
        let matching: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.energy == segment.energy)
            .map(|(i, _)| i)
            .collect();
        let pool = if matching.is_empty() {
            (0..candidates.len()).collect()
        } else {
            matching
        };

        let previous = context.previous.map(|p| p.clip_path.as_str());
        let fresh: Vec<usize> = pool
            .iter()
            .copied()
            .filter(|&i| Some(candidates[i].clip_path()) != previous)
            .collect();
        let eligible = if fresh.is_empty() { pool } else { fresh };

        eligible.into_iter().min_by_key(|&i| {
            (
                context.usage.usage_count(candidates[i].clip_path()),
                candidates[i].ordinal,
            )
        })
    }
}

impl SelectionPolicy for RotationPolicy {
    fn name(&self) -> &'static str {
        "rotation"
    }

    fn select(
        &mut self,
        segment: &TargetSegment,
        candidates: &[MomentCandidate<'_>],
        context: &SelectionContext<'_>,
    ) -> Option<Selection> {
        let index = self.choose(segment, candidates, context)?;
        let chosen = &candidates[index];
        debug!(
            segment = segment.id,
            clip = %chosen.clip_path(),
            uses = context.usage.usage_count(chosen.clip_path()),
            "Rotation selected candidate"
        );
        Some(Selection {
            candidate: index,
            entry_point: None,
            reasoning: chosen.describe(context.usage),
            source: SelectionSource::Rotation,
        })
    }
}

/// Delegates the choice to an external advisor, falling back to rotation
/// whenever the advice is unusable.
pub struct AdvisedPolicy<A: Advisor> {
    advisor: A,
    fallback: RotationPolicy,
}

impl<A: Advisor> AdvisedPolicy<A> {
    pub fn new(advisor: A) -> Self {
        Self {
            advisor,
            fallback: RotationPolicy,
        }
    }

    fn consult(
        &mut self,
        segment: &TargetSegment,
        candidates: &[MomentCandidate<'_>],
        context: &SelectionContext<'_>,
    ) -> Result<Selection, AdviceError> {
        let summaries: Vec<CandidateSummary> = candidates
            .iter()
            .map(|c| c.summary(context.usage))
            .collect();
        let beats_in_segment = context
            .beats
            .map(|grid| {
                grid.beats()
                    .iter()
                    .copied()
                    .filter(|&b| segment.span().contains(b))
                    .collect()
            })
            .unwrap_or_default();
        let segment_context = SegmentContext {
            segment,
            segment_index: context.segment_index,
            segment_count: context.segment_count,
            previous: context.previous,
            beats_in_segment,
        };

        let advice = self.advisor.advise(&segment_context, &summaries)?;
        advice.check()?;
        let index = resolve(&advice, candidates, ADVICE_START_TOLERANCE)?;
        let window = &candidates[index].window;
        let entry_point = (advice.start < window.end).then(|| advice.start.max(window.start));

        Ok(Selection {
            candidate: index,
            entry_point,
            reasoning: if advice.reasoning.is_empty() {
                candidates[index].describe(context.usage)
            } else {
                advice.reasoning
            },
            source: SelectionSource::Advisor {
                confidence: advice.confidence,
            },
        })
    }
}

impl<A: Advisor> SelectionPolicy for AdvisedPolicy<A> {
    fn name(&self) -> &'static str {
        "advised"
    }

    fn select(
        &mut self,
        segment: &TargetSegment,
        candidates: &[MomentCandidate<'_>],
        context: &SelectionContext<'_>,
    ) -> Option<Selection> {
        if candidates.is_empty() {
            return None;
        }
        match self.consult(segment, candidates, context) {
            Ok(selection) => {
                debug!(
                    segment = segment.id,
                    clip = %candidates[selection.candidate].clip_path(),
                    "Advisor selected candidate"
                );
                Some(selection)
            }
            Err(e) => {
                warn!(segment = segment.id, error = %e, "Advice unusable, falling back to rotation");
                let mut selection = self.fallback.select(segment, candidates, context)?;
                selection.source = SelectionSource::Fallback {
                    reason: e.to_string(),
                };
                Some(selection)
            }
        }
    }
}

/// Map advice onto an enumerated candidate.
///
/// Among candidates with the advised clip and energy, prefer the window
/// containing the advised start, then the one overlapping the advised span
/// the most.
fn resolve(
    advice: &Advice,
    candidates: &[MomentCandidate<'_>],
    tolerance: f64,
) -> Result<usize, AdviceError> {
    let named: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.clip_path() == advice.clip_id && c.energy == advice.energy)
        .map(|(i, _)| i)
        .collect();
    if named.is_empty() {
        return Err(AdviceError::UnknownCandidate {
            clip_id: advice.clip_id.clone(),
            energy: advice.energy,
        });
    }

    if let Some(&i) = named.iter().find(|&&i| {
        let w = &candidates[i].window;
        advice.start >= w.start - tolerance && advice.start < w.end
    }) {
        return Ok(i);
    }

    let overlap = |i: usize| {
        let w = &candidates[i].window;
        (advice.end.min(w.end) - advice.start.max(w.start)).max(0.0)
    };
    named
        .iter()
        .copied()
        .filter(|&i| overlap(i) > 0.0)
        .max_by(|&a, &b| {
            overlap(a)
                .partial_cmp(&overlap(b))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.cmp(&a))
        })
        .ok_or_else(|| {
            AdviceError::Malformed(format!(
                "span {}..{} lies outside every {} window",
                advice.start, advice.end, advice.clip_id
            ))
        })
}
