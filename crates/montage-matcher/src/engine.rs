//! The matching run: blueprint and clip index in, EDL out.

use montage_core::{BeatGrid, Blueprint, ClipIndex};
use montage_timeline::{Edl, EdlAssembler, EdlWarning};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::candidate::CandidateBuilder;
use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::filler::SegmentFiller;
use crate::policy::{RotationPolicy, SelectionContext, SelectionPolicy, SelectionSource};
use crate::pool::ClipPool;
use crate::scoring::PreviousPick;
use crate::usage::UsageState;

/// The EDL plus the usage state it left behind.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    pub edl: Edl,
    pub usage: UsageState,
}

/// Matches blueprint segments to clip footage one segment at a time.
pub struct MatchEngine<P: SelectionPolicy = RotationPolicy> {
    config: MatchConfig,
    policy: P,
}

impl MatchEngine<RotationPolicy> {
    /// An engine using deterministic rotation.
    pub fn new(config: MatchConfig) -> Self {
        Self::with_policy(config, RotationPolicy)
    }
}

impl<P: SelectionPolicy> MatchEngine<P> {
    pub fn with_policy(config: MatchConfig, policy: P) -> Self {
        Self { config, policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Fill every segment of `blueprint` from `clips`.
    ///
    /// Usage state is fresh for each call, so identical inputs give an
    /// identical EDL.
    pub fn run(
        &mut self,
        blueprint: &Blueprint,
        clips: &ClipIndex,
        beats: Option<&BeatGrid>,
    ) -> Result<MatchOutcome, MatchError> {
        self.config.validate()?;
        blueprint.validate()?;

        let pool = ClipPool::new(&clips.clips);
        if pool.is_empty() {
            return Err(MatchError::EmptyClipPool);
        }

        let segment_count = blueprint.segments.len();
        info!(
            segments = segment_count,
            clips = pool.len(),
            policy = self.policy.name(),
            total_duration = blueprint.total_duration,
            "Matching blueprint"
        );

        let mut usage = UsageState::new(pool.all().iter().copied());
        let mut assembler = EdlAssembler::new(blueprint.total_duration);
        let builder = CandidateBuilder::new(&self.config, beats);
        let filler = SegmentFiller::new(&self.config);
        let mut previous: Option<PreviousPick> = None;

        for (segment_index, segment) in blueprint.segments.iter().enumerate() {
            let lookup = pool.lookup(segment.energy);
            if lookup.degraded {
                assembler.warn(EdlWarning::DegradedPool {
                    segment_id: segment.id,
                    energy: segment.energy,
                });
            }

            let candidates = builder.build(segment, &lookup.clips, &usage, previous.as_ref());
            let context = SelectionContext {
                segment_index,
                segment_count,
                previous: previous.as_ref(),
                usage: &usage,
                beats,
            };
            let Some(selection) = self.policy.select(segment, &candidates, &context) else {
                warn!(segment = segment.id, "No candidates for segment");
                assembler.warn(EdlWarning::UnderFilled {
                    segment_id: segment.id,
                    shortfall: segment.duration,
                });
                continue;
            };

            if let SelectionSource::Fallback { reason } = &selection.source {
                assembler.warn(EdlWarning::AdvisorFallback {
                    segment_id: segment.id,
                    reason: reason.clone(),
                });
            }

            let fill = filler.fill(segment, &candidates, &selection, &mut usage);
            debug!(
                segment = segment.id,
                cuts = fill.cuts.len(),
                filled = fill.filled(),
                "Segment filled"
            );
            if fill.last.is_some() {
                previous = fill.last;
            }
            assembler.extend_warnings(fill.warnings);
            assembler.push_segment(segment.id, fill.cuts);
        }

        let edl = assembler.finish(clips, self.config.total_tolerance_secs)?;
        info!(
            decisions = edl.len(),
            timeline_end = edl.timeline_end(),
            warnings = edl.warnings.len(),
            "Matching complete"
        );
        Ok(MatchOutcome { edl, usage })
    }
}
