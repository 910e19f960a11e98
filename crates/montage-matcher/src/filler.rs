//! Segment filling: allocate footage until a segment's duration is covered.
//!
//! Each step takes `min(remaining, usable, max_cut)` from the current
//! candidate, then chains to a follow-up. Follow-ups are searched in tiers:
//!
//! 1. another moment of the same clip, to keep the subject on screen;
//! 2. a moment of another clip that covers what remains in one cut;
//! 3. any moment with footage left, including the current one.
//!
//! Within a tier, stable footage wins, then the usable length closest to
//! what remains, then enumeration order.

use montage_core::TargetSegment;
use montage_timeline::{EdlWarning, SegmentCut};
use smallvec::SmallVec;
use std::cmp::Ordering;
use tracing::{debug, warn};

use crate::candidate::MomentCandidate;
use crate::config::MatchConfig;
use crate::policy::Selection;
use crate::scoring::PreviousPick;
use crate::usage::{CursorEvent, UsageState};

/// Slack for comparing computed lengths against thresholds.
const EPSILON: f64 = 1e-9;

/// Result of filling one segment.
#[derive(Debug, Clone)]
pub struct SegmentFill {
    pub cuts: SmallVec<[SegmentCut; 4]>,
    pub warnings: Vec<EdlWarning>,
    /// Time left unfilled; zero unless the segment ran out of candidates.
    pub shortfall: f64,
    /// Clip and role of the final cut.
    pub last: Option<PreviousPick>,
}

impl SegmentFill {
    /// Total length of the cuts.
    pub fn filled(&self) -> f64 {
        self.cuts.iter().map(SegmentCut::duration).sum()
    }
}

/// Fills segments from a selection, chaining as needed.
pub struct SegmentFiller<'c> {
    config: &'c MatchConfig,
}

impl<'c> SegmentFiller<'c> {
    pub fn new(config: &'c MatchConfig) -> Self {
        Self { config }
    }

    /// Cover `segment` starting from `selection`, mutating `usage`.
    pub fn fill(
        &self,
        segment: &TargetSegment,
        candidates: &[MomentCandidate<'_>],
        selection: &Selection,
        usage: &mut UsageState,
    ) -> SegmentFill {
        let tolerance = self.config.fill_tolerance_secs;
        // A segment shorter than the minimum cut is filled by one short cut.
        let floor = self.config.min_cut_secs.min(segment.duration);

        let mut fill = SegmentFill {
            cuts: SmallVec::new(),
            warnings: Vec::new(),
            shortfall: 0.0,
            last: None,
        };
        let mut remaining = segment.duration;
        let mut used: Vec<usize> = Vec::new();
        let mut spent: Vec<usize> = Vec::new();
        let mut last_cut: Option<usize> = None;
        let mut current = selection.candidate;
        let mut entry_point = selection.entry_point;
        let mut reasoning = selection.reasoning.clone();
        // Every kept cut covers at least `floor` and a failed candidate is
        // never retried, so the loop ends within this many steps.
        let step_limit = (segment.duration / floor).ceil() as usize + candidates.len() + 1;

        for step in 0..step_limit {
            let Some(candidate) = candidates.get(current) else {
                break;
            };
            let allocation = self.allocate(
                segment,
                candidate,
                entry_point.take(),
                remaining,
                floor,
                usage,
                &mut fill.warnings,
            );
            match allocation {
                Some(mut cut) => {
                    remaining -= cut.duration();
                    debug!(
                        segment = segment.id,
                        step,
                        clip = %cut.clip_path,
                        clip_start = cut.clip_start,
                        clip_end = cut.clip_end,
                        remaining,
                        "Allocated cut"
                    );
                    cut.reasoning = std::mem::take(&mut reasoning);
                    fill.cuts.push(cut);
                    used.push(current);
                    last_cut = Some(current);
                }
                None => spent.push(current),
            }

            if remaining <= tolerance || remaining < floor - EPSILON {
                break;
            }

            let Some(next) =
                self.follow_up(candidates, current, remaining, floor, usage, &used, &spent)
            else {
                break;
            };
            reasoning = format!(
                "Chained to cover {remaining:.2}s: {}",
                candidates[next].describe(usage)
            );
            current = next;
        }

        if remaining > tolerance
            && remaining < floor - EPSILON
            && self.absorb_sliver(segment, &mut fill, last_cut, candidates, remaining, usage)
        {
            remaining = 0.0;
        }

        if remaining > tolerance {
            warn!(
                segment = segment.id,
                shortfall = remaining,
                "No compatible candidate left, segment under-filled"
            );
            fill.warnings.push(EdlWarning::UnderFilled {
                segment_id: segment.id,
                shortfall: remaining,
            });
            fill.shortfall = remaining;
        }

        fill.last = last_cut.map(|i| PreviousPick {
            clip_path: candidates[i].clip.path.clone(),
            role: candidates[i].role(),
        });
        fill
    }

    /// Take one cut from `candidate`. Returns `None` for a degenerate cut.
    #[allow(clippy::too_many_arguments)]
    fn allocate(
        &self,
        segment: &TargetSegment,
        candidate: &MomentCandidate<'_>,
        entry_point: Option<f64>,
        remaining: f64,
        floor: f64,
        usage: &mut UsageState,
        warnings: &mut Vec<EdlWarning>,
    ) -> Option<SegmentCut> {
        let window = candidate.window.span();
        let path = candidate.clip_path();
        let mut entry_point = entry_point.filter(|&t| window.contains(t));

        loop {
            let start = entry_point
                .take()
                .unwrap_or_else(|| candidate.entry_point(usage.cursor(path)));
            let usable = window.end - start;
            let mut length = remaining.min(usable).min(self.config.max_cut_secs);

            // Never leave a sliver shorter than a cut behind: run on into the
            // clip's surrounding footage, or leave exactly one minimum cut.
            let leftover = remaining - length;
            if leftover > EPSILON && leftover < floor {
                if start + remaining <= candidate.clip.duration + EPSILON {
                    length = remaining;
                } else if leftover > self.config.fill_tolerance_secs && remaining - floor >= floor {
                    length = remaining - floor;
                }
            }

            if length < floor - EPSILON {
                warn!(
                    segment = segment.id,
                    clip = %path,
                    length,
                    "Discarding degenerate allocation"
                );
                warnings.push(EdlWarning::DegenerateAllocation {
                    segment_id: segment.id,
                    clip_path: path.to_string(),
                    length: length.max(0.0),
                });
                usage.reset(path);
                if start > window.start {
                    continue;
                }
                return None;
            }

            let end = start + length;
            if usage.record_use(candidate.clip, end, self.config.exhaustion_margin_secs)
                == CursorEvent::Rewound
            {
                warnings.push(EdlWarning::ClipExhausted {
                    segment_id: segment.id,
                    clip_path: path.to_string(),
                });
            }
            return Some(SegmentCut {
                clip_path: path.to_string(),
                clip_start: start,
                clip_end: end,
                reasoning: String::new(),
            });
        }
    }

    /// Pick the next candidate to chain to.
    #[allow(clippy::too_many_arguments)]
    fn follow_up(
        &self,
        candidates: &[MomentCandidate<'_>],
        current: usize,
        remaining: f64,
        floor: f64,
        usage: &UsageState,
        used: &[usize],
        spent: &[usize],
    ) -> Option<usize> {
        let clip_path = candidates[current].clip_path();
        // A window whose cursor sits too close to its end is allocated from
        // its start after a reset.
        let usable = |i: usize| {
            let candidate = &candidates[i];
            let left = candidate.usable_length(usage.cursor(candidate.clip_path()));
            if left + EPSILON >= floor {
                left
            } else {
                candidate.window.duration()
            }
        };
        let open = |i: usize| !spent.contains(&i) && usable(i) + EPSILON >= floor;
        let fresh = |i: usize| !used.contains(&i);
        let rank = |pool: Vec<usize>| {
            pool.into_iter().min_by(|&a, &b| {
                candidates[b]
                    .is_stable()
                    .cmp(&candidates[a].is_stable())
                    .then_with(|| {
                        let da = (usable(a) - remaining).abs();
                        let db = (usable(b) - remaining).abs();
                        da.partial_cmp(&db).unwrap_or(Ordering::Equal)
                    })
                    .then(candidates[a].ordinal.cmp(&candidates[b].ordinal))
            })
        };
        let all = 0..candidates.len();

        let same_clip: Vec<usize> = all
            .clone()
            .filter(|&i| candidates[i].clip_path() == clip_path && fresh(i) && open(i))
            .collect();
        if let Some(next) = rank(same_clip) {
            return Some(next);
        }

        let need = remaining.min(self.config.max_cut_secs);
        let covering: Vec<usize> = all
            .clone()
            .filter(|&i| {
                candidates[i].clip_path() != clip_path
                    && fresh(i)
                    && open(i)
                    && usable(i) + EPSILON >= need
            })
            .collect();
        if let Some(next) = rank(covering) {
            return Some(next);
        }

        rank(all.filter(|&i| open(i)).collect())
    }

    /// Grow the last cut inside its clip to swallow a remainder too short to
    /// become a cut of its own. The end moves out when the clip allows it,
    /// otherwise the start moves in.
    fn absorb_sliver(
        &self,
        segment: &TargetSegment,
        fill: &mut SegmentFill,
        last_cut: Option<usize>,
        candidates: &[MomentCandidate<'_>],
        remaining: f64,
        usage: &mut UsageState,
    ) -> bool {
        let (Some(index), Some(cut)) = (last_cut, fill.cuts.last_mut()) else {
            return false;
        };
        let clip = candidates[index].clip;
        let new_end = cut.clip_end + remaining;
        let new_start = cut.clip_start - remaining;

        if new_end <= clip.duration + EPSILON {
            debug!(
                segment = segment.id,
                clip = %clip.path,
                extra = remaining,
                "Extending last cut to absorb remainder"
            );
            cut.clip_end = new_end.min(clip.duration);
            if usage.move_cursor(clip, new_end, self.config.exhaustion_margin_secs)
                == CursorEvent::Rewound
            {
                fill.warnings.push(EdlWarning::ClipExhausted {
                    segment_id: segment.id,
                    clip_path: clip.path.clone(),
                });
            }
            return true;
        }

        if new_start >= -EPSILON {
            debug!(
                segment = segment.id,
                clip = %clip.path,
                extra = remaining,
                "Starting last cut earlier to absorb remainder"
            );
            cut.clip_start = new_start.max(0.0);
            return true;
        }
        false
    }
}
