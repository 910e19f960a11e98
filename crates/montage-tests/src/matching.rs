//! Integration tests for the matching engine.
//!
//! Drives montage-matcher end to end and checks the EDLs it hands to
//! montage-timeline.

use montage_core::{
    ArcStage, BeatGrid, Blueprint, ClipAsset, ClipIndex, EnergyLevel, MomentWindow, TargetSegment,
};
use montage_matcher::{MatchConfig, MatchEngine, MatchOutcome};
use montage_timeline::{Edl, EdlWarning};
use proptest::prelude::*;

// ── Helpers ────────────────────────────────────────────────────

fn segments(specs: &[(f64, EnergyLevel)]) -> Blueprint {
    let mut t = 0.0;
    let segments = specs
        .iter()
        .enumerate()
        .map(|(i, &(length, energy))| {
            let segment = TargetSegment::new(i as u32, t, t + length, energy, ArcStage::BuildUp);
            t += length;
            segment
        })
        .collect();
    Blueprint::from_segments(segments)
}

fn run(blueprint: &Blueprint, clips: &ClipIndex) -> MatchOutcome {
    MatchEngine::new(MatchConfig::default())
        .run(blueprint, clips, None)
        .unwrap()
}

fn segment_fill(edl: &Edl, segment_id: u32) -> f64 {
    edl.decisions_for_segment(segment_id)
        .map(|d| d.duration())
        .sum()
}

fn clip_sequence(edl: &Edl) -> Vec<&str> {
    edl.decisions.iter().map(|d| d.clip_path.as_str()).collect()
}

fn high_clips(count: usize) -> ClipIndex {
    ClipIndex::new(
        (0..count)
            .map(|i| {
                ClipAsset::new(format!("clip_{i}.mp4"), 30.0, EnergyLevel::High)
                    .with_moment(EnergyLevel::High, MomentWindow::new(0.0, 10.0))
            })
            .collect(),
    )
}

// ── Scenarios ──────────────────────────────────────────────────

#[test]
fn single_stable_window_fills_segment() {
    let blueprint = segments(&[(3.0, EnergyLevel::High)]);
    let clips = ClipIndex::new(vec![ClipAsset::new("ride.mp4", 12.0, EnergyLevel::High)
        .with_moment(EnergyLevel::High, MomentWindow::new(5.0, 8.0).stable())]);

    let edl = run(&blueprint, &clips).edl;
    assert_eq!(edl.len(), 1);
    let decision = &edl.decisions[0];
    assert_eq!(decision.clip_path, "ride.mp4");
    assert_eq!(decision.clip_start, 5.0);
    assert_eq!(decision.clip_end, 8.0);
    assert_eq!(decision.timeline_start, 0.0);
    assert_eq!(decision.timeline_end, 3.0);
    assert!(edl.warnings.is_empty());
}

#[test]
fn short_window_chains_to_cover_segment() {
    let blueprint = segments(&[(5.0, EnergyLevel::High)]);
    let clips = ClipIndex::new(vec![
        ClipAsset::new("a.mp4", 20.0, EnergyLevel::High)
            .with_moment(EnergyLevel::High, MomentWindow::new(0.0, 3.0).stable()),
        ClipAsset::new("b.mp4", 20.0, EnergyLevel::High)
            .with_moment(EnergyLevel::High, MomentWindow::new(0.0, 4.0)),
    ]);

    let edl = run(&blueprint, &clips).edl;
    assert!(edl.len() >= 2);
    assert!((segment_fill(&edl, 0) - 5.0).abs() < 1e-9);
    assert_eq!(clip_sequence(&edl), ["a.mp4", "b.mp4"]);
    assert!(edl.decisions[1].reasoning.starts_with("Chained"));
}

#[test]
fn missing_energy_substitutes_full_pool() {
    let blueprint = segments(&[(2.0, EnergyLevel::Medium), (2.0, EnergyLevel::High)]);
    let clips = ClipIndex::new(vec![
        ClipAsset::new("low.mp4", 10.0, EnergyLevel::Low),
        ClipAsset::new("high.mp4", 10.0, EnergyLevel::High),
    ]);

    let edl = run(&blueprint, &clips).edl;
    assert!(edl.is_degraded());
    assert!((edl.timeline_end() - 4.0).abs() < 1e-9);
    let degraded: Vec<_> = edl
        .warnings
        .iter()
        .filter(|w| matches!(w, EdlWarning::DegradedPool { .. }))
        .collect();
    assert_eq!(degraded.len(), 1);
    assert_eq!(degraded[0].segment_id(), Some(0));
}

#[test]
fn beat_aligned_cut_scores_full_musical_fit() {
    let blueprint = segments(&[(2.0, EnergyLevel::High)]);
    let clips = high_clips(1);
    let beats = BeatGrid::new((0..16).map(|i| i as f64 * 0.5).collect());

    let edl = MatchEngine::new(MatchConfig::default())
        .run(&blueprint, &clips, Some(&beats))
        .unwrap()
        .edl;
    assert!(edl.decisions[0].reasoning.contains("musical 1.00"));
}

#[test]
fn long_segment_is_filled_past_many_cuts() {
    let blueprint = segments(&[(200.0, EnergyLevel::High), (45.5, EnergyLevel::High)]);
    let edl = run(&blueprint, &high_clips(3)).edl;

    assert!(edl.len() > 80);
    assert!((segment_fill(&edl, 0) - 200.0).abs() < 1e-6);
    assert!((segment_fill(&edl, 1) - 45.5).abs() < 1e-6);
    assert!((edl.timeline_end() - 245.5).abs() < 1e-6);
    assert!(edl.decisions.iter().all(|d| d.duration() <= 3.0 + 1e-9));
    assert!(!edl.warnings.iter().any(|w| matches!(
        w,
        EdlWarning::UnderFilled { .. } | EdlWarning::DurationMismatch { .. }
    )));
}

// ── Rotation properties ────────────────────────────────────────

#[test]
fn identical_inputs_give_identical_edl() {
    let blueprint = segments(&[
        (2.5, EnergyLevel::High),
        (4.0, EnergyLevel::Low),
        (1.2, EnergyLevel::Medium),
        (3.3, EnergyLevel::High),
    ]);
    let clips = ClipIndex::new(vec![
        ClipAsset::new("a.mp4", 8.0, EnergyLevel::High)
            .with_moment(EnergyLevel::High, MomentWindow::new(1.0, 3.5))
            .with_moment(EnergyLevel::Low, MomentWindow::new(4.0, 7.0)),
        ClipAsset::new("b.mp4", 5.0, EnergyLevel::Low),
        ClipAsset::new("c.mp4", 12.0, EnergyLevel::Medium)
            .with_moment(EnergyLevel::Medium, MomentWindow::new(2.0, 9.0).stable()),
    ]);

    let first = run(&blueprint, &clips);
    let second = run(&blueprint, &clips);
    assert_eq!(first.edl, second.edl);
    assert_eq!(first.usage, second.usage);
    assert_eq!(
        serde_json::to_string(&first.edl).unwrap(),
        serde_json::to_string(&second.edl).unwrap()
    );
}

#[test]
fn no_back_to_back_repeats_with_several_clips() {
    let blueprint = segments(&[(1.5, EnergyLevel::High); 8]);
    let clips = high_clips(3);

    let edl = run(&blueprint, &clips).edl;
    let sequence = clip_sequence(&edl);
    assert_eq!(sequence.len(), 8);
    for pair in sequence.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}

#[test]
fn usage_stays_balanced() {
    let blueprint = segments(&[(1.5, EnergyLevel::High); 8]);
    let outcome = run(&blueprint, &high_clips(3));
    assert!(outcome.usage.spread() <= 1);
    assert_eq!(outcome.usage.total_uses(), 8);

    let outcome = run(&segments(&[(2.0, EnergyLevel::High); 4]), &high_clips(4));
    assert_eq!(outcome.usage.spread(), 0);
}

#[test]
fn single_clip_may_repeat() {
    let blueprint = segments(&[(2.0, EnergyLevel::Low); 3]);
    let clips = ClipIndex::new(vec![ClipAsset::new("only.mp4", 60.0, EnergyLevel::Low)]);

    let edl = run(&blueprint, &clips).edl;
    assert_eq!(clip_sequence(&edl), ["only.mp4"; 3]);
    // the playhead keeps moving through the clip
    let starts: Vec<f64> = edl.decisions.iter().map(|d| d.clip_start).collect();
    assert_eq!(starts, vec![0.0, 2.0, 4.0]);
}

#[test]
fn stats_summarise_run() {
    let blueprint = segments(&[(1.5, EnergyLevel::High); 6]);
    let edl = run(&blueprint, &high_clips(3)).edl;

    let stats = edl.stats();
    assert_eq!(stats.cut_count, 6);
    assert!((stats.avg_cut - 1.5).abs() < 1e-9);
    assert_eq!(stats.clip_usage.len(), 3);
    assert!(stats.clip_usage.values().all(|&n| n == 2));
    assert!(!stats.degraded);
}

// ── Partition property ─────────────────────────────────────────

fn energy() -> impl Strategy<Value = EnergyLevel> {
    prop_oneof![
        Just(EnergyLevel::Low),
        Just(EnergyLevel::Medium),
        Just(EnergyLevel::High),
    ]
}

fn clip_index() -> impl Strategy<Value = ClipIndex> {
    let clip = (
        1.0f64..30.0,
        energy(),
        energy(),
        proptest::option::of((0.0f64..0.5, 0.0f64..0.5)),
    );
    prop::collection::vec(clip, 1..6).prop_map(|specs| {
        let clips = specs
            .into_iter()
            .enumerate()
            .map(|(i, (duration, declared, tagged, window))| {
                let clip = ClipAsset::new(format!("clip_{i}.mp4"), duration, declared);
                match window {
                    Some((offset, length)) => {
                        let start = duration * offset;
                        let end = start + (duration * length).max(0.5);
                        clip.with_moment(tagged, MomentWindow::new(start, end))
                    }
                    None => clip,
                }
            })
            .collect();
        ClipIndex::new(clips)
    })
}

proptest! {
    #[test]
    fn decisions_partition_the_timeline(
        specs in prop::collection::vec((0.2f64..6.0, energy()), 1..10),
        clips in clip_index(),
    ) {
        let blueprint = segments(&specs);
        let edl = run(&blueprint, &clips).edl;

        prop_assert_eq!(edl.decisions[0].timeline_start, 0.0);
        for pair in edl.decisions.windows(2) {
            prop_assert_eq!(pair[0].timeline_end, pair[1].timeline_start);
        }
        for decision in &edl.decisions {
            prop_assert!(decision.clip_end > decision.clip_start);
            prop_assert!(decision.timeline_end > decision.timeline_start);
            prop_assert!(decision.clip_start >= 0.0);
        }
        for segment in &blueprint.segments {
            let filled = segment_fill(&edl, segment.id);
            prop_assert!(
                (filled - segment.duration).abs() <= 0.05 + 1e-6,
                "segment {} filled {} of {}", segment.id, filled, segment.duration
            );
        }
        prop_assert!((edl.timeline_end() - blueprint.total_duration).abs() <= 0.5);
        let short = edl.warnings.iter().any(|w| {
            matches!(w, EdlWarning::UnderFilled { .. } | EdlWarning::DurationMismatch { .. })
        });
        prop_assert!(!short, "warnings: {:?}", edl.warnings);
    }
}
