//! Integration tests for advised selection.
//!
//! Closures stand in for the external collaborator; the engine must finish
//! every segment whatever they answer.

use montage_core::{
    ArcStage, BeatGrid, Blueprint, ClipAsset, ClipIndex, EnergyLevel, MomentWindow, TargetSegment,
};
use montage_matcher::{
    parse_advice_reply, AdvisedPolicy, Advice, AdviceError, CandidateSummary, MatchConfig,
    MatchEngine, SegmentContext,
};
use montage_timeline::EdlWarning;

// ── Helpers ────────────────────────────────────────────────────

fn clips() -> ClipIndex {
    ClipIndex::new(vec![
        ClipAsset::new("a.mp4", 20.0, EnergyLevel::High)
            .with_moment(EnergyLevel::High, MomentWindow::new(5.0, 6.5)),
        ClipAsset::new("b.mp4", 20.0, EnergyLevel::High)
            .with_moment(EnergyLevel::High, MomentWindow::new(0.0, 6.0)),
    ])
}

fn advice(clip_id: &str, start: f64, end: f64) -> Advice {
    Advice {
        clip_id: clip_id.into(),
        energy: EnergyLevel::High,
        start,
        end,
        confidence: 0.8,
        reasoning: format!("advisor picked {clip_id}"),
    }
}

fn fallbacks(warnings: &[EdlWarning]) -> usize {
    warnings
        .iter()
        .filter(|w| matches!(w, EdlWarning::AdvisorFallback { .. }))
        .count()
}

// ── Advice applied ─────────────────────────────────────────────

#[test]
fn advice_span_shorter_than_segment_is_chained() {
    let blueprint = Blueprint::from_segments(vec![TargetSegment::new(
        0,
        0.0,
        4.0,
        EnergyLevel::High,
        ArcStage::Peak,
    )]);
    // 0.5s of advised footage against 4.0s to fill
    let advisor = |_: &SegmentContext<'_>, _: &[CandidateSummary]| -> Result<Advice, AdviceError> {
        Ok(advice("a.mp4", 5.0, 5.5))
    };
    let mut engine = MatchEngine::with_policy(MatchConfig::default(), AdvisedPolicy::new(advisor));
    let edl = engine.run(&blueprint, &clips(), None).unwrap().edl;

    assert_eq!(edl.decisions[0].clip_path, "a.mp4");
    assert_eq!(edl.decisions[0].clip_start, 5.0);
    assert_eq!(edl.decisions[0].reasoning, "advisor picked a.mp4");
    assert!(edl.len() >= 2);
    assert!((edl.timeline_end() - 4.0).abs() < 1e-9);
    assert_eq!(fallbacks(&edl.warnings), 0);
}

#[test]
fn advised_start_inside_window_is_honoured() {
    let blueprint = Blueprint::from_segments(vec![TargetSegment::new(
        0,
        0.0,
        2.0,
        EnergyLevel::High,
        ArcStage::Peak,
    )]);
    let advisor = |_: &SegmentContext<'_>, _: &[CandidateSummary]| -> Result<Advice, AdviceError> {
        Ok(advice("b.mp4", 3.0, 5.0))
    };
    let mut engine = MatchEngine::with_policy(MatchConfig::default(), AdvisedPolicy::new(advisor));
    let edl = engine.run(&blueprint, &clips(), None).unwrap().edl;

    assert_eq!(edl.len(), 1);
    assert_eq!(edl.decisions[0].clip_start, 3.0);
    assert_eq!(edl.decisions[0].clip_end, 5.0);
}

#[test]
fn reply_text_drives_selection() {
    let blueprint = Blueprint::from_segments(vec![TargetSegment::new(
        0,
        0.0,
        1.0,
        EnergyLevel::High,
        ArcStage::Intro,
    )]);
    let reply = "Best match below.\n{\"clip_id\": \"b.mp4\", \"energy\": \"High\", \
                 \"start\": 1.0, \"end\": 2.0, \"confidence\": 0.7}\nThanks";
    let advisor = |_: &SegmentContext<'_>, _: &[CandidateSummary]| parse_advice_reply(reply);
    let mut engine = MatchEngine::with_policy(MatchConfig::default(), AdvisedPolicy::new(advisor));
    let edl = engine.run(&blueprint, &clips(), None).unwrap().edl;

    assert_eq!(edl.decisions[0].clip_path, "b.mp4");
    assert_eq!(edl.decisions[0].clip_start, 1.0);
}

// ── Fallback ───────────────────────────────────────────────────

#[test]
fn unknown_clip_falls_back_to_rotation() {
    let blueprint = Blueprint::from_segments(vec![
        TargetSegment::new(0, 0.0, 2.0, EnergyLevel::High, ArcStage::Intro),
        TargetSegment::new(1, 2.0, 4.0, EnergyLevel::High, ArcStage::Peak),
    ]);
    let advisor = |_: &SegmentContext<'_>, _: &[CandidateSummary]| -> Result<Advice, AdviceError> {
        Ok(advice("missing.mp4", 0.0, 1.0))
    };
    let mut engine = MatchEngine::with_policy(MatchConfig::default(), AdvisedPolicy::new(advisor));
    let edl = engine.run(&blueprint, &clips(), None).unwrap().edl;

    assert_eq!(fallbacks(&edl.warnings), 2);
    assert!((edl.timeline_end() - 4.0).abs() < 1e-9);
    assert_ne!(edl.decisions[0].clip_path, edl.decisions.last().unwrap().clip_path);
    let warning = edl
        .warnings
        .iter()
        .find(|w| matches!(w, EdlWarning::AdvisorFallback { .. }))
        .unwrap();
    assert!(warning.to_string().contains("missing.mp4"));
}

#[test]
fn malformed_reply_falls_back_to_rotation() {
    let blueprint = Blueprint::from_segments(vec![TargetSegment::new(
        0,
        0.0,
        2.0,
        EnergyLevel::High,
        ArcStage::Intro,
    )]);
    let advisor =
        |_: &SegmentContext<'_>, _: &[CandidateSummary]| parse_advice_reply("I am not sure.");
    let mut engine = MatchEngine::with_policy(MatchConfig::default(), AdvisedPolicy::new(advisor));
    let edl = engine.run(&blueprint, &clips(), None).unwrap().edl;

    assert_eq!(fallbacks(&edl.warnings), 1);
    assert_eq!(edl.decisions[0].clip_path, "a.mp4");
}

// ── Context handed to the advisor ──────────────────────────────

#[test]
fn advisor_sees_segment_context() {
    let blueprint = Blueprint::from_segments(vec![
        TargetSegment::new(0, 0.0, 2.0, EnergyLevel::High, ArcStage::Intro)
            .with_hint("emotional_anchor", "anticipation"),
        TargetSegment::new(1, 2.0, 4.0, EnergyLevel::High, ArcStage::Peak),
    ]);
    let beats = BeatGrid::new(vec![0.5, 1.0, 1.5, 2.5, 3.5]);
    let mut seen = Vec::new();

    {
        let advisor = |context: &SegmentContext<'_>,
                       candidates: &[CandidateSummary]|
         -> Result<Advice, AdviceError> {
            seen.push((
                context.segment_index,
                context.segment_count,
                context.segment.hints.get("emotional_anchor").cloned(),
                context.beats_in_segment.clone(),
                context.previous.map(|p| p.clip_path.clone()),
                candidates.len(),
            ));
            Err(AdviceError::Unavailable("offline".into()))
        };
        let mut engine =
            MatchEngine::with_policy(MatchConfig::default(), AdvisedPolicy::new(advisor));
        engine.run(&blueprint, &clips(), Some(&beats)).unwrap();
    }

    assert_eq!(seen.len(), 2);
    assert_eq!(
        seen[0],
        (
            0,
            2,
            Some("anticipation".to_string()),
            vec![0.5, 1.0, 1.5],
            None,
            2
        )
    );
    assert_eq!(seen[1].0, 1);
    assert_eq!(seen[1].2, None);
    assert_eq!(seen[1].3, vec![2.5, 3.5]);
    assert_eq!(seen[1].4.as_deref(), Some("b.mp4"));
}
