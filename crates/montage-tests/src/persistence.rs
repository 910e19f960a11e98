//! Integration tests for EDL hand-off.
//!
//! The EDL produced by a run must survive the versioned file format and
//! still validate against the clip index it was built from.

use montage_core::{ArcStage, Blueprint, ClipAsset, ClipIndex, EnergyLevel, TargetSegment};
use montage_matcher::{MatchConfig, MatchEngine};
use montage_timeline::{validate, Edl, EdlFile, EdlWarning};

fn degraded_edl() -> (Edl, ClipIndex) {
    let blueprint = Blueprint::from_segments(vec![
        TargetSegment::new(0, 0.0, 2.0, EnergyLevel::Low, ArcStage::Intro),
        TargetSegment::new(1, 2.0, 5.5, EnergyLevel::High, ArcStage::Peak),
    ]);
    let clips = ClipIndex::new(vec![
        ClipAsset::new("a.mp4", 4.0, EnergyLevel::High),
        ClipAsset::new("b.mp4", 6.0, EnergyLevel::High),
    ]);
    let edl = MatchEngine::new(MatchConfig::default())
        .run(&blueprint, &clips, None)
        .unwrap()
        .edl;
    (edl, clips)
}

#[test]
fn edl_file_round_trips_with_warnings() {
    let (edl, clips) = degraded_edl();
    assert!(edl
        .warnings
        .iter()
        .any(|w| matches!(w, EdlWarning::DegradedPool { .. })));

    let json = EdlFile::new(edl.clone()).to_json().unwrap();
    let loaded = EdlFile::from_json(&json).unwrap();
    assert_eq!(loaded.edl, edl);
    assert_eq!(validate(&loaded.edl, &clips, 0.5), Ok(None));
}

#[test]
fn bare_edl_from_older_writer_loads() {
    let (edl, _) = degraded_edl();
    let bare = serde_json::to_vec(&edl).unwrap();

    let loaded = EdlFile::from_json(&bare).unwrap();
    assert_eq!(loaded.version, montage_timeline::serialization::CURRENT_VERSION);
    assert_eq!(loaded.edl.decisions, edl.decisions);
}

#[test]
fn edl_rejected_against_foreign_clip_index() {
    let (edl, _) = degraded_edl();
    let other = ClipIndex::new(vec![ClipAsset::new("z.mp4", 10.0, EnergyLevel::Low)]);
    assert!(validate(&edl, &other, 0.5).is_err());
}

#[test]
fn warnings_serialize_with_kind_tag() {
    let (edl, _) = degraded_edl();
    let value = serde_json::to_value(&edl).unwrap();
    let kinds: Vec<&str> = value["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|w| w["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"DegradedPool"));
}

#[test]
fn hand_edited_overlap_is_refused_on_load() {
    let (edl, _) = degraded_edl();
    assert!(edl.len() >= 2);
    let mut value = serde_json::to_value(EdlFile::new(edl)).unwrap();
    let shifted = value["edl"]["decisions"][1]["timeline_start"].as_f64().unwrap() - 0.5;
    value["edl"]["decisions"][1]["timeline_start"] = serde_json::json!(shifted);

    let err = EdlFile::from_json(&serde_json::to_vec(&value).unwrap()).unwrap_err();
    assert!(err.to_string().contains("decision 1"));
}

#[test]
fn file_lists_every_source_clip() {
    let (edl, clips) = degraded_edl();
    let file = EdlFile::new(edl);
    assert!(!file.sources.is_empty());
    assert!(file.sources.iter().all(|path| clips.contains(path)));
}
