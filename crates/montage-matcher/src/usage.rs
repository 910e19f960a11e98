//! Per-run clip usage: how often each clip was used and where its playhead is.

use montage_core::ClipAsset;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// What happened to a clip's cursor after it moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorEvent {
    /// The cursor now sits at the requested position.
    Advanced,
    /// The clip was exhausted and the cursor went back to zero.
    Rewound,
}

/// Usage counters and cursors for one matching run.
///
/// Counts only ever grow. Cursors stay within `[0, clip.duration]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageState {
    counts: BTreeMap<String, u32>,
    cursors: BTreeMap<String, f64>,
}

impl UsageState {
    /// Zeroed state for every clip given.
    pub fn new<'a>(clips: impl IntoIterator<Item = &'a ClipAsset>) -> Self {
        let mut state = Self::default();
        for clip in clips {
            state.counts.insert(clip.path.clone(), 0);
            state.cursors.insert(clip.path.clone(), 0.0);
        }
        state
    }

    /// Times `clip` has been allocated from.
    pub fn usage_count(&self, clip: &str) -> u32 {
        self.counts.get(clip).copied().unwrap_or(0)
    }

    /// Next unused offset into `clip`.
    pub fn cursor(&self, clip: &str) -> f64 {
        self.cursors.get(clip).copied().unwrap_or(0.0)
    }

    /// Count one use of `clip` and move its cursor to `new_cursor`.
    pub fn record_use(&mut self, clip: &ClipAsset, new_cursor: f64, margin: f64) -> CursorEvent {
        *self.counts.entry(clip.path.clone()).or_insert(0) += 1;
        self.move_cursor(clip, new_cursor, margin)
    }

    /// Move the cursor without counting a use.
    ///
    /// A cursor within `margin` of the clip's end rewinds to zero.
    pub fn move_cursor(&mut self, clip: &ClipAsset, new_cursor: f64, margin: f64) -> CursorEvent {
        let cursor = new_cursor.clamp(0.0, clip.duration);
        if clip.duration - cursor <= margin {
            info!(clip = %clip.path, cursor, "Clip exhausted, rewinding cursor");
            self.cursors.insert(clip.path.clone(), 0.0);
            return CursorEvent::Rewound;
        }
        debug!(clip = %clip.path, cursor, "Cursor advanced");
        self.cursors.insert(clip.path.clone(), cursor);
        CursorEvent::Advanced
    }

    /// Rewind `clip` to its start.
    pub fn reset(&mut self, clip: &str) {
        info!(clip, "Resetting clip cursor");
        self.cursors.insert(clip.to_string(), 0.0);
    }

    /// Usage count per clip path.
    pub fn counts(&self) -> &BTreeMap<String, u32> {
        &self.counts
    }

    /// Sum of all usage counts.
    pub fn total_uses(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Largest difference between any two clips' usage counts.
    pub fn spread(&self) -> u32 {
        let max = self.counts.values().max().copied().unwrap_or(0);
        let min = self.counts.values().min().copied().unwrap_or(0);
        max - min
    }
}
