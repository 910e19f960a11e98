//! Beat grid of the soundtrack.

use serde::{Deserialize, Serialize};

/// Ordered beat timestamps in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct BeatGrid {
    beats: Vec<f64>,
}

impl BeatGrid {
    /// Build a grid, dropping non-finite values and sorting the rest.
    pub fn new(mut beats: Vec<f64>) -> Self {
        beats.retain(|b| b.is_finite());
        beats.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        beats.dedup();
        Self { beats }
    }

    pub fn beats(&self) -> &[f64] {
        &self.beats
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    /// Distance from `time` to the closest beat.
    pub fn distance_to_nearest(&self, time: f64) -> Option<f64> {
        if self.beats.is_empty() {
            return None;
        }
        let idx = self.beats.partition_point(|&b| b < time);
        let after = self.beats.get(idx).map(|&b| (b - time).abs());
        let before = idx
            .checked_sub(1)
            .and_then(|i| self.beats.get(i))
            .map(|&b| (time - b).abs());
        match (before, after) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Whether `time` lies within `tolerance` of a beat.
    pub fn is_on_beat(&self, time: f64, tolerance: f64) -> bool {
        self.distance_to_nearest(time)
            .is_some_and(|d| d <= tolerance)
    }

    /// Mean spacing between consecutive beats.
    pub fn average_interval(&self) -> Option<f64> {
        if self.beats.len() < 2 {
            return None;
        }
        let first = self.beats[0];
        let last = self.beats[self.beats.len() - 1];
        let interval = (last - first) / (self.beats.len() - 1) as f64;
        (interval > 0.0).then_some(interval)
    }
}

impl From<Vec<f64>> for BeatGrid {
    fn from(beats: Vec<f64>) -> Self {
        Self::new(beats)
    }
}

impl From<BeatGrid> for Vec<f64> {
    fn from(grid: BeatGrid) -> Self {
        grid.beats
    }
}
