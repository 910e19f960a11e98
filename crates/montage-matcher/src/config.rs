//! Tunable thresholds for a matching run.

use montage_core::{MontageError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Longest single allocation from one moment (default: 3.0).
    pub max_cut_secs: f64,
    /// Allocations shorter than this are discarded (default: 0.1).
    pub min_cut_secs: f64,
    /// A cursor this close to its clip's end rewinds to zero (default: 0.1).
    pub exhaustion_margin_secs: f64,
    /// A segment counts as filled once this little remains (default: 0.05).
    pub fill_tolerance_secs: f64,
    /// Allowed difference between the EDL and the declared total (default: 0.5).
    pub total_tolerance_secs: f64,
    /// Distance to a beat that still counts as on-beat (default: 0.1).
    pub beat_tolerance_secs: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_cut_secs: 3.0,
            min_cut_secs: 0.1,
            exhaustion_margin_secs: 0.1,
            fill_tolerance_secs: 0.05,
            total_tolerance_secs: 0.5,
            beat_tolerance_secs: 0.1,
        }
    }
}

impl MatchConfig {
    /// Reject configurations the filler cannot make progress with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_cut_secs", self.max_cut_secs),
            ("min_cut_secs", self.min_cut_secs),
            ("fill_tolerance_secs", self.fill_tolerance_secs),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(MontageError::InvalidInput(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        let non_negative = [
            ("exhaustion_margin_secs", self.exhaustion_margin_secs),
            ("total_tolerance_secs", self.total_tolerance_secs),
            ("beat_tolerance_secs", self.beat_tolerance_secs),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(MontageError::InvalidInput(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        if self.min_cut_secs > self.max_cut_secs {
            return Err(MontageError::InvalidInput(
                "min_cut_secs exceeds max_cut_secs".into(),
            ));
        }
        Ok(())
    }
}
