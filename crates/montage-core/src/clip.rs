//! Source clips and their analysed best moments.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::{MontageError, Result};
use crate::tags::{EnergyLevel, MomentRole, MotionLevel, NarrativeUtility};
use crate::time::TimeSpan;

/// A sub-interval of a clip considered strong for one energy level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentWindow {
    /// Start within the clip (seconds)
    pub start: f64,
    /// End within the clip (seconds)
    pub end: f64,
    #[serde(default)]
    pub role: Option<MomentRole>,
    /// Steady footage (no shake, no reframing).
    #[serde(default)]
    pub stable: bool,
    /// Why the analysis picked this moment.
    #[serde(default)]
    pub reason: String,
}

impl MomentWindow {
    /// Create an untagged window.
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            role: None,
            stable: false,
            reason: String::new(),
        }
    }

    /// Set the moment role.
    pub fn with_role(mut self, role: MomentRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Mark as stable footage.
    pub fn stable(mut self) -> Self {
        self.stable = true;
        self
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.end)
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A source video asset as described by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipAsset {
    /// Filename or path; the clip's identity.
    pub path: String,
    /// Total duration in seconds.
    pub duration: f64,
    pub energy: EnergyLevel,
    #[serde(default)]
    pub motion: MotionLevel,
    #[serde(default)]
    pub vibes: Vec<String>,
    #[serde(default)]
    pub utilities: Vec<NarrativeUtility>,
    /// Best-moment windows keyed by the energy level they suit.
    #[serde(default)]
    pub moments: BTreeMap<EnergyLevel, Vec<MomentWindow>>,
}

impl ClipAsset {
    /// Create a clip with no tags and no moment windows.
    pub fn new(path: impl Into<String>, duration: f64, energy: EnergyLevel) -> Self {
        Self {
            path: path.into(),
            duration,
            energy,
            motion: MotionLevel::default(),
            vibes: Vec::new(),
            utilities: Vec::new(),
            moments: BTreeMap::new(),
        }
    }

    /// Add a moment window for `energy`.
    pub fn with_moment(mut self, energy: EnergyLevel, window: MomentWindow) -> Self {
        self.moments.entry(energy).or_default().push(window);
        self
    }

    /// Add vibe tags.
    pub fn with_vibes<I, S>(mut self, vibes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vibes.extend(vibes.into_iter().map(Into::into));
        self
    }

    /// Add narrative utility tags.
    pub fn with_utilities(mut self, utilities: impl IntoIterator<Item = NarrativeUtility>) -> Self {
        self.utilities.extend(utilities);
        self
    }

    /// Whether the analysis produced any windows at all.
    pub fn has_moments(&self) -> bool {
        self.moments.values().any(|w| !w.is_empty())
    }

    /// Windows clipped to `[0, duration]`, in energy then declaration order.
    ///
    /// Windows left empty or inverted after clipping are dropped.
    pub fn usable_windows(&self) -> Vec<(EnergyLevel, MomentWindow)> {
        let mut usable = Vec::new();
        for (&energy, windows) in &self.moments {
            for window in windows {
                match window.span().clamp_to(0.0, self.duration) {
                    Some(span) => usable.push((
                        energy,
                        MomentWindow {
                            start: span.start,
                            end: span.end,
                            ..window.clone()
                        },
                    )),
                    None => warn!(
                        clip = %self.path,
                        start = window.start,
                        end = window.end,
                        "Dropping moment window outside clip bounds"
                    ),
                }
            }
        }
        usable
    }

    /// Check the clip has a usable duration.
    pub fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(MontageError::InvalidInput(format!(
                "clip {} has invalid duration {}",
                self.path, self.duration
            )));
        }
        Ok(())
    }
}

/// The pool of analysed clips, in the order the analysis produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipIndex {
    pub clips: Vec<ClipAsset>,
}

impl ClipIndex {
    pub fn new(clips: Vec<ClipAsset>) -> Self {
        Self { clips }
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Look up a clip by path.
    pub fn get(&self, path: &str) -> Option<&ClipAsset> {
        self.clips.iter().find(|c| c.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }
}
