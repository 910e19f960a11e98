//! Clip pool indexed by declared energy.

use montage_core::{ClipAsset, EnergyLevel};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Clips a segment may draw from.
#[derive(Debug, Clone)]
pub struct PoolLookup<'a> {
    pub clips: Vec<&'a ClipAsset>,
    /// True when no clip declared the requested energy and the full pool
    /// was substituted.
    pub degraded: bool,
}

/// Read-only index of the usable clips, rebuilt once per run.
#[derive(Debug)]
pub struct ClipPool<'a> {
    clips: Vec<&'a ClipAsset>,
    by_energy: BTreeMap<EnergyLevel, Vec<usize>>,
}

impl<'a> ClipPool<'a> {
    /// Index `clips`, skipping any without a usable duration.
    pub fn new(clips: &'a [ClipAsset]) -> Self {
        let mut usable = Vec::with_capacity(clips.len());
        let mut by_energy: BTreeMap<EnergyLevel, Vec<usize>> = BTreeMap::new();

        for clip in clips {
            if let Err(e) = clip.validate() {
                warn!(clip = %clip.path, error = %e, "Skipping unusable clip");
                continue;
            }
            by_energy.entry(clip.energy).or_default().push(usable.len());
            usable.push(clip);
        }

        debug!(
            clips = usable.len(),
            levels = by_energy.len(),
            "Clip pool indexed"
        );
        Self {
            clips: usable,
            by_energy,
        }
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Every usable clip, in input order.
    pub fn all(&self) -> &[&'a ClipAsset] {
        &self.clips
    }

    /// Clips declaring `energy`, in input order.
    pub fn with_energy(&self, energy: EnergyLevel) -> Vec<&'a ClipAsset> {
        self.by_energy
            .get(&energy)
            .map(|idx| idx.iter().map(|&i| self.clips[i]).collect())
            .unwrap_or_default()
    }

    /// Clips for `energy`, or the whole pool if none declare it.
    pub fn lookup(&self, energy: EnergyLevel) -> PoolLookup<'a> {
        let clips = self.with_energy(energy);
        if clips.is_empty() {
            warn!(
                energy = energy.display_name(),
                "No clips for energy level, using full pool"
            );
            return PoolLookup {
                clips: self.clips.clone(),
                degraded: true,
            };
        }
        PoolLookup {
            clips,
            degraded: false,
        }
    }
}
