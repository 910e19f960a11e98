//! Time spans on clip and timeline axes.
//!
//! All positions are `f64` seconds. Equality between independently computed
//! positions is only ever checked against an explicit tolerance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns true when `a` and `b` differ by at most `tolerance`.
#[inline]
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// A half-open interval `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    /// Start (inclusive)
    pub start: f64,
    /// End (exclusive)
    pub end: f64,
}

impl TimeSpan {
    /// Create a span from start and end.
    #[inline]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the span.
    #[inline]
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// A span is valid when both ends are finite and it has positive length.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.end > self.start
    }

    /// Check if a time is within this span.
    #[inline]
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Check if two spans overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Compute the intersection of two spans, if any.
    pub fn intersection(self, other: Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self::new(
            self.start.max(other.start),
            self.end.min(other.end),
        ))
    }

    /// Clip this span to `[lo, hi]`, returning `None` if nothing is left.
    pub fn clamp_to(self, lo: f64, hi: f64) -> Option<Self> {
        let clamped = Self::new(self.start.max(lo), self.end.min(hi));
        clamped.is_valid().then_some(clamped)
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}s, {:.3}s)", self.start, self.end)
    }
}
