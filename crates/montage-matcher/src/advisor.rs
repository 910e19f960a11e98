//! External decision collaborator interface.
//!
//! An advisor sees the segment, its context and the enumerated candidates,
//! and nominates one moment. Calls are blocking and made one segment at a
//! time; retries and transport belong to the implementor. Any failure is
//! reported as an `AdviceError` and the caller falls back to rotation.

use montage_core::{EnergyLevel, MomentRole, TargetSegment};
use serde::{Deserialize, Serialize};

use crate::error::AdviceError;
use crate::scoring::PreviousPick;

/// What the advisor knows about the segment being filled.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentContext<'a> {
    pub segment: &'a TargetSegment,
    /// Position of the segment in the blueprint.
    pub segment_index: usize,
    pub segment_count: usize,
    pub previous: Option<&'a PreviousPick>,
    /// Beat timestamps falling inside the segment.
    pub beats_in_segment: Vec<f64>,
}

/// One candidate as the advisor sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub clip_id: String,
    pub energy: EnergyLevel,
    pub start: f64,
    pub end: f64,
    pub role: Option<MomentRole>,
    pub stable: bool,
    pub reason: String,
    pub usage_count: u32,
    pub cursor: f64,
    pub semantic: f64,
    pub musical: f64,
    pub continuity: f64,
}

/// The advisor's nomination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub clip_id: String,
    pub energy: EnergyLevel,
    pub start: f64,
    pub end: f64,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl Advice {
    /// Reject advice that is internally inconsistent.
    pub fn check(&self) -> Result<(), AdviceError> {
        if self.clip_id.trim().is_empty() {
            return Err(AdviceError::Malformed("empty clip id".into()));
        }
        if !self.start.is_finite() || !self.end.is_finite() || self.start < 0.0 {
            return Err(AdviceError::Malformed(format!(
                "invalid span {}..{}",
                self.start, self.end
            )));
        }
        if self.end <= self.start {
            return Err(AdviceError::Malformed(format!(
                "end {} is not after start {}",
                self.end, self.start
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(AdviceError::Malformed(format!(
                "confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        Ok(())
    }
}

/// A synchronous decision collaborator.
pub trait Advisor {
    fn advise(
        &mut self,
        context: &SegmentContext<'_>,
        candidates: &[CandidateSummary],
    ) -> Result<Advice, AdviceError>;
}

impl<F> Advisor for F
where
    F: FnMut(&SegmentContext<'_>, &[CandidateSummary]) -> Result<Advice, AdviceError>,
{
    fn advise(
        &mut self,
        context: &SegmentContext<'_>,
        candidates: &[CandidateSummary],
    ) -> Result<Advice, AdviceError> {
        self(context, candidates)
    }
}

/// Parse advice out of a free-text reply.
///
/// Collaborators backed by language models often wrap the JSON object in
/// prose or code fences; everything outside the outermost braces is ignored.
pub fn parse_advice_reply(reply: &str) -> Result<Advice, AdviceError> {
    let json = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if end > start => &reply[start..=end],
        _ => {
            return Err(AdviceError::Malformed(
                "no JSON object in advisor reply".into(),
            ))
        }
    };
    let advice: Advice = serde_json::from_str(json)
        .map_err(|e| AdviceError::Malformed(format!("invalid advice JSON: {e}")))?;
    advice.check()?;
    Ok(advice)
}
