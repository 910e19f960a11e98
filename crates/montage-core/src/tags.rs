//! Editorial vocabulary shared by segments, clips and the matcher.
//!
//! Every scoring table is a closed `match` from one enum to a static slice
//! of another, so adding a variant forces every table to be revisited.

use serde::{Deserialize, Serialize};

/// Energy level of a segment, clip or moment window.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

impl EnergyLevel {
    /// All levels in enumeration order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Display name for logs and reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Coarse camera / subject motion descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MotionLevel {
    Static,
    #[default]
    Moderate,
    Dynamic,
}

/// Position of a segment on the narrative arc of the reference video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArcStage {
    Intro,
    #[serde(alias = "Build-up", alias = "Buildup")]
    BuildUp,
    Peak,
    Outro,
}

impl ArcStage {
    /// Moment roles that suit this stage of the arc.
    pub fn fitting_roles(self) -> &'static [MomentRole] {
        use MomentRole::*;
        match self {
            Self::Intro => &[Establishing, Build],
            Self::BuildUp => &[Build, Transition],
            Self::Peak => &[Climax, Peak],
            Self::Outro => &[Reflection, Establishing],
        }
    }

    /// Whether a moment with `role` suits this stage.
    pub fn accepts(self, role: MomentRole) -> bool {
        self.fitting_roles().contains(&role)
    }
}

/// Editorial purpose of a moment inside its clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MomentRole {
    Establishing,
    Build,
    Transition,
    Climax,
    Peak,
    Reflection,
}

impl MomentRole {
    /// Roles that read naturally right after this one.
    pub fn successors(self) -> &'static [MomentRole] {
        use MomentRole::*;
        match self {
            Self::Establishing => &[Build, Transition],
            Self::Build => &[Climax, Peak, Transition],
            Self::Transition => &[Build, Climax, Reflection],
            Self::Climax => &[Reflection, Transition],
            Self::Peak => &[Reflection, Transition],
            Self::Reflection => &[Establishing, Build],
        }
    }

    /// Whether `next` is a valid successor of this role.
    pub fn flows_into(self, next: MomentRole) -> bool {
        self.successors().contains(&next)
    }
}

/// What the target segment's shot is meant to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotFunction {
    Establish,
    Action,
    Reaction,
    Detail,
    Transition,
    Payoff,
}

impl ShotFunction {
    /// Clip narrative utilities that can serve this shot function.
    pub fn served_by(self) -> &'static [NarrativeUtility] {
        use NarrativeUtility::*;
        match self {
            Self::Establish => &[Establishing, Scenic],
            Self::Action => &[Action, Movement],
            Self::Reaction => &[Reaction, Emotion],
            Self::Detail => &[Detail, Texture],
            Self::Transition => &[Transition, Movement],
            Self::Payoff => &[Payoff, Emotion],
        }
    }
}

/// What a clip is useful for, as tagged by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NarrativeUtility {
    Establishing,
    Scenic,
    Action,
    Movement,
    Reaction,
    Emotion,
    Detail,
    Texture,
    Transition,
    Payoff,
}
