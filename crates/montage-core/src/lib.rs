//! Montage Core - Data model for clip-to-segment matching
//!
//! This crate provides the types every other Montage crate shares:
//! - Editorial vocabulary (energy, arc stage, moment roles) with closed lookup tables
//! - Target segments and the blueprint they form
//! - Clip assets and their analysed moment windows
//! - Beat grids and time spans

pub mod beat;
pub mod clip;
pub mod error;
pub mod segment;
pub mod tags;
pub mod time;

pub use beat::BeatGrid;
pub use clip::{ClipAsset, ClipIndex, MomentWindow};
pub use error::{MontageError, Result};
pub use segment::{Blueprint, TargetSegment};
pub use tags::{ArcStage, EnergyLevel, MomentRole, MotionLevel, NarrativeUtility, ShotFunction};
pub use time::{approx_eq, TimeSpan};
