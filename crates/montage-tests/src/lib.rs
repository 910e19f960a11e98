//! Integration test crate for Montage.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the core, timeline and matcher crates to verify they work
//! together.

#[cfg(test)]
mod matching;

#[cfg(test)]
mod advisor;

#[cfg(test)]
mod persistence;
