//! Parallax Veto - Monte Carlo study of a shell-conditional parallax filter
//!
//! A survey targeting objects at a fixed heliocentric distance can reject
//! tracklets whose short-baseline parallax displacement falls outside the
//! window expected for that distance shell. This library provides the
//! window geometry, seeded synthetic populations, the baseline simulation,
//! the spurious-tracklet stress test, and figure rendering.

pub mod cli;
pub mod error;
pub mod histogram;
pub mod plot;
pub mod population;
pub mod report;
pub mod rng;
pub mod simulation;
pub mod stress;
pub mod window;

pub use error::{Result, VetoError};
