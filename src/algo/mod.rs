//! Meshing algorithms.
//!
//! - **Q-Morph**: the advancing-front triangle-to-quad conversion engine
//! - **Smoothing**: node position proposals used by the engine
//! - **Stages**: traits for the steps around the engine, with a few
//!   ready-made implementations
//! - **Progress**: callbacks for long runs

pub mod progress;
pub mod qmorph;
pub mod smooth;
pub mod stages;

pub use progress::Progress;
