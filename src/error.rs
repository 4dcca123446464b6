//! Error types for qmorph.
//!
//! Two tiers of failure exist in this crate. Malformed input and bad
//! parameters are reported through [`MeshError`]. Broken connectivity
//! invariants are programmer errors and go through [`invariant_violation`],
//! which logs a diagnostic and panics.

use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while loading a mesh or driving the engine.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no elements.
    #[error("mesh has no elements")]
    EmptyMesh,

    /// An input element has coincident corners or zero area.
    #[error("element {element} is degenerate (coincident corners or zero area)")]
    DegenerateElement {
        /// Index of the element in the input.
        element: usize,
    },

    /// An edge would be shared by more than two input elements.
    #[error("element {element} would make edge ({x0}, {y0})-({x1}, {y1}) shared by three elements")]
    NonManifoldEdge {
        /// Index of the offending element in the input.
        element: usize,
        /// First endpoint, x.
        x0: f64,
        /// First endpoint, y.
        y0: f64,
        /// Second endpoint, x.
        x1: f64,
        /// Second endpoint, y.
        y1: f64,
    },

    /// The engine was handed a mesh that contains quads.
    #[error("mesh is not all-triangle: element {element} is a quad")]
    NotTriangulated {
        /// Handle index of the first non-triangle element.
        element: usize,
    },

    /// A record line could not be parsed.
    #[error("line {line}: {message}")]
    InvalidRecord {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Invalid engine state for the requested operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: Display>(name: &'static str, value: T, reason: &'static str) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a record parse error.
    pub fn record<M: Into<String>>(line: usize, message: M) -> Self {
        MeshError::InvalidRecord {
            line,
            message: message.into(),
        }
    }
}

/// Report a broken connectivity invariant and abort.
///
/// There is no recovery path for these: they mean the mesh registry was
/// corrupted by a bug, not that the input was malformed.
#[cold]
#[track_caller]
pub fn invariant_violation(message: impl Display) -> ! {
    log::error!("mesh invariant violated: {message}");
    panic!("mesh invariant violated: {message}");
}
