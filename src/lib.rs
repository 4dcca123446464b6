//! # qmorph
//!
//! Conversion of planar triangle meshes into quad-dominant meshes with the
//! Q-Morph advancing-front method.
//!
//! The boundary of a triangulation becomes the initial front. Front edges
//! are consumed one at a time: each becomes the base of a new quad whose
//! sides and top are found (or created by swapping diagonals) among the
//! existing edges, and the triangles enclosed by it are merged away. The
//! front then advances across the quad, row by row, until nothing remains
//! to consume.
//!
//! ## Features
//!
//! - **Connectivity registry**: nodes, edges and elements in an arena with
//!   typed handles and mutual back-references
//! - **Front state machine**: front edges bucketed by how many quad sides are
//!   already committed at their ends
//! - **Local operations**: diagonal swap, edge split, top edge recovery with
//!   rollback
//! - **Smoothing**: length-weighted Laplacian and advancing-front moves,
//!   applied only when no element is inverted
//! - **Record files**: a plain-text element format with a reader and writer
//!
//! ## Quick Start
//!
//! ```
//! use qmorph::prelude::*;
//!
//! // a unit square as two triangles
//! let mesh = build_from_triangles(&[
//!     [0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
//!     [1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
//! ])
//! .unwrap();
//!
//! let mut engine = QMorph::new(mesh, QMorphOptions::default()).unwrap();
//! engine.run().unwrap();
//!
//! let mesh = engine.into_mesh();
//! assert_eq!(mesh.num_quads(), 1);
//! assert_eq!(mesh.num_triangles(), 0);
//! ```
//!
//! ## Loading and Saving
//!
//! ```no_run
//! use qmorph::prelude::*;
//!
//! let mesh = qmorph::io::load("domain.txt").unwrap();
//! let mut engine = QMorph::new(mesh, QMorphOptions::default()).unwrap();
//! let stats = engine.run().unwrap();
//! println!("{} quads, {} triangles left", stats.quads, stats.residual_triangles);
//!
//! qmorph::io::save(engine.mesh(), "quads.txt").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod geom;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use qmorph::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::qmorph::{EngineState, QMorph, QMorphOptions, RunStats, StepOutcome};
    pub use crate::algo::stages::{PostProcess, Triangulate};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_records, build_from_triangles, EdgeId, Element, ElementId, ElementRecord,
        ElementShape, Mesh, NodeId, Quad, Triangle,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use crate::io;

    #[test]
    fn test_square_from_records() {
        let records = io::read_records("0,0,1,0,0,1\n1,0,1,1,0,1\n".as_bytes()).unwrap();
        let mesh = build_from_records(&records).unwrap();
        assert_eq!(mesh.num_nodes(), 4);
        assert_eq!(mesh.num_edges(), 5);

        let mut engine = QMorph::new(mesh, QMorphOptions::default()).unwrap();
        let stats = engine.run().unwrap();
        assert_eq!(stats.quads, 1);
        assert_eq!(stats.residual_triangles, 0);

        let mesh = engine.mesh();
        assert_eq!(mesh.num_elements(), 1);
        assert_eq!(mesh.num_edges(), 4);
        assert_eq!(mesh.num_front_edges(), 0);
        assert!(mesh.is_valid());

        let el = mesh.element_ids().next().unwrap();
        let quad = mesh.element(el).as_quad().unwrap();
        assert!(!quad.is_fake());
        assert!((quad.signed_area(mesh) - 1.0).abs() < 1e-12);
        assert!((quad.distortion(mesh) - 1.0).abs() < 1e-12);
    }
}
