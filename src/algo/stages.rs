//! Pipeline stages around the Q-Morph engine.
//!
//! The engine consumes an existing triangulation and leaves a quad-dominant
//! mesh. Producing the triangulation and improving the result afterwards are
//! separate concerns, expressed by two traits: [`Triangulate`] for anything
//! that yields a triangle mesh, and [`PostProcess`] for passes that run once
//! the front is exhausted.
//!
//! # Example
//!
//! ```
//! use qmorph::algo::qmorph::{QMorph, QMorphOptions};
//! use qmorph::algo::stages::{PostProcess, TriangleSoup, Triangulate, WrapResidualTriangles};
//!
//! let source = TriangleSoup::new(vec![[0.0, 0.0, 1.0, 0.0, 0.5, 0.8]]);
//! let mesh = source.triangulate().unwrap();
//!
//! let mut engine = QMorph::new(mesh, QMorphOptions::default()).unwrap();
//! let mut wrap = WrapResidualTriangles;
//! engine.run_with(&mut [&mut wrap as &mut dyn PostProcess]).unwrap();
//!
//! // the lone triangle could not pair up, so it is wrapped as a fake quad
//! assert_eq!(engine.mesh().num_triangles(), 0);
//! assert_eq!(engine.mesh().num_quads(), 1);
//! ```

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, ElementId, ElementShape, Mesh};

/// A source of triangle meshes.
pub trait Triangulate {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Produce the triangulation.
    fn triangulate(&self) -> Result<Mesh>;
}

/// A pass over the finished mesh.
pub trait PostProcess {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Apply the pass in place.
    fn apply(&mut self, mesh: &mut Mesh) -> Result<()>;
}

/// Triangles given directly as `[x0, y0, x1, y1, x2, y2]`.
#[derive(Debug, Clone, Default)]
pub struct TriangleSoup {
    triangles: Vec<[f64; 6]>,
}

impl TriangleSoup {
    /// Wrap a list of triangles.
    pub fn new(triangles: Vec<[f64; 6]>) -> Self {
        Self { triangles }
    }
}

impl Triangulate for TriangleSoup {
    fn name(&self) -> &str {
        "triangle soup"
    }

    fn triangulate(&self) -> Result<Mesh> {
        build_from_triangles(&self.triangles)
    }
}

/// Replace every remaining triangle by a fake quad over the same edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct WrapResidualTriangles;

impl PostProcess for WrapResidualTriangles {
    fn name(&self) -> &str {
        "wrap residual triangles"
    }

    fn apply(&mut self, mesh: &mut Mesh) -> Result<()> {
        let triangles: Vec<ElementId> = mesh
            .element_ids()
            .filter(|&el| mesh.element(el).is_triangle())
            .collect();
        for &t in &triangles {
            let removed = mesh.remove_element(t);
            let [base, right, left] = match removed.edges() {
                &[e0, e1, e2] => [e0, e1, e2],
                _ => return Err(MeshError::InvalidState(format!("element {t} is not a triangle"))),
            };
            // the edges no longer separate meshed from unmeshed regions
            for e in [base, right, left] {
                if mesh.edge(e).is_front() {
                    mesh.demote_front(e);
                }
            }
            mesh.add_fake_quad(base, right, left);
        }
        log::debug!("wrapped {} residual triangles as fake quads", triangles.len());
        Ok(())
    }
}

/// Fail if any back-reference or front bucket is out of step.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckConsistency;

impl PostProcess for CheckConsistency {
    fn name(&self) -> &str {
        "consistency check"
    }

    fn apply(&mut self, mesh: &mut Mesh) -> Result<()> {
        if !mesh.is_valid() {
            return Err(MeshError::InvalidState(
                "element, edge and node references disagree".to_string(),
            ));
        }
        if !mesh.front_is_consistent() {
            return Err(MeshError::InvalidState(
                "front buckets do not match the front edges".to_string(),
            ));
        }
        if let Some(el) = mesh
            .element_ids()
            .find(|&el| mesh.element(el).is_invalid(mesh))
        {
            return Err(MeshError::DegenerateElement {
                element: el.index(),
            });
        }
        Ok(())
    }
}
