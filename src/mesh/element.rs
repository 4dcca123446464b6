//! The element capability shared by triangles and quads.
//!
//! Every element stores its corner nodes in counter-clockwise order starting
//! at its first node, together with its bounding edges aligned so that edge
//! `i` runs from node `i` to node `i + 1`. Interior angles are cached in the
//! same order and refreshed by the registry whenever a corner moves.

use nalgebra::Point2;

use super::index::{EdgeId, ElementId, NodeId};
use super::quad::Quad;
use super::registry::Mesh;
use super::triangle::Triangle;
use crate::error::invariant_violation;
use crate::geom::{ccw_angle, orient, polygon_signed_area, COINCIDENCE_TOLERANCE};

/// Operations common to every element shape.
pub trait ElementShape {
    /// Bounding edges in walk order.
    fn edges(&self) -> &[EdgeId];

    /// Corner nodes in counter-clockwise walk order, starting at the first node.
    fn nodes(&self) -> &[NodeId];

    /// Interior angles, aligned with [`ElementShape::nodes`].
    fn angles(&self) -> &[f64];

    /// Whether the element has turned inside out.
    fn inverted(&self, mesh: &Mesh) -> bool;

    /// Shape quality: 1.0 for the ideal shape, negative when inverted.
    fn distortion(&self, mesh: &Mesh) -> f64;

    /// The node fixing the winding.
    fn first_node(&self) -> NodeId {
        self.nodes()[0]
    }

    /// Whether `e` bounds this element.
    fn has_edge(&self, e: EdgeId) -> bool {
        self.edges().contains(&e)
    }

    /// Whether `n` is a corner of this element.
    fn has_node(&self, n: NodeId) -> bool {
        self.nodes().contains(&n)
    }

    /// Current corner positions in walk order.
    fn positions(&self, mesh: &Mesh) -> Vec<Point2<f64>> {
        self.nodes().iter().map(|&n| *mesh.node(n).position()).collect()
    }

    /// Signed area; positive for counter-clockwise winding.
    fn signed_area(&self, mesh: &Mesh) -> f64 {
        polygon_signed_area(&self.positions(mesh))
    }

    /// Whether the area vanishes within the coincidence tolerance.
    fn zero_area(&self, mesh: &Mesh) -> bool {
        self.signed_area(mesh).abs() < COINCIDENCE_TOLERANCE
    }

    /// Inverted or degenerate.
    fn is_invalid(&self, mesh: &Mesh) -> bool {
        self.inverted(mesh) || self.zero_area(mesh)
    }

    /// Interior angle at corner `n`.
    ///
    /// # Panics
    /// Panics if `n` is not a corner.
    fn angle_at(&self, n: NodeId) -> f64 {
        match self.nodes().iter().position(|&x| x == n) {
            Some(i) => self.angles()[i],
            None => invariant_violation(format!("node {n} is not a corner of the element")),
        }
    }

    /// Interior angle between edge `e` and its neighbour edge at node `n`.
    ///
    /// # Panics
    /// Panics if `e` does not bound this element or does not touch `n`.
    fn angle(&self, mesh: &Mesh, e: EdgeId, n: NodeId) -> f64 {
        if !self.has_edge(e) || !mesh.edge(e).has_node(n) {
            invariant_violation(format!("edge {e} does not meet node {n} inside the element"));
        }
        self.angle_at(n)
    }

    /// The other bounding edge that meets node `n`.
    ///
    /// # Panics
    /// Panics if `e` and `n` are not an edge/corner pair of this element.
    fn neighbor_edge(&self, n: NodeId, e: EdgeId) -> EdgeId {
        let nodes = self.nodes();
        let edges = self.edges();
        let k = nodes.len();
        let Some(i) = nodes.iter().position(|&x| x == n) else {
            invariant_violation(format!("node {n} is not a corner of the element"));
        };
        // edge i leaves node i, edge i-1 arrives at it
        let outgoing = edges[i];
        let incoming = edges[(i + k - 1) % k];
        if e == outgoing {
            incoming
        } else if e == incoming {
            outgoing
        } else {
            invariant_violation(format!("edge {e} does not meet node {n} inside the element"))
        }
    }

    /// The element on the other side of bounding edge `e`.
    fn neighbor(&self, mesh: &Mesh, this: ElementId, e: EdgeId) -> Option<ElementId> {
        if !self.has_edge(e) {
            invariant_violation(format!("edge {e} does not bound element {this}"));
        }
        mesh.edge(e).other_element(this)
    }

    /// Interior angles recomputed from the current positions.
    fn compute_angles(&self, mesh: &Mesh) -> Vec<f64> {
        corner_angles(&self.positions(mesh))
    }
}

/// Counter-clockwise interior angle at each corner of a polygon.
///
/// Reflex corners give angles above π.
pub fn corner_angles(points: &[Point2<f64>]) -> Vec<f64> {
    let k = points.len();
    (0..k)
        .map(|i| {
            let p = points[i];
            let next = points[(i + 1) % k] - p;
            let prev = points[(i + k - 1) % k] - p;
            ccw_angle(&next, &prev)
        })
        .collect()
}

/// Triangle quality in `(-1, 1]`: `2√3 · 2A / Σ|e|²`.
///
/// Equals 1 for an equilateral triangle and is negative when the corners run
/// clockwise.
pub fn triangle_distortion(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let sum = (b - a).norm_squared() + (c - b).norm_squared() + (a - c).norm_squared();
    if sum < COINCIDENCE_TOLERANCE {
        return 0.0;
    }
    2.0 * 3.0_f64.sqrt() * orient(a, b, c) / sum
}

/// A mesh element.
#[derive(Debug, Clone)]
pub enum Element {
    /// A three-sided element.
    Triangle(Triangle),
    /// A four-sided element (or a fake quad wrapping a triangle).
    Quad(Quad),
}

impl Element {
    /// Whether this is a triangle.
    #[inline]
    pub fn is_triangle(&self) -> bool {
        matches!(self, Element::Triangle(_))
    }

    /// Whether this is a quad (fake or not).
    #[inline]
    pub fn is_quad(&self) -> bool {
        matches!(self, Element::Quad(_))
    }

    /// The triangle, if this is one.
    pub fn as_triangle(&self) -> Option<&Triangle> {
        match self {
            Element::Triangle(t) => Some(t),
            Element::Quad(_) => None,
        }
    }

    /// The quad, if this is one.
    pub fn as_quad(&self) -> Option<&Quad> {
        match self {
            Element::Quad(q) => Some(q),
            Element::Triangle(_) => None,
        }
    }

    /// The corner opposite edge `e`, for triangles.
    pub fn opposite_node(&self, mesh: &Mesh, e: EdgeId) -> Option<NodeId> {
        let t = self.as_triangle()?;
        let edge = mesh.edge(e);
        t.nodes().iter().copied().find(|&n| !edge.has_node(n))
    }

    pub(crate) fn set_angles(&mut self, angles: &[f64]) {
        match self {
            Element::Triangle(t) => t.angles.copy_from_slice(angles),
            Element::Quad(q) => {
                let k = q.nodes().len();
                q.angles[..k].copy_from_slice(angles);
            }
        }
    }
}

impl ElementShape for Element {
    fn edges(&self) -> &[EdgeId] {
        match self {
            Element::Triangle(t) => t.edges(),
            Element::Quad(q) => q.edges(),
        }
    }

    fn nodes(&self) -> &[NodeId] {
        match self {
            Element::Triangle(t) => t.nodes(),
            Element::Quad(q) => q.nodes(),
        }
    }

    fn angles(&self) -> &[f64] {
        match self {
            Element::Triangle(t) => t.angles(),
            Element::Quad(q) => q.angles(),
        }
    }

    fn inverted(&self, mesh: &Mesh) -> bool {
        match self {
            Element::Triangle(t) => t.inverted(mesh),
            Element::Quad(q) => q.inverted(mesh),
        }
    }

    fn distortion(&self, mesh: &Mesh) -> f64 {
        match self {
            Element::Triangle(t) => t.distortion(mesh),
            Element::Quad(q) => q.distortion(mesh),
        }
    }
}
