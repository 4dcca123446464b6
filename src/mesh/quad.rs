//! Quadrilateral elements.
//!
//! A quad names its edges by role relative to the front edge it was built
//! on: `base` (the consumed front edge), `right` and `left` (the sides) and
//! `top` (the edge closing the quad opposite the base). Walking the corners
//! counter-clockwise from the first node visits base, right, top, left in
//! that order.
//!
//! A *fake* quad wraps a triangle so later stages can treat every element
//! uniformly; its `top` is the same edge as its `right`.

use std::collections::{HashSet, VecDeque};

use nalgebra::Point2;

use super::element::{triangle_distortion, ElementShape};
use super::index::{EdgeId, ElementId, NodeId};
use super::registry::Mesh;
use crate::error::invariant_violation;
use crate::geom::{cross, polygon_signed_area, Segment, COINCIDENCE_TOLERANCE};

/// Distortion of a right isosceles corner triangle; quad corner qualities are
/// divided by it so a square scores 1.
const SQUARE_CORNER_QUALITY: f64 = 0.866_025_403_784_438_6;

/// A four-sided element.
#[derive(Debug, Clone)]
pub struct Quad {
    /// Edges in walk order: base, right, top, left (fake: base, right, left).
    pub(crate) walk: [EdgeId; 4],
    pub(crate) nodes: [NodeId; 4],
    pub(crate) angles: [f64; 4],
    pub(crate) fake: bool,
}

fn common(mesh: &Mesh, a: EdgeId, b: EdgeId) -> NodeId {
    match mesh.edge(a).common_node(mesh.edge(b)) {
        Some(n) => n,
        None => invariant_violation(format!("edges {a} and {b} of a quad share no node")),
    }
}

impl Quad {
    /// Assemble a quad from its four edges.
    ///
    /// If the given roles would wind clockwise, `left` and `right` swap so
    /// the walk runs counter-clockwise from the base.
    ///
    /// # Panics
    /// Panics if the edges do not form a closed loop of four distinct nodes.
    pub fn new(mesh: &Mesh, base: EdgeId, right: EdgeId, top: EdgeId, left: EdgeId) -> Self {
        let a = common(mesh, base, left);
        let b = common(mesh, base, right);
        let c = common(mesh, right, top);
        let d = common(mesh, top, left);
        let distinct: HashSet<NodeId> = [a, b, c, d].into_iter().collect();
        if distinct.len() != 4 {
            invariant_violation(format!(
                "edges {base}, {right}, {top}, {left} do not bound four distinct corners"
            ));
        }

        let pts = [a, b, c, d].map(|n| *mesh.node(n).position());
        let (walk, nodes) = if polygon_signed_area(&pts) < 0.0 {
            ([base, left, top, right], [b, a, d, c])
        } else {
            ([base, right, top, left], [a, b, c, d])
        };

        let mut quad = Self {
            walk,
            nodes,
            angles: [0.0; 4],
            fake: false,
        };
        quad.refresh_angles(mesh);
        quad
    }

    /// Wrap a triangle as a fake quad whose `top` is its `right`.
    pub fn fake(mesh: &Mesh, base: EdgeId, right: EdgeId, left: EdgeId) -> Self {
        let a = common(mesh, base, left);
        let b = common(mesh, base, right);
        let c = common(mesh, right, left);
        if a == b || b == c || c == a {
            invariant_violation(format!("edges {base}, {right}, {left} do not form a triangle"));
        }

        let pts = [a, b, c].map(|n| *mesh.node(n).position());
        let (walk, nodes) = if polygon_signed_area(&pts) < 0.0 {
            ([base, left, right, right], [b, a, c, c])
        } else {
            ([base, right, left, left], [a, b, c, c])
        };

        let mut quad = Self {
            walk,
            nodes,
            angles: [0.0; 4],
            fake: true,
        };
        quad.refresh_angles(mesh);
        quad
    }

    fn refresh_angles(&mut self, mesh: &Mesh) {
        let angles = self.compute_angles(mesh);
        self.angles[..angles.len()].copy_from_slice(&angles);
    }

    fn corners(&self) -> usize {
        if self.fake {
            3
        } else {
            4
        }
    }

    /// Whether this quad wraps a triangle.
    #[inline]
    pub fn is_fake(&self) -> bool {
        self.fake
    }

    /// The consumed front edge.
    #[inline]
    pub fn base(&self) -> EdgeId {
        self.walk[0]
    }

    /// The side leaving the second corner.
    #[inline]
    pub fn right(&self) -> EdgeId {
        self.walk[1]
    }

    /// The edge opposite the base; the right side for a fake quad.
    #[inline]
    pub fn top(&self) -> EdgeId {
        if self.fake {
            self.walk[1]
        } else {
            self.walk[2]
        }
    }

    /// The side arriving at the first corner.
    #[inline]
    pub fn left(&self) -> EdgeId {
        if self.fake {
            self.walk[2]
        } else {
            self.walk[3]
        }
    }

    /// Average of the corner positions.
    pub fn centroid(&self, mesh: &Mesh) -> Point2<f64> {
        let pts = self.positions(mesh);
        let sum = pts.iter().fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
        Point2::from(sum / pts.len() as f64)
    }

    /// Cross product at each corner between the outgoing and incoming edge.
    ///
    /// Positive at convex corners of a counter-clockwise walk.
    fn corner_crosses(&self, mesh: &Mesh) -> Vec<f64> {
        let pts = self.positions(mesh);
        let k = pts.len();
        (0..k)
            .map(|i| {
                let p = pts[i];
                cross(&(pts[(i + 1) % k] - p), &(pts[(i + k - 1) % k] - p))
            })
            .collect()
    }

    /// No reflex corner.
    pub fn is_convex(&self, mesh: &Mesh) -> bool {
        self.corner_crosses(mesh).iter().all(|&c| c >= 0.0)
    }

    /// No reflex or straight corner.
    pub fn is_strictly_convex(&self, mesh: &Mesh) -> bool {
        self.corner_crosses(mesh)
            .iter()
            .all(|&c| c > COINCIDENCE_TOLERANCE)
    }

    /// Whether opposite edges cross each other.
    pub fn is_bowtie(&self, mesh: &Mesh) -> bool {
        if self.fake {
            return false;
        }
        let [a, b, c, d] = self.nodes.map(|n| *mesh.node(n).position());
        Segment::new(a, b).crosses(&Segment::new(c, d))
            || Segment::new(b, c).crosses(&Segment::new(d, a))
    }

    /// Largest cached interior angle.
    pub fn largest_angle(&self) -> f64 {
        self.angles().iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Whether some interior angle reaches `threshold` (radians).
    pub fn is_chevron(&self, threshold: f64) -> bool {
        self.largest_angle() >= threshold
    }

    /// Triangles enclosed by the four edges, flooding outward from `seed`.
    ///
    /// Returns `None` when the flood escapes: it crosses an edge that is not
    /// one of the quad's own and has no element on the far side (a hole), or
    /// it runs into another quad.
    pub fn interior_triangles(&self, mesh: &Mesh, seed: ElementId) -> Option<Vec<ElementId>> {
        if !mesh.element(seed).is_triangle() {
            return None;
        }
        let bounds = self.edges();
        let mut seen: HashSet<ElementId> = HashSet::from([seed]);
        let mut queue = VecDeque::from([seed]);
        let mut found = Vec::new();

        while let Some(t) = queue.pop_front() {
            found.push(t);
            for &e in mesh.element(t).edges() {
                if bounds.contains(&e) {
                    continue;
                }
                let next = mesh.edge(e).other_element(t)?;
                if !mesh.element(next).is_triangle() {
                    return None;
                }
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        Some(found)
    }
}

impl ElementShape for Quad {
    fn edges(&self) -> &[EdgeId] {
        &self.walk[..self.corners()]
    }

    fn nodes(&self) -> &[NodeId] {
        &self.nodes[..self.corners()]
    }

    fn angles(&self) -> &[f64] {
        &self.angles[..self.corners()]
    }

    /// A vote: at least three corners must have turned clockwise, since a
    /// single reflex corner is a chevron, not an inversion.
    fn inverted(&self, mesh: &Mesh) -> bool {
        if self.fake {
            return self.signed_area(mesh) < 0.0;
        }
        self.corner_crosses(mesh).iter().filter(|&&c| c < 0.0).count() >= 3
    }

    fn distortion(&self, mesh: &Mesh) -> f64 {
        let pts = self.positions(mesh);
        if self.fake {
            return triangle_distortion(&pts[0], &pts[1], &pts[2]);
        }
        let worst = (0..4)
            .map(|i| triangle_distortion(&pts[i], &pts[(i + 1) % 4], &pts[(i + 3) % 4]))
            .fold(f64::INFINITY, f64::min);
        worst / SQUARE_CORNER_QUALITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::builder::build_from_triangles;
    use std::f64::consts::PI;

    /// Bare quad loop with no elements attached.
    fn quad_loop(pts: [(f64, f64); 4]) -> (Mesh, Quad, [NodeId; 4]) {
        let mut mesh = Mesh::new();
        let n = pts.map(|(x, y)| mesh.add_node(Point2::new(x, y)));
        let base = mesh.add_edge(n[0], n[1]);
        let right = mesh.add_edge(n[1], n[2]);
        let top = mesh.add_edge(n[2], n[3]);
        let left = mesh.add_edge(n[3], n[0]);
        let q = Quad::new(&mesh, base, right, top, left);
        (mesh, q, n)
    }

    #[test]
    fn test_unit_square() {
        let (mesh, q, n) = quad_loop([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert_eq!(q.first_node(), n[0]);
        assert!((q.signed_area(&mesh) - 1.0).abs() < 1e-12);
        assert!((q.distortion(&mesh) - 1.0).abs() < 1e-12);
        assert!(q.is_strictly_convex(&mesh));
        assert!(!q.is_bowtie(&mesh));
        assert!(!q.is_chevron(200.0_f64.to_radians()));
        let c = q.centroid(&mesh);
        assert!((c.x - 0.5).abs() < 1e-12 && (c.y - 0.5).abs() < 1e-12);
        for a in q.angles() {
            assert!((a - PI / 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_clockwise_roles_swap_sides() {
        // listed clockwise: base (0,0)-(0,1), "right" at (0,1)
        let (mesh, q, n) = quad_loop([(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        assert!(q.signed_area(&mesh) > 0.0);
        assert_eq!(q.first_node(), n[1]);
        assert!(mesh.edge(q.right()).has_node(n[0]));
        assert!(mesh.edge(q.left()).has_node(n[1]));
    }

    #[test]
    fn test_chevron() {
        let (mesh, q, _) = quad_loop([(0.0, 0.0), (2.0, 0.0), (1.0, 0.2), (0.0, 2.0)]);
        assert!(q.largest_angle() > 200.0_f64.to_radians());
        assert!(q.is_chevron(200.0_f64.to_radians()));
        assert!(!q.is_convex(&mesh));
        assert!(!q.inverted(&mesh));
        assert!(q.distortion(&mesh) < 0.0);
    }

    #[test]
    fn test_bowtie() {
        let (mesh, q, _) = quad_loop([(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]);
        assert!(q.is_bowtie(&mesh));
        assert!(!q.is_convex(&mesh));
    }

    #[test]
    fn test_inversion_vote() {
        let (mut mesh, q, n) = quad_loop([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert!(!q.inverted(&mesh));
        // mirror the quad through the x axis: every corner turns clockwise
        for (i, &(x, y)) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)].iter().enumerate() {
            mesh.set_position(n[i], Point2::new(x, -y));
        }
        assert!(q.inverted(&mesh));
        assert!(q.signed_area(&mesh) < 0.0);
        assert!(q.distortion(&mesh) < 0.0);
    }

    #[test]
    fn test_fake_quad() {
        let mut mesh = Mesh::new();
        let a = mesh.add_node(Point2::new(0.0, 0.0));
        let b = mesh.add_node(Point2::new(1.0, 0.0));
        let c = mesh.add_node(Point2::new(0.0, 1.0));
        let ab = mesh.add_edge(a, b);
        let bc = mesh.add_edge(b, c);
        let ca = mesh.add_edge(c, a);
        let q = Quad::fake(&mesh, ab, bc, ca);
        assert!(q.is_fake());
        assert_eq!(q.top(), q.right());
        assert_eq!(q.edges().len(), 3);
        assert_eq!(q.nodes().len(), 3);
        assert!(!q.inverted(&mesh));
        assert!((q.signed_area(&mesh) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_interior_triangles_of_split_square() {
        let mesh = build_from_triangles(&[
            [0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        ])
        .unwrap();
        let boundary: Vec<EdgeId> = mesh
            .edge_ids()
            .filter(|&e| !mesh.edge(e).is_interior())
            .collect();
        assert_eq!(boundary.len(), 4);

        // pick roles by walking the boundary loop
        let base = boundary[0];
        let [bl, br] = mesh.edge(base).nodes();
        let right = *boundary
            .iter()
            .find(|&&e| e != base && mesh.edge(e).has_node(br))
            .unwrap();
        let left = *boundary
            .iter()
            .find(|&&e| e != base && mesh.edge(e).has_node(bl))
            .unwrap();
        let top = *boundary
            .iter()
            .find(|&&e| e != base && e != right && e != left)
            .unwrap();
        let q = Quad::new(&mesh, base, right, top, left);

        let seed = mesh.edge(base).elements()[0].unwrap();
        let inside = q.interior_triangles(&mesh, seed).unwrap();
        assert_eq!(inside.len(), 2);
    }
}
