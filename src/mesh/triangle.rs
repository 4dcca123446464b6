//! Triangular elements.

use super::element::{triangle_distortion, ElementShape};
use super::index::{EdgeId, NodeId};
use super::registry::Mesh;
use crate::error::invariant_violation;
use crate::geom::orient;

/// A triangle bounded by three edges.
#[derive(Debug, Clone)]
pub struct Triangle {
    pub(crate) edges: [EdgeId; 3],
    pub(crate) nodes: [NodeId; 3],
    pub(crate) angles: [f64; 3],
}

impl Triangle {
    /// Assemble a triangle from three edges forming a closed loop.
    ///
    /// The corners are arranged counter-clockwise. The first node is the
    /// corner shared by the first and last edge as given, unless that order
    /// runs clockwise, in which case the loop is reversed and starts at the
    /// other end of the first edge.
    ///
    /// # Panics
    /// Panics if the edges do not form a closed loop.
    pub fn new(mesh: &Mesh, e0: EdgeId, e1: EdgeId, e2: EdgeId) -> Self {
        let common = |a: EdgeId, b: EdgeId| -> NodeId {
            match mesh.edge(a).common_node(mesh.edge(b)) {
                Some(n) => n,
                None => invariant_violation(format!("edges {a} and {b} of a triangle share no node")),
            }
        };
        let p = common(e0, e2);
        let q = common(e0, e1);
        let r = common(e1, e2);
        if p == q || q == r || r == p {
            invariant_violation(format!("edges {e0}, {e1}, {e2} do not form a triangle"));
        }

        let (edges, nodes) = if orient(
            mesh.node(p).position(),
            mesh.node(q).position(),
            mesh.node(r).position(),
        ) < 0.0
        {
            ([e0, e2, e1], [q, p, r])
        } else {
            ([e0, e1, e2], [p, q, r])
        };

        let mut tri = Self {
            edges,
            nodes,
            angles: [0.0; 3],
        };
        let angles = tri.compute_angles(mesh);
        tri.angles.copy_from_slice(&angles);
        tri
    }

    /// The edge opposite corner `n`.
    pub fn opposite_edge(&self, n: NodeId) -> EdgeId {
        match self.nodes.iter().position(|&x| x == n) {
            // edge i+1 joins the two corners after node i
            Some(i) => self.edges[(i + 1) % 3],
            None => invariant_violation(format!("node {n} is not a corner of the triangle")),
        }
    }
}

impl ElementShape for Triangle {
    fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    fn angles(&self) -> &[f64] {
        &self.angles
    }

    fn inverted(&self, mesh: &Mesh) -> bool {
        self.signed_area(mesh) < 0.0
    }

    fn distortion(&self, mesh: &Mesh) -> f64 {
        let [a, b, c] = self.nodes.map(|n| *mesh.node(n).position());
        triangle_distortion(&a, &b, &c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Element;
    use nalgebra::Point2;
    use std::f64::consts::PI;

    fn mesh_with_loop(pts: [(f64, f64); 3]) -> (Mesh, [EdgeId; 3], [NodeId; 3]) {
        let mut mesh = Mesh::new();
        let n = pts.map(|(x, y)| mesh.add_node(Point2::new(x, y)));
        let e = [
            mesh.add_edge(n[0], n[1]),
            mesh.add_edge(n[1], n[2]),
            mesh.add_edge(n[2], n[0]),
        ];
        (mesh, e, n)
    }

    #[test]
    fn test_winding_is_counter_clockwise() {
        // given clockwise
        let (mesh, e, n) = mesh_with_loop([(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)]);
        let tri = Triangle::new(&mesh, e[0], e[1], e[2]);
        assert!(tri.signed_area(&mesh) > 0.0);
        assert!(!tri.inverted(&mesh));
        assert_eq!(tri.first_node(), n[1]);

        // given counter-clockwise
        let (mesh, e, n) = mesh_with_loop([(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        let tri = Triangle::new(&mesh, e[0], e[1], e[2]);
        assert!(tri.signed_area(&mesh) > 0.0);
        assert_eq!(tri.first_node(), n[0]);
    }

    #[test]
    fn test_edges_align_with_nodes() {
        let (mesh, e, _) = mesh_with_loop([(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)]);
        let tri = Triangle::new(&mesh, e[2], e[0], e[1]);
        for i in 0..3 {
            let edge = mesh.edge(tri.edges()[i]);
            assert!(edge.has_node(tri.nodes()[i]));
            assert!(edge.has_node(tri.nodes()[(i + 1) % 3]));
        }
        assert_eq!(tri.opposite_edge(tri.nodes()[0]), tri.edges()[1]);
    }

    #[test]
    fn test_angles_sum_to_pi() {
        let (mesh, e, n) = mesh_with_loop([(0.0, 0.0), (3.0, 0.0), (0.0, 4.0)]);
        let tri = Triangle::new(&mesh, e[0], e[1], e[2]);
        let sum: f64 = tri.angles().iter().sum();
        assert!((sum - PI).abs() < 1e-12);
        assert!((tri.angle_at(n[0]) - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_inversion_battery() {
        let mut mesh = Mesh::new();
        let a = mesh.add_node(Point2::new(0.0, 0.0));
        let b = mesh.add_node(Point2::new(1.0, 0.0));
        let c = mesh.add_node(Point2::new(0.0, 1.0));
        let ab = mesh.add_edge(a, b);
        let bc = mesh.add_edge(b, c);
        let ca = mesh.add_edge(c, a);
        let t = mesh.add_triangle(ab, bc, ca);

        let check = |mesh: &Mesh| {
            let el: &Element = mesh.element(t);
            let area = el.signed_area(mesh);
            assert_eq!(el.inverted(mesh), area < 0.0);
            assert_eq!(el.zero_area(mesh), area.abs() < 1e-12);
            assert_eq!(el.distortion(mesh) < 0.0, area < 0.0);
        };

        check(&mesh);
        // collapse c onto the base line
        mesh.set_position(c, Point2::new(0.5, 0.0));
        check(&mesh);
        assert!(mesh.element(t).zero_area(&mesh));
        // push c through the base
        mesh.set_position(c, Point2::new(0.5, -1.0));
        check(&mesh);
        assert!(mesh.element(t).inverted(&mesh));
        // and back
        mesh.set_position(c, Point2::new(0.2, 2.0));
        check(&mesh);
        assert!(!mesh.element(t).is_invalid(&mesh));
    }
}
