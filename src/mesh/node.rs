//! Mesh nodes (vertices).

use std::f64::consts::TAU;

use nalgebra::Point2;

use super::element::ElementShape;
use super::index::{EdgeId, NodeId};
use super::registry::Mesh;
use crate::error::invariant_violation;
use crate::geom::points_coincide;

/// A vertex of the planar mesh.
#[derive(Debug, Clone)]
pub struct Node {
    /// Position in the plane.
    pub(crate) position: Point2<f64>,

    /// Every edge that names this node as an endpoint.
    pub(crate) edges: Vec<EdgeId>,

    /// Nodes of the original boundary never move.
    pub(crate) fixed: bool,

    /// Valence pattern cache, cleared whenever the neighbourhood changes.
    pub(crate) pattern: Option<Vec<u8>>,
}

impl Node {
    /// Create a new, unconnected node.
    pub fn new(position: Point2<f64>) -> Self {
        Self {
            position,
            edges: Vec::new(),
            fixed: false,
            pattern: None,
        }
    }

    /// Create a new node from coordinates.
    pub fn from_coords(x: f64, y: f64) -> Self {
        Self::new(Point2::new(x, y))
    }

    /// The x coordinate.
    #[inline]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// The y coordinate.
    #[inline]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// The position.
    #[inline]
    pub fn position(&self) -> &Point2<f64> {
        &self.position
    }

    /// Incident edges, in insertion order.
    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Whether the node belongs to the original boundary.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// The last computed valence pattern, if still valid.
    pub fn cached_pattern(&self) -> Option<&[u8]> {
        self.pattern.as_deref()
    }

    /// Coordinate equality within 1e-12.
    pub fn equals(&self, other: &Node) -> bool {
        points_coincide(&self.position, &other.position)
    }

    pub(crate) fn attach_edge(&mut self, e: EdgeId) {
        debug_assert!(!self.edges.contains(&e));
        self.edges.push(e);
        self.pattern = None;
    }

    pub(crate) fn detach_edge(&mut self, e: EdgeId) {
        match self.edges.iter().position(|&x| x == e) {
            Some(i) => {
                self.edges.remove(i);
                self.pattern = None;
            }
            None => invariant_violation(format!("edge {e} is not in the incident list of its node")),
        }
    }
}

impl Mesh {
    /// Incident edges of a node in counter-clockwise order.
    ///
    /// Nodes touching the boundary (or the front) start at the boundary edge
    /// whose counter-clockwise sector is covered by an element, so the walk
    /// sweeps the meshed side first. Interior nodes start at the edge with the
    /// smallest polar angle.
    ///
    /// # Panics
    /// Panics if the node has no incident edges.
    pub fn ordered_edges(&self, n: NodeId) -> Vec<EdgeId> {
        let node = self.node(n);
        if node.edges.is_empty() {
            invariant_violation(format!("cannot order the edges of isolated node {n}"));
        }

        let p = node.position;
        let mut entries: Vec<(f64, EdgeId)> = node
            .edges
            .iter()
            .map(|&e| {
                let q = self.node(self.edge(e).other_node(n)).position;
                let mut angle = (q.y - p.y).atan2(q.x - p.x);
                if angle < 0.0 {
                    angle += TAU;
                }
                (angle, e)
            })
            .collect();
        entries.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let len = entries.len();
        let sector = |i: usize| {
            let (a0, _) = entries[i];
            let (a1, _) = entries[(i + 1) % len];
            let s = a1 - a0;
            if s <= 0.0 {
                s + TAU
            } else {
                s
            }
        };

        let start = (0..len)
            .find(|&i| {
                let e = entries[i].1;
                let next = entries[(i + 1) % len].1;
                !self.edge(e).is_interior() && self.sector_is_covered(n, e, next, sector(i))
            })
            .or_else(|| (0..len).find(|&i| !self.edge(entries[i].1).is_interior()))
            .unwrap_or(0);

        entries.rotate_left(start);
        entries.into_iter().map(|(_, e)| e).collect()
    }

    /// Neighbouring nodes in the same cyclic order as [`Mesh::ordered_edges`].
    pub fn ordered_neighbors(&self, n: NodeId) -> Vec<NodeId> {
        self.ordered_edges(n)
            .into_iter()
            .map(|e| self.edge(e).other_node(n))
            .collect()
    }

    /// Whether any incident edge has fewer than two adjacent elements.
    pub fn is_boundary_node(&self, n: NodeId) -> bool {
        self.node(n)
            .edges
            .iter()
            .any(|&e| !self.edge(e).is_interior())
    }

    /// Convexity test for the sector between two consecutive edges around `n`.
    ///
    /// The sector is covered when the element shared by both edges has the
    /// same interior angle at `n` as the counter-clockwise sweep between them.
    /// An element lying on the other side (the sweep is its exterior) fails.
    fn sector_is_covered(&self, n: NodeId, e: EdgeId, next: EdgeId, sweep: f64) -> bool {
        let Some(el) = self.shared_element(e, next) else {
            return false;
        };
        let angle = self.element(el).angle_at(n);
        (angle - sweep).abs() < 1e-6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::builder::build_from_triangles;

    #[test]
    fn test_node_creation() {
        let n = Node::from_coords(1.0, 2.0);
        assert_eq!(n.x(), 1.0);
        assert_eq!(n.y(), 2.0);
        assert!(n.edges().is_empty());
        assert!(!n.is_fixed());
    }

    #[test]
    fn test_coordinate_equality_tolerance() {
        let a = Node::from_coords(0.5, 0.5);
        assert!(a.equals(&Node::from_coords(0.5 + 5e-13, 0.5)));
        assert!(!a.equals(&Node::from_coords(0.5 + 1e-6, 0.5)));
    }

    #[test]
    fn test_ordered_edges_interior_node() {
        // Four triangles fanned around the centre of a square.
        let mesh = build_from_triangles(&[
            [0.0, 0.0, 2.0, 0.0, 1.0, 1.0],
            [2.0, 0.0, 2.0, 2.0, 1.0, 1.0],
            [2.0, 2.0, 0.0, 2.0, 1.0, 1.0],
            [0.0, 2.0, 0.0, 0.0, 1.0, 1.0],
        ])
        .unwrap();
        let centre = mesh
            .node_ids()
            .find(|&n| mesh.node(n).x() == 1.0 && mesh.node(n).y() == 1.0)
            .unwrap();

        let neighbors = mesh.ordered_neighbors(centre);
        assert_eq!(neighbors.len(), 4);
        // polar angles 45°, 135°, 225°, 315° in that order
        let xs: Vec<(f64, f64)> = neighbors
            .iter()
            .map(|&n| (mesh.node(n).x(), mesh.node(n).y()))
            .collect();
        assert_eq!(xs, vec![(2.0, 2.0), (0.0, 2.0), (0.0, 0.0), (2.0, 0.0)]);
    }

    #[test]
    fn test_ordered_edges_boundary_node_starts_on_boundary() {
        let mesh = build_from_triangles(&[
            [0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        ])
        .unwrap();
        let corner = mesh
            .node_ids()
            .find(|&n| mesh.node(n).x() == 1.0 && mesh.node(n).y() == 0.0)
            .unwrap();

        let ordered = mesh.ordered_edges(corner);
        assert_eq!(ordered.len(), 3);
        // The walk starts on a boundary edge and ends on the other one.
        assert!(!mesh.edge(ordered[0]).is_interior());
        assert!(mesh.edge(ordered[1]).is_interior());
        assert!(!mesh.edge(ordered[2]).is_interior());

        // The first sector is covered by an element, i.e. the interior lies
        // counter-clockwise of the start edge.
        let first = mesh.node(mesh.edge(ordered[0]).other_node(corner)).position;
        assert_eq!((first.x, first.y), (1.0, 1.0));
    }
}
