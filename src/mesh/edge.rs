//! Mesh edges and their front-classification state.
//!
//! An edge joins two nodes stored in canonical order: the node with the
//! smaller x coordinate is `left`; on a tie in x, the node with the larger y is
//! `left`. The order does not depend on construction order and is restored
//! whenever a node moves.
//!
//! While an edge is part of the advancing front it also carries a wavefront
//! level, the front edges adjacent at each end, and one flag per end saying
//! whether that neighbour has been committed as a side of a future quad. The
//! number of set flags is the edge's *state* (0, 1 or 2).

use nalgebra::Point2;

use super::index::{EdgeId, ElementId, NodeId};
use crate::error::invariant_violation;

/// Which end of an edge, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum End {
    /// The canonical left node.
    Left,
    /// The canonical right node.
    Right,
}

/// A mesh edge.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    pub(crate) length: f64,
    pub(crate) elements: [Option<ElementId>; 2],

    pub(crate) front: bool,
    pub(crate) level: usize,
    pub(crate) left_front_neighbor: Option<EdgeId>,
    pub(crate) right_front_neighbor: Option<EdgeId>,
    pub(crate) left_side: bool,
    pub(crate) right_side: bool,
    pub(crate) selectable: bool,
}

/// Order two endpoints canonically: smaller x first, larger y on a tie.
pub fn canonical_order(
    a: (NodeId, &Point2<f64>),
    b: (NodeId, &Point2<f64>),
) -> (NodeId, NodeId) {
    let (na, pa) = a;
    let (nb, pb) = b;
    if pa.x < pb.x || (pa.x == pb.x && pa.y > pb.y) {
        (na, nb)
    } else {
        (nb, na)
    }
}

impl Edge {
    /// Create an edge between two positioned nodes.
    pub fn new(a: (NodeId, &Point2<f64>), b: (NodeId, &Point2<f64>)) -> Self {
        if a.0 == b.0 {
            invariant_violation(format!("edge endpoints must differ, got {} twice", a.0));
        }
        let (left, right) = canonical_order(a, b);
        Self {
            left,
            right,
            length: (a.1 - b.1).norm(),
            elements: [None, None],
            front: false,
            level: 0,
            left_front_neighbor: None,
            right_front_neighbor: None,
            left_side: false,
            right_side: false,
            selectable: true,
        }
    }

    /// The canonical left node.
    #[inline]
    pub fn left(&self) -> NodeId {
        self.left
    }

    /// The canonical right node.
    #[inline]
    pub fn right(&self) -> NodeId {
        self.right
    }

    /// Both endpoints, left first.
    #[inline]
    pub fn nodes(&self) -> [NodeId; 2] {
        [self.left, self.right]
    }

    /// Cached length.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Whether `n` is an endpoint.
    #[inline]
    pub fn has_node(&self, n: NodeId) -> bool {
        self.left == n || self.right == n
    }

    /// The endpoint that is not `n`.
    ///
    /// # Panics
    /// Panics if `n` is not an endpoint.
    pub fn other_node(&self, n: NodeId) -> NodeId {
        if n == self.left {
            self.right
        } else if n == self.right {
            self.left
        } else {
            invariant_violation(format!("node {n} is not an endpoint of edge ({}, {})", self.left, self.right))
        }
    }

    /// Which end `n` is.
    ///
    /// # Panics
    /// Panics if `n` is not an endpoint.
    pub fn end_of(&self, n: NodeId) -> End {
        if n == self.left {
            End::Left
        } else if n == self.right {
            End::Right
        } else {
            invariant_violation(format!("node {n} is not an endpoint of edge ({}, {})", self.left, self.right))
        }
    }

    /// The node shared with `other`, if any.
    pub fn common_node(&self, other: &Edge) -> Option<NodeId> {
        if other.has_node(self.left) {
            Some(self.left)
        } else if other.has_node(self.right) {
            Some(self.right)
        } else {
            None
        }
    }

    /// Element slots.
    #[inline]
    pub fn elements(&self) -> [Option<ElementId>; 2] {
        self.elements
    }

    /// Number of adjacent elements (0, 1 or 2).
    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_some()).count()
    }

    /// Whether two elements share this edge.
    #[inline]
    pub fn is_interior(&self) -> bool {
        self.element_count() == 2
    }

    /// Whether `el` occupies one of the element slots.
    #[inline]
    pub fn has_element(&self, el: ElementId) -> bool {
        self.elements.contains(&Some(el))
    }

    /// The element on the other side from `el`.
    ///
    /// # Panics
    /// Panics if `el` is not adjacent to this edge.
    pub fn other_element(&self, el: ElementId) -> Option<ElementId> {
        match self.elements {
            [Some(a), b] if a == el => b,
            [a, Some(b)] if b == el => a,
            _ => invariant_violation(format!("element {el} is not adjacent to edge ({}, {})", self.left, self.right)),
        }
    }

    /// Whether the edge is on the advancing front.
    #[inline]
    pub fn is_front(&self) -> bool {
        self.front
    }

    /// Wavefront level (distance from the original boundary, in rows).
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Committed-side flag of the left end.
    #[inline]
    pub fn left_side(&self) -> bool {
        self.left_side
    }

    /// Committed-side flag of the right end.
    #[inline]
    pub fn right_side(&self) -> bool {
        self.right_side
    }

    /// Committed-side flag at node `n`.
    pub fn side_at(&self, n: NodeId) -> bool {
        match self.end_of(n) {
            End::Left => self.left_side,
            End::Right => self.right_side,
        }
    }

    /// Front neighbour at node `n`, as of the last classification.
    pub fn front_neighbor_at(&self, n: NodeId) -> Option<EdgeId> {
        match self.end_of(n) {
            End::Left => self.left_front_neighbor,
            End::Right => self.right_front_neighbor,
        }
    }

    /// Left front neighbour.
    #[inline]
    pub fn left_front_neighbor(&self) -> Option<EdgeId> {
        self.left_front_neighbor
    }

    /// Right front neighbour.
    #[inline]
    pub fn right_front_neighbor(&self) -> Option<EdgeId> {
        self.right_front_neighbor
    }

    /// Number of committed sides: 0, 1 or 2.
    #[inline]
    pub fn state(&self) -> usize {
        self.left_side as usize + self.right_side as usize
    }

    /// Whether the engine may pick this edge as the next base.
    #[inline]
    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub(crate) fn connect_element(&mut self, el: ElementId) {
        if self.has_element(el) {
            invariant_violation(format!("element {el} is already connected to edge ({}, {})", self.left, self.right));
        }
        match self.elements {
            [None, _] => self.elements[0] = Some(el),
            [_, None] => self.elements[1] = Some(el),
            _ => invariant_violation(format!(
                "edge ({}, {}) would be shared by a third element {el}",
                self.left, self.right
            )),
        }
    }

    pub(crate) fn disconnect_element(&mut self, el: ElementId) {
        if self.elements[0] == Some(el) {
            // keep the remaining element in the first slot
            self.elements[0] = self.elements[1].take();
        } else if self.elements[1] == Some(el) {
            self.elements[1] = None;
        } else {
            invariant_violation(format!(
                "element {el} was never connected to edge ({}, {})",
                self.left, self.right
            ));
        }
    }

    /// Refresh the cached length and canonical order after a node moved.
    ///
    /// Flags and front neighbours stay with the node they belong to when the
    /// order flips.
    pub(crate) fn refresh(&mut self, left_pos: &Point2<f64>, right_pos: &Point2<f64>) {
        self.length = (left_pos - right_pos).norm();
        let (l, _) = canonical_order((self.left, left_pos), (self.right, right_pos));
        if l != self.left {
            std::mem::swap(&mut self.left, &mut self.right);
            std::mem::swap(&mut self.left_side, &mut self.right_side);
            std::mem::swap(&mut self.left_front_neighbor, &mut self.right_front_neighbor);
        }
    }

    pub(crate) fn clear_front_fields(&mut self) {
        self.front = false;
        self.level = 0;
        self.left_front_neighbor = None;
        self.right_front_neighbor = None;
        self.left_side = false;
        self.right_side = false;
        self.selectable = true;
    }
}
