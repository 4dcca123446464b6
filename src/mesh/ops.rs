//! Local topological operations: diagonal swap and edge split.

use nalgebra::Point2;

use super::index::{EdgeId, ElementId, NodeId};
use super::registry::Mesh;
use crate::error::invariant_violation;
use crate::geom::{orient, Segment};

/// The two-triangle patch around an interior edge.
struct Diamond {
    /// Endpoints of the shared edge.
    p: NodeId,
    q: NodeId,
    /// Opposite corners of the first and second triangle.
    r0: NodeId,
    r1: NodeId,
    t0: ElementId,
    t1: ElementId,
}

impl Mesh {
    fn diamond(&self, e: EdgeId) -> Option<Diamond> {
        let edge = self.edge(e);
        let [Some(t0), Some(t1)] = edge.elements() else {
            return None;
        };
        let r0 = self.element(t0).opposite_node(self, e)?;
        let r1 = self.element(t1).opposite_node(self, e)?;
        if r0 == r1 {
            return None;
        }
        Some(Diamond {
            p: edge.left(),
            q: edge.right(),
            r0,
            r1,
            t0,
            t1,
        })
    }

    /// Whether `e` can be flipped to the other diagonal.
    ///
    /// The edge must be off the front and shared by two triangles whose union
    /// is strictly convex, and the other diagonal must not already exist.
    pub fn can_swap(&self, e: EdgeId) -> bool {
        if self.edge(e).is_front() {
            return false;
        }
        let Some(d) = self.diamond(e) else {
            return false;
        };
        if self.find_edge(d.r0, d.r1).is_some() {
            return false;
        }
        let pos = |n: NodeId| *self.node(n).position();
        Segment::new(pos(d.p), pos(d.q)).crosses(&Segment::new(pos(d.r0), pos(d.r1)))
    }

    /// Replace `e` by the other diagonal of its two triangles.
    ///
    /// The second adjacent triangle is detached before the first, then two
    /// new triangles are built on the new diagonal. The four outer edges keep
    /// their handles and front data. Returns the new diagonal.
    ///
    /// # Panics
    /// Panics if `e` is not shared by two triangles.
    pub fn swap_to_and_set_elements_for(&mut self, e: EdgeId) -> EdgeId {
        let Some(d) = self.diamond(e) else {
            invariant_violation(format!("edge {e} is not shared by two triangles"));
        };
        let outer = |mesh: &Mesh, a: NodeId, b: NodeId| match mesh.find_edge(a, b) {
            Some(x) => x,
            None => invariant_violation(format!("missing outer edge {a}-{b} around {e}")),
        };
        let (pr0, qr0) = (outer(self, d.p, d.r0), outer(self, d.q, d.r0));
        let (pr1, qr1) = (outer(self, d.p, d.r1), outer(self, d.q, d.r1));

        self.remove_element(d.t1);
        self.remove_element(d.t0);
        self.remove_edge(e);

        let diagonal = self.add_edge(d.r0, d.r1);
        self.add_triangle(diagonal, pr0, pr1);
        self.add_triangle(diagonal, qr0, qr1);
        log::trace!("swapped {e} for {diagonal}");
        diagonal
    }

    /// Split interior edge `e` at `point`, turning its two triangles into four.
    ///
    /// Returns the new node, or `None` if `e` is not shared by two triangles
    /// or the point would invert one of the new triangles.
    pub fn split_triangles_at(&mut self, e: EdgeId, point: Point2<f64>) -> Option<NodeId> {
        let d = self.diamond(e)?;
        {
            // every child triangle must keep its orientation
            let pos = |n: NodeId| *self.node(n).position();
            let side = |a: NodeId, b: NodeId, r: NodeId| {
                orient(&pos(a), &pos(b), &pos(r)).signum()
            };
            let at = |a: NodeId, r: NodeId, sign: f64| {
                orient(&pos(a), &point, &pos(r)).signum() == sign
            };
            let (s0, s1) = (side(d.p, d.q, d.r0), side(d.p, d.q, d.r1));
            if s0 == 0.0 || s1 == 0.0 {
                return None;
            }
            // (m, q, r) winds like (q, m, r) reversed
            let ok = at(d.p, d.r0, s0) && at(d.p, d.r1, s1) && at(d.q, d.r0, -s0) && at(d.q, d.r1, -s1);
            if !ok {
                return None;
            }
        }

        let outer = |mesh: &Mesh, a: NodeId, b: NodeId| match mesh.find_edge(a, b) {
            Some(x) => x,
            None => invariant_violation(format!("missing outer edge {a}-{b} around {e}")),
        };
        let (pr0, qr0) = (outer(self, d.p, d.r0), outer(self, d.q, d.r0));
        let (pr1, qr1) = (outer(self, d.p, d.r1), outer(self, d.q, d.r1));

        self.remove_element(d.t1);
        self.remove_element(d.t0);
        self.remove_edge(e);

        let m = self.add_node(point);
        let pm = self.add_edge(d.p, m);
        let mq = self.add_edge(m, d.q);
        let mr0 = self.add_edge(m, d.r0);
        let mr1 = self.add_edge(m, d.r1);
        self.add_triangle(pm, mr0, pr0);
        self.add_triangle(mq, qr0, mr0);
        self.add_triangle(pm, mr1, pr1);
        self.add_triangle(mq, qr1, mr1);
        log::trace!("split {e} at new node {m}");
        Some(m)
    }

    /// Split interior edge `e` at its midpoint.
    pub fn split_triangles_at_midpoint(&mut self, e: EdgeId) -> Option<NodeId> {
        let [l, r] = self.edge(e).nodes();
        let mid = Segment::new(*self.node(l).position(), *self.node(r).position()).midpoint();
        self.split_triangles_at(e, mid)
    }
}
