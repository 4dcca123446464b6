//! The advancing front and its state machine.
//!
//! Front edges separate the region still covered by triangles from the
//! region already converted (or from the outside). Each front edge carries a
//! state, the number of its ends whose adjacent front edge has been accepted
//! as a quad side, and lives in exactly one of three buckets keyed by that
//! state. Buckets keep insertion order, which is the final tie-break when
//! selecting the next edge to consume.

use super::element::ElementShape;
use super::index::{EdgeId, ElementId, NodeId};
use super::registry::Mesh;
use crate::error::invariant_violation;

/// Front edges partitioned by state (0, 1 or 2 committed sides).
#[derive(Debug, Clone, Default)]
pub struct FrontStates {
    buckets: [Vec<EdgeId>; 3],
}

impl FrontStates {
    /// Edges currently in the bucket for `state`, oldest first.
    pub fn bucket(&self, state: usize) -> &[EdgeId] {
        &self.buckets[state]
    }

    /// Total number of front edges.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Whether no front edges remain.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// The bucket holding `e`, if any.
    pub fn state_of(&self, e: EdgeId) -> Option<usize> {
        self.buckets.iter().position(|b| b.contains(&e))
    }

    /// Every front edge, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.buckets.iter().flatten().copied()
    }

    pub(crate) fn insert(&mut self, e: EdgeId, state: usize) {
        debug_assert!(self.state_of(e).is_none(), "edge {e} is already on the front");
        self.buckets[state].push(e);
    }

    /// Take `e` out of whichever bucket holds it, returning that bucket.
    pub(crate) fn remove(&mut self, e: EdgeId) -> Option<usize> {
        for (state, bucket) in self.buckets.iter_mut().enumerate() {
            if let Some(i) = bucket.iter().position(|&x| x == e) {
                // keep the remaining order intact
                bucket.remove(i);
                return Some(state);
            }
        }
        None
    }
}

/// The triangles swept around a node between a front edge and the next
/// front edge.
#[derive(Debug, Clone)]
pub struct Wedge {
    /// The front edge ending the sweep.
    pub neighbor: EdgeId,
    /// Sum of the swept triangles' interior angles at the node.
    pub angle: f64,
    /// Non-front edges crossed by the sweep, in order.
    pub interior_edges: Vec<EdgeId>,
    /// Swept triangles, in order.
    pub triangles: Vec<ElementId>,
}

impl Mesh {
    /// The state buckets.
    pub fn front(&self) -> &FrontStates {
        &self.front
    }

    /// Every front edge, bucket by bucket.
    pub fn front_edges(&self) -> Vec<EdgeId> {
        self.front.iter().collect()
    }

    /// Number of front edges.
    pub fn num_front_edges(&self) -> usize {
        self.front.len()
    }

    /// Front edges incident to `n`.
    pub fn front_edges_at(&self, n: NodeId) -> Vec<EdgeId> {
        self.node(n)
            .edges()
            .iter()
            .copied()
            .filter(|&e| self.edge(e).front)
            .collect()
    }

    /// The triangle behind a front edge, i.e. the side still to be meshed.
    pub fn front_triangle(&self, e: EdgeId) -> Option<ElementId> {
        self.edge(e)
            .elements
            .iter()
            .flatten()
            .copied()
            .find(|&el| self.element(el).is_triangle())
    }

    /// Put `e` on the front at `level` with no committed sides.
    pub fn promote_to_front(&mut self, e: EdgeId, level: usize) {
        self.front.remove(e);
        let edge = self.edge_mut(e);
        edge.clear_front_fields();
        edge.front = true;
        edge.level = level;
        self.front.insert(e, 0);
        log::trace!("promoted {e} to the front at level {level}");
    }

    /// Take `e` off the front and reset its front fields.
    pub fn demote_front(&mut self, e: EdgeId) {
        self.front.remove(e);
        self.edge_mut(e).clear_front_fields();
    }

    /// Update the side flags of `e` and move it to the matching bucket.
    ///
    /// The current bucket is located before anything changes. If `e` is not
    /// on the front the call fails and leaves the edge untouched. An edge
    /// whose state does not change keeps its place in its bucket.
    pub fn set_sides(&mut self, e: EdgeId, left: bool, right: bool) -> bool {
        let Some(old) = self.front.state_of(e) else {
            return false;
        };
        let new = left as usize + right as usize;
        if old != new {
            self.front.remove(e);
            self.front.insert(e, new);
        }
        let edge = self.edge_mut(e);
        edge.left_side = left;
        edge.right_side = right;
        true
    }

    /// Sweep the triangles around `n`, starting behind front edge `e`, until
    /// another front edge is reached.
    ///
    /// Returns `None` if `e` has no triangle behind it or the sweep runs into
    /// something other than a triangle before reaching the front.
    pub fn front_wedge(&self, e: EdgeId, n: NodeId) -> Option<Wedge> {
        if !self.edge(e).has_node(n) {
            invariant_violation(format!("front edge {e} is not incident to node {n}"));
        }
        let mut tri = self.front_triangle(e)?;
        let mut current = e;
        let mut wedge = Wedge {
            neighbor: e,
            angle: 0.0,
            interior_edges: Vec::new(),
            triangles: Vec::new(),
        };

        // one step per incident edge at most
        for _ in 0..self.node(n).edges().len() {
            let element = self.element(tri);
            wedge.angle += element.angle_at(n);
            wedge.triangles.push(tri);

            let next = element.neighbor_edge(n, current);
            if self.edge(next).front {
                wedge.neighbor = next;
                return Some(wedge);
            }
            wedge.interior_edges.push(next);

            tri = self.edge(next).other_element(tri)?;
            if !self.element(tri).is_triangle() {
                return None;
            }
            current = next;
        }
        None
    }

    /// Recompute the side flags of a front edge.
    ///
    /// At each end the triangles between `e` and the adjacent front edge are
    /// swept; the adjacent edge is accepted as a side when the swept angle is
    /// below `threshold`. Returns the new state, or `None` if `e` is not on
    /// the front.
    pub fn classify_state_of_front_edge(&mut self, e: EdgeId, threshold: f64) -> Option<usize> {
        if !self.edge(e).front || self.front.state_of(e).is_none() {
            return None;
        }
        let [l, r] = self.edge(e).nodes();
        let left = self.front_wedge(e, l);
        let right = self.front_wedge(e, r);

        let accepts = |w: &Option<Wedge>| {
            w.as_ref()
                .is_some_and(|w| w.neighbor != e && w.angle < threshold)
        };
        let (left_side, right_side) = (accepts(&left), accepts(&right));

        let edge = self.edge_mut(e);
        edge.left_front_neighbor = left.as_ref().map(|w| w.neighbor).filter(|&x| x != e);
        edge.right_front_neighbor = right.as_ref().map(|w| w.neighbor).filter(|&x| x != e);

        if !self.set_sides(e, left_side, right_side) {
            return None;
        }
        log::trace!(
            "classified {e}: left {:?} right {:?} -> state {}",
            left.map(|w| w.angle.to_degrees()),
            right.map(|w| w.angle.to_degrees()),
            self.edge(e).state()
        );
        Some(self.edge(e).state())
    }

    /// Choose the next front edge to consume.
    ///
    /// Buckets are searched from state 2 down to state 0; within a bucket
    /// the lowest level wins, then the shortest edge, then the oldest entry.
    /// Only selectable edges are considered. When the winner is not in the
    /// state-2 bucket and a selectable front neighbour is shorter by more
    /// than `transition_ratio`, the neighbour is returned instead.
    pub fn next_front(&self, transition_ratio: f64) -> Option<EdgeId> {
        for state in (0..3).rev() {
            let best = self
                .front
                .bucket(state)
                .iter()
                .copied()
                .filter(|&e| self.edge(e).selectable)
                .min_by(|&a, &b| {
                    let (ea, eb) = (self.edge(a), self.edge(b));
                    ea.level
                        .cmp(&eb.level)
                        .then(ea.length.total_cmp(&eb.length))
                });
            let Some(e) = best else {
                continue;
            };
            if state == 2 {
                return Some(e);
            }

            let edge = self.edge(e);
            let transition = [edge.left_front_neighbor, edge.right_front_neighbor]
                .into_iter()
                .flatten()
                .filter(|&nb| {
                    self.try_edge(nb).is_some_and(|n| {
                        n.front && n.selectable && n.length * transition_ratio < edge.length
                    })
                })
                .min_by(|&a, &b| self.edge(a).length.total_cmp(&self.edge(b).length));
            if let Some(nb) = transition {
                log::debug!("large transition at {e}, taking shorter neighbour {nb}");
                return Some(nb);
            }
            return Some(e);
        }
        None
    }

    /// Make every front edge selectable again.
    pub fn restore_selectable(&mut self) {
        let front: Vec<EdgeId> = self.front.iter().collect();
        for e in front {
            self.edge_mut(e).selectable = true;
        }
    }

    /// Exclude `e` from selection until [`Mesh::restore_selectable`].
    pub fn set_unselectable(&mut self, e: EdgeId) {
        self.edge_mut(e).selectable = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::builder::build_from_triangles;
    use std::f64::consts::FRAC_PI_4;

    const THRESHOLD: f64 = 3.0 * FRAC_PI_4;

    fn with_boundary_front(mesh: &mut Mesh) -> Vec<EdgeId> {
        let boundary: Vec<EdgeId> = mesh
            .edge_ids()
            .filter(|&e| mesh.edge(e).element_count() == 1)
            .collect();
        for &e in &boundary {
            mesh.promote_to_front(e, 0);
        }
        boundary
    }

    fn find_edge_at(mesh: &Mesh, a: (f64, f64), b: (f64, f64)) -> EdgeId {
        let node = |(x, y): (f64, f64)| {
            mesh.node_ids()
                .find(|&n| mesh.node(n).x() == x && mesh.node(n).y() == y)
                .unwrap()
        };
        mesh.find_edge(node(a), node(b)).unwrap()
    }

    #[test]
    fn test_promote_and_demote() {
        let mut mesh = build_from_triangles(&[[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]]).unwrap();
        let front = with_boundary_front(&mut mesh);
        assert_eq!(mesh.num_front_edges(), 3);
        assert_eq!(mesh.front().bucket(0).len(), 3);
        assert!(mesh.front_is_consistent());

        mesh.demote_front(front[1]);
        assert!(!mesh.edge(front[1]).is_front());
        assert_eq!(mesh.num_front_edges(), 2);
        assert!(mesh.front_is_consistent());
    }

    #[test]
    fn test_set_sides_migrates_bucket() {
        let mut mesh = build_from_triangles(&[[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]]).unwrap();
        let front = with_boundary_front(&mut mesh);
        let e = front[0];

        assert!(mesh.set_sides(e, true, false));
        assert_eq!(mesh.front().state_of(e), Some(1));
        assert!(mesh.set_sides(e, true, true));
        assert_eq!(mesh.front().state_of(e), Some(2));
        assert!(mesh.front_is_consistent());
    }

    #[test]
    fn test_set_sides_off_front_is_noop() {
        let mut mesh = build_from_triangles(&[
            [0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        ])
        .unwrap();
        with_boundary_front(&mut mesh);
        let diagonal = mesh.edge_ids().find(|&e| mesh.edge(e).is_interior()).unwrap();

        assert!(!mesh.set_sides(diagonal, true, true));
        assert!(!mesh.edge(diagonal).left_side());
        assert!(!mesh.edge(diagonal).right_side());
        assert_eq!(mesh.front().state_of(diagonal), None);
        assert!(mesh.front_is_consistent());
    }

    #[test]
    fn test_classify_outside_any_bucket_is_noop() {
        let mut mesh = build_from_triangles(&[
            [0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        ])
        .unwrap();
        with_boundary_front(&mut mesh);
        let e = find_edge_at(&mesh, (0.0, 0.0), (1.0, 0.0));
        // flagged as front but missing from every bucket
        mesh.front.remove(e);

        assert_eq!(mesh.classify_state_of_front_edge(e, THRESHOLD), None);
        let edge = mesh.edge(e);
        assert!(edge.left_front_neighbor().is_none());
        assert!(edge.right_front_neighbor().is_none());
        assert!(!edge.left_side());
        assert!(!edge.right_side());
    }

    #[test]
    fn test_square_front_edges_reach_state_two() {
        let mut mesh = build_from_triangles(&[
            [0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        ])
        .unwrap();
        let front = with_boundary_front(&mut mesh);
        for &e in &front {
            assert_eq!(mesh.classify_state_of_front_edge(e, THRESHOLD), Some(2));
        }
        assert_eq!(mesh.front().bucket(2).len(), 4);
        assert!(mesh.front_is_consistent());

        // the corner at (1, 0) sweeps both triangles
        let base = find_edge_at(&mesh, (0.0, 0.0), (1.0, 0.0));
        let corner = mesh
            .edge(base)
            .nodes()
            .into_iter()
            .find(|&n| mesh.node(n).x() == 1.0)
            .unwrap();
        let wedge = mesh.front_wedge(base, corner).unwrap();
        assert_eq!(wedge.triangles.len(), 2);
        assert_eq!(wedge.interior_edges.len(), 1);
        assert!((wedge.angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_flat_fan_edge_is_state_zero() {
        // three triangles fanned from an apex over a straight bottom row
        let mut mesh = build_from_triangles(&[
            [0.0, 0.0, 1.0, 0.0, 1.5, 1.0],
            [1.0, 0.0, 2.0, 0.0, 1.5, 1.0],
            [2.0, 0.0, 3.0, 0.0, 1.5, 1.0],
        ])
        .unwrap();
        with_boundary_front(&mut mesh);
        let middle = find_edge_at(&mesh, (1.0, 0.0), (2.0, 0.0));

        // both ends sweep two triangles adding up to a straight angle
        assert_eq!(mesh.classify_state_of_front_edge(middle, THRESHOLD), Some(0));
        let edge = mesh.edge(middle);
        assert!(!edge.left_side());
        assert!(!edge.right_side());
        assert!(edge.left_front_neighbor().is_some());
        assert!(edge.right_front_neighbor().is_some());
        assert!(mesh.front().bucket(0).contains(&middle));
    }

    #[test]
    fn test_next_front_prefers_state_two() {
        let mut mesh = build_from_triangles(&[
            [0.0, 0.0, 1.0, 0.0, 1.5, 1.0],
            [1.0, 0.0, 2.0, 0.0, 1.5, 1.0],
            [2.0, 0.0, 3.0, 0.0, 1.5, 1.0],
        ])
        .unwrap();
        with_boundary_front(&mut mesh);
        let s0 = find_edge_at(&mesh, (0.0, 0.0), (1.0, 0.0));
        let s1 = find_edge_at(&mesh, (1.0, 0.0), (2.0, 0.0));
        let s2 = find_edge_at(&mesh, (3.0, 0.0), (1.5, 1.0));

        // the state-2 edge is the longest and sits on the highest level
        mesh.edge_mut(s0).level = 0;
        mesh.edge_mut(s1).level = 1;
        mesh.edge_mut(s2).level = 5;
        assert!(mesh.set_sides(s1, true, false));
        assert!(mesh.set_sides(s2, true, true));

        assert_eq!(mesh.next_front(2.5), Some(s2));

        mesh.set_unselectable(s2);
        assert_eq!(mesh.next_front(2.5), Some(s1));
        mesh.restore_selectable();
        assert_eq!(mesh.next_front(2.5), Some(s2));
    }

    #[test]
    fn test_next_front_ties_break_by_level_then_length() {
        let mut mesh = build_from_triangles(&[
            [0.0, 0.0, 1.0, 0.0, 1.5, 1.0],
            [1.0, 0.0, 2.0, 0.0, 1.5, 1.0],
            [2.0, 0.0, 3.0, 0.0, 1.5, 1.0],
        ])
        .unwrap();
        let front = with_boundary_front(&mut mesh);
        // all in bucket 0 at level 0: the shortest edge wins
        let shortest = front
            .iter()
            .copied()
            .min_by(|&a, &b| mesh.edge(a).length().total_cmp(&mesh.edge(b).length()))
            .unwrap();
        assert_eq!(mesh.next_front(1e9), Some(shortest));

        // raising its level hands the choice to another edge
        mesh.edge_mut(shortest).level = 1;
        let chosen = mesh.next_front(1e9).unwrap();
        assert_ne!(chosen, shortest);
        assert_eq!(mesh.edge(chosen).level(), 0);
    }

    #[test]
    fn test_next_front_large_transition() {
        // a long bottom edge next to a short neighbour
        let mut mesh = build_from_triangles(&[
            [0.0, 0.0, 10.0, 0.0, 10.0, 1.0],
            [10.0, 0.0, 10.5, 0.0, 10.0, 1.0],
        ])
        .unwrap();
        let front = with_boundary_front(&mut mesh);
        let long = find_edge_at(&mesh, (0.0, 0.0), (10.0, 0.0));
        let short = find_edge_at(&mesh, (10.0, 0.0), (10.5, 0.0));
        for &e in &front {
            mesh.set_unselectable(e);
        }
        mesh.edge_mut(long).selectable = true;
        mesh.edge_mut(short).selectable = true;
        mesh.edge_mut(short).level = 1;
        mesh.edge_mut(long).right_front_neighbor = Some(short);

        // long wins on level, but the neighbour is more than 2.5x shorter
        assert_eq!(mesh.next_front(2.5), Some(short));
        assert_eq!(mesh.next_front(100.0), Some(long));
    }
}
