//! Building one quad on a front edge.
//!
//! Given a base edge on the front, the two sides are either the committed
//! front neighbours or interior edges picked close to the bisector of the
//! triangle wedge at each end (possibly after one diagonal swap). The top
//! edge joining the two far corners is recovered by swapping the diagonals
//! it crosses. The candidate is then validated; on failure every swap made
//! on its behalf is undone in reverse order and nothing else has changed.
//! A failed attempt with committed sides is retried with interior sides.

use std::collections::HashSet;

use nalgebra::Point2;

use super::local_smooth::smooth_quad_corners;
use super::options::QMorphOptions;
use crate::error::invariant_violation;
use crate::geom::{
    angle_between, cross, orient, polygon_signed_area, rotate, Ray, Segment, COINCIDENCE_TOLERANCE,
};
use crate::mesh::{EdgeId, ElementId, ElementShape, Mesh, NodeId, Quad};

/// What a successful attempt changed.
#[derive(Debug, Clone)]
pub(crate) struct Built {
    pub quad: ElementId,
    /// Edges that joined the front, all one level above the base.
    pub promoted: Vec<EdgeId>,
    /// Edges that left the front.
    pub retired: Vec<EdgeId>,
    /// Diagonal swaps kept.
    pub swaps: usize,
    /// Triangles absorbed into the quad.
    pub absorbed: usize,
}

/// Diagonal swaps made during one attempt, kept as the node pairs of the
/// diagonals they created.
#[derive(Debug, Default)]
pub(crate) struct SwapJournal {
    created: Vec<(NodeId, NodeId)>,
}

impl SwapJournal {
    /// Swap `e` and remember the new diagonal.
    fn swap(&mut self, mesh: &mut Mesh, e: EdgeId) -> EdgeId {
        let diagonal = mesh.swap_to_and_set_elements_for(e);
        self.record(mesh, diagonal);
        diagonal
    }

    fn record(&mut self, mesh: &Mesh, diagonal: EdgeId) {
        let [l, r] = mesh.edge(diagonal).nodes();
        self.created.push((l, r));
    }

    pub fn len(&self) -> usize {
        self.created.len()
    }

    /// Undo every swap, newest first.
    pub fn rollback(self, mesh: &mut Mesh) {
        for (l, r) in self.created.into_iter().rev() {
            let Some(e) = mesh.find_edge(l, r) else {
                invariant_violation(format!("swapped diagonal {l}-{r} disappeared before rollback"));
            };
            mesh.swap_to_and_set_elements_for(e);
        }
    }
}

fn pos(mesh: &Mesh, n: NodeId) -> Point2<f64> {
    *mesh.node(n).position()
}

fn segment(mesh: &Mesh, e: EdgeId) -> Segment {
    let [l, r] = mesh.edge(e).nodes();
    Segment::new(pos(mesh, l), pos(mesh, r))
}

/// Base ends at which the committed front neighbour is given up in favour
/// of an interior side edge.
type Fresh = Vec<NodeId>;

/// Try to build a quad on front edge `base`.
///
/// Committed sides are reused first. If that fails, each committed side is
/// replaced by an interior edge in turn, then both. Candidates that would
/// leave a neighbouring triangle with no triangle to pair with are passed
/// over as long as another plan works.
///
/// Returns `None`, with the mesh as it was, when no valid quad can be formed.
pub(crate) fn make_quad(mesh: &mut Mesh, options: &QMorphOptions, base: EdgeId) -> Option<Built> {
    if !mesh.edge(base).is_front() {
        return None;
    }
    let edge = mesh.edge(base);
    let committed: Vec<NodeId> = edge
        .nodes()
        .into_iter()
        .filter(|&n| edge.side_at(n))
        .collect();

    let mut plans: Vec<Fresh> = vec![Vec::new()];
    plans.extend(committed.iter().map(|&n| vec![n]));
    if committed.len() == 2 {
        plans.push(committed);
    }

    for allow_stranding in [false, true] {
        for fresh in &plans {
            let mut journal = SwapJournal::default();
            if let Some(mut built) =
                attempt(mesh, options, base, fresh, allow_stranding, &mut journal)
            {
                built.swaps = journal.len();
                return Some(built);
            }
            if journal.len() > 0 {
                log::trace!("rolling back {} swaps for {base}", journal.len());
            }
            journal.rollback(mesh);
        }
    }
    None
}

fn attempt(
    mesh: &mut Mesh,
    options: &QMorphOptions,
    base: EdgeId,
    fresh: &[NodeId],
    allow_stranding: bool,
    journal: &mut SwapJournal,
) -> Option<Built> {
    if !mesh.edge(base).is_front() {
        return None;
    }
    let (a, b) = oriented_base(mesh, base)?;

    let right = side_edge(mesh, options, base, b, fresh, &[base], journal)?;
    let left = side_edge(mesh, options, base, a, fresh, &[base, right], journal)?;
    let c = mesh.edge(right).other_node(b);
    let d = mesh.edge(left).other_node(a);
    if c == d || c == a || d == b {
        log::trace!("sides of {base} meet at one node");
        return None;
    }

    let top = recover_edge(mesh, options, c, d, &[base, right, left], journal)?;
    // recovery may not touch the sides, but check they survived anyway
    if mesh.try_edge(right).is_none() || mesh.try_edge(left).is_none() {
        return None;
    }

    let corners = [a, b, c, d].map(|n| pos(mesh, n));
    if polygon_signed_area(&corners) <= COINCIDENCE_TOLERANCE {
        log::trace!("quad on {base} would be inverted or flat");
        return None;
    }
    let candidate = Quad::new(mesh, base, right, top, left);
    if candidate.is_bowtie(mesh) {
        log::trace!("quad on {base} would be a bowtie");
        return None;
    }
    if !candidate.is_convex(mesh) {
        log::trace!(
            "quad on {base} has a reflex corner ({:.1}°)",
            candidate.largest_angle().to_degrees()
        );
        return None;
    }

    let seed = mesh.front_triangle(base)?;
    let inside = candidate.interior_triangles(mesh, seed)?;
    let bounds = [base, right, top, left];
    let region = Region::collect(mesh, &inside, &bounds, &[a, b, c, d])?;
    if !allow_stranding && strands_a_triangle(mesh, &region, &bounds) {
        log::trace!("quad on {base} would strand a triangle");
        return None;
    }

    Some(commit(mesh, options, base, [right, top, left], region, [a, b, c, d]))
}

/// The base endpoints ordered so that its triangle lies to the left of a→b.
fn oriented_base(mesh: &Mesh, base: EdgeId) -> Option<(NodeId, NodeId)> {
    let tri = mesh.front_triangle(base)?;
    let apex = mesh.element(tri).opposite_node(mesh, base)?;
    let [l, r] = mesh.edge(base).nodes();
    if orient(&pos(mesh, l), &pos(mesh, r), &pos(mesh, apex)) > 0.0 {
        Some((l, r))
    } else {
        Some((r, l))
    }
}

/// The side of the quad leaving base end `at`.
///
/// The committed front neighbour is reused unless `at` is listed in `fresh`.
fn side_edge(
    mesh: &mut Mesh,
    options: &QMorphOptions,
    base: EdgeId,
    at: NodeId,
    fresh: &[NodeId],
    protected: &[EdgeId],
    journal: &mut SwapJournal,
) -> Option<EdgeId> {
    let edge = mesh.edge(base);
    if edge.side_at(at) && !fresh.contains(&at) {
        if let Some(nb) = edge.front_neighbor_at(at) {
            if mesh
                .try_edge(nb)
                .is_some_and(|x| x.is_front() && x.has_node(at))
            {
                return Some(nb);
            }
        }
    }

    let other = mesh.edge(base).other_node(at);
    let wedge = mesh.front_wedge(base, at)?;
    let p = pos(mesh, at);
    let tri = mesh.front_triangle(base)?;
    let apex = mesh.element(tri).opposite_node(mesh, base)?;
    let back = pos(mesh, other) - p;
    // the wedge sweeps from the base towards the apex side
    let turn = cross(&back, &(pos(mesh, apex) - p)).signum();
    let bisector = rotate(&back, turn * wedge.angle / 2.0);

    let deviation = |mesh: &Mesh, e: EdgeId| {
        angle_between(&(pos(mesh, mesh.edge(e).other_node(at)) - p), &bisector)
    };

    let best = wedge
        .interior_edges
        .iter()
        .copied()
        .filter(|e| !protected.contains(e))
        .map(|e| (e, deviation(mesh, e)))
        .min_by(|x, y| x.1.total_cmp(&y.1));
    if let Some((e, dev)) = best {
        if dev <= options.side_edge_tolerance {
            return Some(e);
        }
    }

    // swap the edge facing `at` in the triangle the bisector passes through
    let ray = Ray::new(p, bisector);
    let facing = wedge.triangles.iter().find_map(|&t| {
        let opposite = mesh.element(t).as_triangle()?.opposite_edge(at);
        ray.intersect_segment(&segment(mesh, opposite))
            .map(|_| opposite)
    });
    if let Some(facing) = facing {
        if !protected.contains(&facing) && mesh.can_swap(facing) {
            let diagonal = mesh.swap_to_and_set_elements_for(facing);
            let better = mesh.edge(diagonal).has_node(at)
                && best.map_or(true, |(_, d)| deviation(mesh, diagonal) < d);
            if better {
                journal.record(mesh, diagonal);
                log::trace!("swapped {facing} to align a side at {at}");
                return Some(diagonal);
            }
            mesh.swap_to_and_set_elements_for(diagonal);
        }
    }

    best.map(|(e, _)| e)
}

/// Make sure `c` and `d` are joined, swapping the diagonals in the way.
fn recover_edge(
    mesh: &mut Mesh,
    options: &QMorphOptions,
    c: NodeId,
    d: NodeId,
    protected: &[EdgeId],
    journal: &mut SwapJournal,
) -> Option<EdgeId> {
    for _ in 0..options.max_recovery_swaps {
        if let Some(e) = mesh.find_edge(c, d) {
            return Some(e);
        }
        let crossed = crossed_edges(mesh, c, d)?;
        let e = crossed
            .into_iter()
            .find(|e| !protected.contains(e) && mesh.can_swap(*e))?;
        journal.swap(mesh, e);
    }
    let found = mesh.find_edge(c, d);
    if found.is_none() {
        log::trace!("gave up recovering {c}-{d} after {} swaps", options.max_recovery_swaps);
    }
    found
}

/// Edges crossed by the segment c-d, walking through triangles from `c`.
///
/// `None` if the segment runs through a node, leaves the triangles or
/// crosses the front.
fn crossed_edges(mesh: &Mesh, c: NodeId, d: NodeId) -> Option<Vec<EdgeId>> {
    let (pc, pd) = (pos(mesh, c), pos(mesh, d));
    let target = Segment::new(pc, pd);

    for &e in mesh.node(c).edges() {
        let m = mesh.edge(e).other_node(c);
        let pm = pos(mesh, m);
        let ahead = (pm - pc).dot(&(pd - pc));
        if orient(&pc, &pd, &pm).abs() < COINCIDENCE_TOLERANCE && ahead > 0.0 && m != d {
            return None;
        }
    }

    let (mut tri, mut edge) = mesh.elements_at(c).into_iter().find_map(|el| {
        let opposite = mesh.element(el).as_triangle()?.opposite_edge(c);
        target
            .crosses(&segment(mesh, opposite))
            .then_some((el, opposite))
    })?;

    let mut crossed = Vec::new();
    for _ in 0..mesh.edges.len() {
        if mesh.edge(edge).is_front() {
            return None;
        }
        crossed.push(edge);
        let next = mesh.edge(edge).other_element(tri)?;
        let t = mesh.element(next).as_triangle()?;
        if t.has_node(d) {
            return Some(crossed);
        }
        let following = t
            .edges()
            .iter()
            .copied()
            .find(|&x| x != edge && target.crosses(&segment(mesh, x)))?;
        tri = next;
        edge = following;
    }
    None
}

/// Everything strictly inside a candidate quad.
struct Region {
    triangles: Vec<ElementId>,
    edges: Vec<EdgeId>,
    nodes: Vec<NodeId>,
}

impl Region {
    /// Gather the enclosed edges and nodes, refusing a region whose inner
    /// nodes connect to anything outside it.
    fn collect(
        mesh: &Mesh,
        triangles: &[ElementId],
        bounds: &[EdgeId],
        corners: &[NodeId],
    ) -> Option<Self> {
        let mut edges: HashSet<EdgeId> = HashSet::new();
        let mut nodes: HashSet<NodeId> = HashSet::new();
        for &t in triangles {
            let el = mesh.element(t);
            edges.extend(el.edges().iter().filter(|e| !bounds.contains(e)));
            nodes.extend(el.nodes().iter().filter(|n| !corners.contains(n)));
        }
        for &n in &nodes {
            if mesh.node(n).edges().iter().any(|e| !edges.contains(e)) {
                return None;
            }
        }
        let mut edges: Vec<EdgeId> = edges.into_iter().collect();
        let mut nodes: Vec<NodeId> = nodes.into_iter().collect();
        edges.sort();
        nodes.sort();
        Some(Self {
            triangles: triangles.to_vec(),
            edges,
            nodes,
        })
    }
}

/// Whether a triangle just outside the region would be left with no
/// triangle neighbour once the region becomes a quad.
fn strands_a_triangle(mesh: &Mesh, region: &Region, bounds: &[EdgeId]) -> bool {
    bounds.iter().any(|&e| {
        let Some(outside) = mesh
            .edge(e)
            .elements
            .iter()
            .flatten()
            .copied()
            .find(|el| !region.triangles.contains(el))
        else {
            return false;
        };
        let element = mesh.element(outside);
        if !element.is_triangle() {
            return false;
        }
        !element.edges().iter().any(|&x| {
            x != e
                && mesh
                    .edge(x)
                    .other_element(outside)
                    .is_some_and(|t| mesh.element(t).is_triangle() && !region.triangles.contains(&t))
        })
    })
}

fn commit(
    mesh: &mut Mesh,
    options: &QMorphOptions,
    base: EdgeId,
    [right, top, left]: [EdgeId; 3],
    region: Region,
    corners: [NodeId; 4],
) -> Built {
    let level = mesh.edge(base).level();

    for &t in &region.triangles {
        mesh.remove_element(t);
    }
    for &e in &region.edges {
        mesh.remove_edge(e);
    }
    for &n in &region.nodes {
        mesh.remove_node(n);
    }
    let quad = mesh.add_quad(base, right, top, left);

    let mut promoted = Vec::new();
    let mut retired = Vec::new();
    for e in [base, right, top, left] {
        let open = mesh.front_triangle(e).is_some();
        let on_front = mesh.edge(e).is_front();
        if open && !on_front {
            mesh.promote_to_front(e, level + 1);
            promoted.push(e);
        } else if !open && on_front {
            mesh.demote_front(e);
            retired.push(e);
        }
    }

    if options.smooth {
        smooth_quad_corners(mesh, options, quad);
    }
    reclassify_around(mesh, options, &corners);

    Built {
        quad,
        promoted,
        retired,
        swaps: 0,
        absorbed: region.triangles.len(),
    }
}

/// Reclassify the front edges at `nodes` and at the far ends of those edges.
pub(crate) fn reclassify_around(mesh: &mut Mesh, options: &QMorphOptions, nodes: &[NodeId]) {
    let mut touched: Vec<EdgeId> = Vec::new();
    for &n in nodes {
        for e in mesh.front_edges_at(n) {
            if !touched.contains(&e) {
                touched.push(e);
            }
            let far = mesh.edge(e).other_node(n);
            for f in mesh.front_edges_at(far) {
                if !touched.contains(&f) {
                    touched.push(f);
                }
            }
        }
    }
    for e in touched {
        mesh.classify_state_of_front_edge(e, options.side_angle_threshold);
    }
}
