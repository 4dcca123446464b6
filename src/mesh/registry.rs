//! The mesh registry: arenas of nodes, edges and elements.
//!
//! Every operation in the crate takes the registry explicitly. Removed
//! entities leave a hole in their arena so handles stay stable for the whole
//! run; nothing is compacted behind the caller's back.
//!
//! Accessors panic on a removed or foreign handle. Such a handle can only
//! come from a bug elsewhere, so it is treated as an invariant violation.

use std::collections::HashSet;

use nalgebra::Point2;

use super::edge::Edge;
use super::element::{Element, ElementShape};
use super::front::FrontStates;
use super::index::{EdgeId, ElementId, NodeId};
use super::node::Node;
use super::quad::Quad;
use super::triangle::Triangle;
use crate::error::invariant_violation;

/// Planar mesh of triangles and quads with explicit connectivity.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub(crate) nodes: Vec<Option<Node>>,
    pub(crate) edges: Vec<Option<Edge>>,
    pub(crate) elements: Vec<Option<Element>>,

    /// Front edges partitioned by state.
    pub(crate) front: FrontStates,
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with room for the given number of nodes and elements.
    pub fn with_capacity(num_nodes: usize, num_elements: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(num_nodes),
            // three edges per triangle, halved for sharing, plus at most one
            // unshared boundary edge per node
            edges: Vec::with_capacity(num_elements * 3 / 2 + num_nodes),
            elements: Vec::with_capacity(num_elements),
            front: FrontStates::default(),
        }
    }

    // ==================== Accessors ====================

    /// Get a node.
    ///
    /// # Panics
    /// Panics if the node was removed.
    #[inline]
    pub fn node(&self, n: NodeId) -> &Node {
        match self.nodes.get(n.index()) {
            Some(Some(node)) => node,
            _ => invariant_violation(format!("node {n} does not exist")),
        }
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, n: NodeId) -> &mut Node {
        match self.nodes.get_mut(n.index()) {
            Some(Some(node)) => node,
            _ => invariant_violation(format!("node {n} does not exist")),
        }
    }

    /// Get an edge.
    ///
    /// # Panics
    /// Panics if the edge was removed.
    #[inline]
    pub fn edge(&self, e: EdgeId) -> &Edge {
        match self.edges.get(e.index()) {
            Some(Some(edge)) => edge,
            _ => invariant_violation(format!("edge {e} does not exist")),
        }
    }

    #[inline]
    pub(crate) fn edge_mut(&mut self, e: EdgeId) -> &mut Edge {
        match self.edges.get_mut(e.index()) {
            Some(Some(edge)) => edge,
            _ => invariant_violation(format!("edge {e} does not exist")),
        }
    }

    /// Get an element.
    ///
    /// # Panics
    /// Panics if the element was removed.
    #[inline]
    pub fn element(&self, el: ElementId) -> &Element {
        match self.elements.get(el.index()) {
            Some(Some(element)) => element,
            _ => invariant_violation(format!("element {el} does not exist")),
        }
    }

    #[inline]
    pub(crate) fn element_mut(&mut self, el: ElementId) -> &mut Element {
        match self.elements.get_mut(el.index()) {
            Some(Some(element)) => element,
            _ => invariant_violation(format!("element {el} does not exist")),
        }
    }

    /// Get a node if the handle is live.
    pub fn try_node(&self, n: NodeId) -> Option<&Node> {
        self.nodes.get(n.index()).and_then(Option::as_ref)
    }

    /// Get an edge if the handle is live.
    pub fn try_edge(&self, e: EdgeId) -> Option<&Edge> {
        self.edges.get(e.index()).and_then(Option::as_ref)
    }

    /// Get an element if the handle is live.
    pub fn try_element(&self, el: ElementId) -> Option<&Element> {
        self.elements.get(el.index()).and_then(Option::as_ref)
    }

    // ==================== Iteration ====================

    /// Live node handles in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| NodeId::new(i))
    }

    /// Live edge handles in creation order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_some())
            .map(|(i, _)| EdgeId::new(i))
    }

    /// Live element handles in creation order.
    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_some())
            .map(|(i, _)| ElementId::new(i))
    }

    /// Number of live nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Number of live edges.
    pub fn num_edges(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    /// Number of live elements.
    pub fn num_elements(&self) -> usize {
        self.elements.iter().flatten().count()
    }

    /// Number of live triangles.
    pub fn num_triangles(&self) -> usize {
        self.elements.iter().flatten().filter(|e| e.is_triangle()).count()
    }

    /// Number of live quads, fake quads included.
    pub fn num_quads(&self) -> usize {
        self.elements.iter().flatten().filter(|e| e.is_quad()).count()
    }

    /// Whether the mesh has no elements.
    pub fn is_empty(&self) -> bool {
        self.num_elements() == 0
    }

    // ==================== Nodes ====================

    /// Add an unconnected node.
    pub fn add_node(&mut self, position: Point2<f64>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Some(Node::new(position)));
        id
    }

    /// Remove a node that no edge references any more.
    ///
    /// # Panics
    /// Panics if the node still has incident edges.
    pub fn remove_node(&mut self, n: NodeId) {
        if !self.node(n).edges.is_empty() {
            invariant_violation(format!("cannot remove node {n} while it has incident edges"));
        }
        self.nodes[n.index()] = None;
    }

    /// Move a node and refresh everything cached from its position.
    ///
    /// Lengths and canonical order of the incident edges, interior angles of
    /// every element around the node and the valence patterns of the node and
    /// its neighbours are brought up to date.
    pub fn set_position(&mut self, n: NodeId, position: Point2<f64>) {
        self.node_mut(n).position = position;

        let incident = self.node(n).edges.clone();
        let mut touched: HashSet<ElementId> = HashSet::new();
        for &e in &incident {
            let (l, r) = (self.edge(e).left, self.edge(e).right);
            let (pl, pr) = (self.node(l).position, self.node(r).position);
            self.edge_mut(e).refresh(&pl, &pr);
            touched.extend(self.edge(e).elements.iter().flatten());

            let other = self.edge(e).other_node(n);
            self.node_mut(other).pattern = None;
        }
        self.node_mut(n).pattern = None;

        for el in touched {
            let angles = self.element(el).compute_angles(self);
            self.element_mut(el).set_angles(&angles);
        }
    }

    // ==================== Edges ====================

    /// The edge joining two nodes, if there is one.
    pub fn find_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.node(a)
            .edges
            .iter()
            .copied()
            .find(|&e| self.edge(e).has_node(b))
    }

    /// Add an edge between two nodes.
    ///
    /// # Panics
    /// Panics if the nodes are already joined.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> EdgeId {
        if let Some(existing) = self.find_edge(a, b) {
            invariant_violation(format!("nodes {a} and {b} are already joined by {existing}"));
        }
        let edge = Edge::new((a, &self.node(a).position), (b, &self.node(b).position));
        let id = EdgeId::new(self.edges.len());
        self.edges.push(Some(edge));
        self.node_mut(a).attach_edge(id);
        self.node_mut(b).attach_edge(id);
        id
    }

    /// The edge joining two nodes, created if missing.
    pub fn ensure_edge(&mut self, a: NodeId, b: NodeId) -> EdgeId {
        match self.find_edge(a, b) {
            Some(e) => e,
            None => self.add_edge(a, b),
        }
    }

    /// Remove an edge no element is attached to.
    ///
    /// The edge leaves its state bucket and both endpoints' incident lists.
    ///
    /// # Panics
    /// Panics if an element still references the edge.
    pub fn remove_edge(&mut self, e: EdgeId) {
        let edge = self.edge(e);
        if edge.element_count() > 0 {
            invariant_violation(format!("cannot remove edge {e} while elements reference it"));
        }
        let (l, r) = (edge.left, edge.right);
        if edge.front {
            self.front.remove(e);
        }
        self.node_mut(l).detach_edge(e);
        self.node_mut(r).detach_edge(e);
        self.edges[e.index()] = None;
    }

    // ==================== Elements ====================

    fn insert_element(&mut self, element: Element) -> ElementId {
        let id = ElementId::new(self.elements.len());
        for &e in element.edges() {
            self.edge_mut(e).connect_element(id);
        }
        for &n in element.nodes() {
            self.node_mut(n).pattern = None;
        }
        self.elements.push(Some(element));
        id
    }

    /// Add a triangle bounded by three existing edges.
    pub fn add_triangle(&mut self, e0: EdgeId, e1: EdgeId, e2: EdgeId) -> ElementId {
        let tri = Triangle::new(self, e0, e1, e2);
        self.insert_element(Element::Triangle(tri))
    }

    /// Add a quad bounded by four existing edges.
    pub fn add_quad(&mut self, base: EdgeId, right: EdgeId, top: EdgeId, left: EdgeId) -> ElementId {
        let quad = Quad::new(self, base, right, top, left);
        self.insert_element(Element::Quad(quad))
    }

    /// Add a fake quad wrapping the triangle bounded by three existing edges.
    pub fn add_fake_quad(&mut self, base: EdgeId, right: EdgeId, left: EdgeId) -> ElementId {
        let quad = Quad::fake(self, base, right, left);
        self.insert_element(Element::Quad(quad))
    }

    /// Detach an element from its edges and drop it.
    ///
    /// # Panics
    /// Panics if an edge does not reference the element back.
    pub fn remove_element(&mut self, el: ElementId) -> Element {
        let element = match self.elements.get_mut(el.index()).and_then(Option::take) {
            Some(element) => element,
            None => invariant_violation(format!("element {el} does not exist")),
        };
        for &e in element.edges() {
            self.edge_mut(e).disconnect_element(el);
        }
        for &n in element.nodes() {
            self.node_mut(n).pattern = None;
        }
        element
    }

    /// The element bounded by both edges, if any.
    pub fn shared_element(&self, e1: EdgeId, e2: EdgeId) -> Option<ElementId> {
        let other = self.edge(e2);
        self.edge(e1)
            .elements
            .iter()
            .flatten()
            .copied()
            .find(|&el| other.has_element(el))
    }

    /// Every element with a corner at `n`.
    pub fn elements_at(&self, n: NodeId) -> Vec<ElementId> {
        let mut out: Vec<ElementId> = Vec::new();
        for &e in &self.node(n).edges {
            for el in self.edge(e).elements.iter().flatten() {
                if !out.contains(el) {
                    out.push(*el);
                }
            }
        }
        out
    }

    // ==================== Validation ====================

    /// Check that every back-reference agrees with its forward reference.
    ///
    /// Nodes list exactly the edges naming them, elements are referenced by
    /// each of their edges, and edges only reference elements they bound.
    pub fn is_valid(&self) -> bool {
        for n in self.node_ids() {
            for &e in &self.node(n).edges {
                if !self.try_edge(e).is_some_and(|edge| edge.has_node(n)) {
                    return false;
                }
            }
        }
        for e in self.edge_ids() {
            let edge = self.edge(e);
            for n in edge.nodes() {
                if !self.try_node(n).is_some_and(|node| node.edges.contains(&e)) {
                    return false;
                }
            }
            for el in edge.elements.iter().flatten() {
                if !self.try_element(*el).is_some_and(|element| element.has_edge(e)) {
                    return false;
                }
            }
        }
        for el in self.element_ids() {
            for &e in self.element(el).edges() {
                let hits = self
                    .try_edge(e)
                    .map_or(0, |edge| edge.elements.iter().filter(|&&x| x == Some(el)).count());
                if hits != 1 {
                    return false;
                }
            }
        }
        true
    }

    /// Check that the state buckets hold exactly the front edges, each once,
    /// in the bucket matching its state.
    pub fn front_is_consistent(&self) -> bool {
        let mut seen: HashSet<EdgeId> = HashSet::new();
        for state in 0..3 {
            for &e in self.front.bucket(state) {
                let Some(edge) = self.try_edge(e) else {
                    return false;
                };
                if !edge.front || edge.state() != state || !seen.insert(e) {
                    return false;
                }
            }
        }
        self.edge_ids()
            .filter(|&e| self.edge(e).front)
            .all(|e| seen.contains(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn test_add_triangle_links_both_ways() {
        let mut mesh = Mesh::new();
        let a = mesh.add_node(p(0.0, 0.0));
        let b = mesh.add_node(p(1.0, 0.0));
        let c = mesh.add_node(p(0.0, 1.0));
        let ab = mesh.add_edge(a, b);
        let bc = mesh.add_edge(b, c);
        let ca = mesh.add_edge(c, a);
        let t = mesh.add_triangle(ab, bc, ca);

        assert_eq!(mesh.num_triangles(), 1);
        assert!(mesh.is_valid());
        for e in [ab, bc, ca] {
            assert!(mesh.edge(e).has_element(t));
        }
        assert_eq!(mesh.find_edge(c, b), Some(bc));
        assert_eq!(mesh.shared_element(ab, ca), Some(t));
        assert_eq!(mesh.elements_at(a), vec![t]);
    }

    #[test]
    fn test_remove_in_dependency_order() {
        let mut mesh = Mesh::new();
        let a = mesh.add_node(p(0.0, 0.0));
        let b = mesh.add_node(p(1.0, 0.0));
        let c = mesh.add_node(p(0.0, 1.0));
        let ab = mesh.add_edge(a, b);
        let bc = mesh.add_edge(b, c);
        let ca = mesh.add_edge(c, a);
        let t = mesh.add_triangle(ab, bc, ca);

        mesh.remove_element(t);
        assert!(mesh.try_element(t).is_none());
        assert_eq!(mesh.edge(ab).element_count(), 0);

        mesh.remove_edge(bc);
        assert_eq!(mesh.node(b).edges(), &[ab]);
        assert!(mesh.is_valid());

        mesh.remove_edge(ab);
        mesh.remove_node(b);
        assert_eq!(mesh.num_nodes(), 2);
        assert_eq!(mesh.num_edges(), 1);
        assert!(mesh.is_valid());
    }

    #[test]
    #[should_panic(expected = "elements reference it")]
    fn test_remove_attached_edge_is_fatal() {
        let mut mesh = Mesh::new();
        let a = mesh.add_node(p(0.0, 0.0));
        let b = mesh.add_node(p(1.0, 0.0));
        let c = mesh.add_node(p(0.0, 1.0));
        let ab = mesh.add_edge(a, b);
        let bc = mesh.add_edge(b, c);
        let ca = mesh.add_edge(c, a);
        mesh.add_triangle(ab, bc, ca);
        mesh.remove_edge(ab);
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn test_removed_handle_is_fatal() {
        let mut mesh = Mesh::new();
        let a = mesh.add_node(p(0.0, 0.0));
        mesh.remove_node(a);
        mesh.node(a);
    }

    #[test]
    #[should_panic(expected = "already joined")]
    fn test_duplicate_edge_is_fatal() {
        let mut mesh = Mesh::new();
        let a = mesh.add_node(p(0.0, 0.0));
        let b = mesh.add_node(p(1.0, 0.0));
        mesh.add_edge(a, b);
        mesh.add_edge(b, a);
    }

    #[test]
    fn test_set_position_refreshes_caches() {
        let mut mesh = Mesh::new();
        let a = mesh.add_node(p(0.0, 0.0));
        let b = mesh.add_node(p(1.0, 0.0));
        let c = mesh.add_node(p(0.0, 1.0));
        let ab = mesh.add_edge(a, b);
        let bc = mesh.add_edge(b, c);
        let ca = mesh.add_edge(c, a);
        let t = mesh.add_triangle(ab, bc, ca);
        assert_eq!(mesh.edge(ab).left(), a);

        mesh.set_position(a, p(2.0, 0.0));
        assert_eq!(mesh.edge(ab).left(), b);
        assert!((mesh.edge(ab).length() - 1.0).abs() < 1e-12);
        assert!((mesh.edge(ca).length() - 5.0_f64.sqrt()).abs() < 1e-12);

        let el = mesh.element(t);
        assert_eq!(el.angles().to_vec(), el.compute_angles(&mesh));
        // a moved across bc, so the triangle now winds clockwise
        assert!(el.inverted(&mesh));
    }
}
