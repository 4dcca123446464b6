//! Node smoothing proposals.
//!
//! Each function computes a candidate position for one node from its current
//! neighbourhood and returns it without touching the mesh. Deciding whether
//! the move is acceptable (no inverted or degenerate element) is left to the
//! caller; see the engine's local smoothing pass.
//!
//! # Algorithms
//!
//! - [`laplacian`]: centroid of the neighbours
//! - [`laplacian_excluding`]: centroid ignoring a given set of neighbours
//! - [`length_weighted_laplacian`]: neighbours weighted by edge length
//! - [`blacker`]: advancing-front variant for nodes on the front
//!
//! # Example
//!
//! ```
//! use qmorph::algo::smooth::laplacian;
//! use qmorph::mesh::build_from_triangles;
//!
//! let mesh = build_from_triangles(&[
//!     [0.0, 0.0, 2.0, 0.0, 0.3, 0.4],
//!     [2.0, 0.0, 2.0, 2.0, 0.3, 0.4],
//!     [2.0, 2.0, 0.0, 2.0, 0.3, 0.4],
//!     [0.0, 2.0, 0.0, 0.0, 0.3, 0.4],
//! ])
//! .unwrap();
//! let centre = mesh.node_ids().find(|&n| mesh.node(n).x() == 0.3).unwrap();
//!
//! let p = laplacian(&mesh, centre);
//! assert!((p.x - 1.0).abs() < 1e-12 && (p.y - 1.0).abs() < 1e-12);
//! ```

use nalgebra::{Point2, Vector2};

use crate::mesh::{ElementShape, Mesh, NodeId, Quad};

/// Centroid of the neighbours of `n`.
///
/// An isolated node stays where it is.
pub fn laplacian(mesh: &Mesh, n: NodeId) -> Point2<f64> {
    laplacian_excluding(mesh, n, &[])
}

/// Centroid of the neighbours of `n`, ignoring those in `exclude`.
pub fn laplacian_excluding(mesh: &Mesh, n: NodeId, exclude: &[NodeId]) -> Point2<f64> {
    let pos = *mesh.node(n).position();

    let mut centroid = Vector2::zeros();
    let mut count = 0;
    for &e in mesh.node(n).edges() {
        let m = mesh.edge(e).other_node(n);
        if exclude.contains(&m) {
            continue;
        }
        centroid += mesh.node(m).position().coords;
        count += 1;
    }

    if count == 0 {
        return pos;
    }
    Point2::from(centroid / count as f64)
}

/// Length-weighted Laplacian: `p + Σ|Cj|·Cj / Σ|Cj|` with `Cj = pj - p`.
///
/// Long edges pull harder, which evens out edge lengths around the node.
pub fn length_weighted_laplacian(mesh: &Mesh, n: NodeId) -> Point2<f64> {
    let pos = *mesh.node(n).position();

    let mut weighted = Vector2::zeros();
    let mut total = 0.0;
    for &e in mesh.node(n).edges() {
        let c = mesh.node(mesh.edge(e).other_node(n)).position() - pos;
        let len = c.norm();
        weighted += c * len;
        total += len;
    }

    if total <= 0.0 {
        return pos;
    }
    pos + weighted / total
}

/// Advancing-front smoothing for a front node with a single adjacent quad.
///
/// Blends two moves:
/// - the isoparametric move to `n1 + n3 - n2`, where `n1` and `n3` are the
///   quad corners next to `n` and `n2` the one opposite;
/// - a length correction along the quad side that leaves the front at `n`,
///   placing the node at the mean length of its front edges from the side's
///   far end.
///
/// Returns `None` if `n` is not a corner of `quad` or both quad edges at `n`
/// lie on the front.
pub fn blacker(mesh: &Mesh, n: NodeId, quad: &Quad) -> Option<Point2<f64>> {
    let nodes = quad.nodes();
    let k = nodes.len();
    if k != 4 {
        return None;
    }
    let i = nodes.iter().position(|&x| x == n)?;
    let pos = *mesh.node(n).position();
    let at = |j: usize| *mesh.node(nodes[(i + j) % k]).position();

    let iso = Point2::from(at(1).coords + at(3).coords - at(2).coords);

    // the quad edge at n that goes back into the converted region
    let edges = quad.edges();
    let side = [edges[i], edges[(i + k - 1) % k]]
        .into_iter()
        .find(|&e| !mesh.edge(e).is_front())?;
    let far = *mesh.node(mesh.edge(side).other_node(n)).position();

    let front = mesh.front_edges_at(n);
    let ideal = if front.is_empty() {
        mesh.edge(side).length()
    } else {
        front.iter().map(|&e| mesh.edge(e).length()).sum::<f64>() / front.len() as f64
    };

    let towards = iso - far;
    let dist = towards.norm();
    if dist <= f64::EPSILON {
        return Some(iso);
    }
    let corrected = far + towards * (ideal / dist);

    Some(pos + ((iso - pos) + (corrected - pos)) * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;

    fn fan(centre: (f64, f64)) -> (Mesh, NodeId) {
        let (cx, cy) = centre;
        let mesh = build_from_triangles(&[
            [0.0, 0.0, 2.0, 0.0, cx, cy],
            [2.0, 0.0, 2.0, 2.0, cx, cy],
            [2.0, 2.0, 0.0, 2.0, cx, cy],
            [0.0, 2.0, 0.0, 0.0, cx, cy],
        ])
        .unwrap();
        let n = mesh
            .node_ids()
            .find(|&n| mesh.node(n).x() == cx && mesh.node(n).y() == cy)
            .unwrap();
        (mesh, n)
    }

    #[test]
    fn test_laplacian_centroid() {
        let (mesh, n) = fan((0.5, 1.5));
        let p = laplacian(&mesh, n);
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
        // proposal only: the node itself has not moved
        assert_eq!(mesh.node(n).x(), 0.5);
    }

    #[test]
    fn test_laplacian_excluding() {
        let (mesh, n) = fan((1.0, 1.0));
        let skip: Vec<NodeId> = mesh
            .node_ids()
            .filter(|&m| mesh.node(m).y() == 2.0)
            .collect();
        let p = laplacian_excluding(&mesh, n, &skip);
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
    }

    #[test]
    fn test_length_weighted_symmetric_is_fixed_point() {
        let (mesh, n) = fan((1.0, 1.0));
        let p = length_weighted_laplacian(&mesh, n);
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_weighted_moves_towards_far_side() {
        let (mesh, n) = fan((0.5, 1.0));
        let p = length_weighted_laplacian(&mesh, n);
        assert!(p.x > 0.5);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_blacker_on_parallelogram_row() {
        // a quad on the bottom row with its top corner pulled off position
        let mut mesh = crate::mesh::build_from_records(&[
            crate::mesh::ElementRecord::Quad([
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.3, 1.2),
                Point2::new(0.0, 1.0),
            ]),
            crate::mesh::ElementRecord::Triangle([
                Point2::new(0.0, 1.0),
                Point2::new(1.3, 1.2),
                Point2::new(0.5, 2.0),
            ]),
        ])
        .unwrap();
        let c = mesh
            .node_ids()
            .find(|&n| mesh.node(n).x() == 1.3)
            .unwrap();
        let d = mesh
            .node_ids()
            .find(|&n| mesh.node(n).x() == 0.0 && mesh.node(n).y() == 1.0)
            .unwrap();
        let top = mesh.find_edge(c, d).unwrap();
        mesh.promote_to_front(top, 1);
        let outer = mesh
            .node_ids()
            .find(|&n| mesh.node(n).y() == 2.0)
            .unwrap();
        let up = mesh.find_edge(c, outer).unwrap();
        mesh.promote_to_front(up, 0);

        let quad = mesh
            .element_ids()
            .find_map(|el| mesh.element(el).as_quad().cloned())
            .unwrap();
        let p = blacker(&mesh, c, &quad).unwrap();

        // the isoparametric target is (1, 1); the result moves towards it
        let before = (mesh.node(c).position() - Point2::new(1.0, 1.0)).norm();
        let after = (p - Point2::new(1.0, 1.0)).norm();
        assert!(after < before);
        // a node outside the quad has no proposal
        assert!(blacker(&mesh, outer, &quad).is_none());
    }
}
