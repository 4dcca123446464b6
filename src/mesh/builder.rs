//! Mesh construction utilities.
//!
//! This module builds the connectivity registry from plain element lists:
//! either flat triangle coordinate arrays, convenient for programmatic
//! loading, or parsed [`ElementRecord`]s as produced by the record reader.
//! Corners that coincide are merged into one node and shared sides into one
//! edge.

use std::collections::HashMap;

use nalgebra::Point2;

use super::element::ElementShape;
use super::index::NodeId;
use super::registry::Mesh;
use crate::error::{MeshError, Result};
use crate::geom::{polygon_signed_area, COINCIDENCE_TOLERANCE};

/// One input element given by its corner coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementRecord {
    /// Three corners.
    Triangle([Point2<f64>; 3]),
    /// Four corners, in walk order.
    Quad([Point2<f64>; 4]),
}

impl ElementRecord {
    /// The corners in the order given.
    pub fn corners(&self) -> &[Point2<f64>] {
        match self {
            ElementRecord::Triangle(c) => c,
            ElementRecord::Quad(c) => c,
        }
    }
}

/// Build a mesh from triangles given as `[x0, y0, x1, y1, x2, y2]`.
///
/// # Example
/// ```
/// use qmorph::mesh::build_from_triangles;
///
/// let mesh = build_from_triangles(&[
///     [0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
///     [1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
/// ])
/// .unwrap();
/// assert_eq!(mesh.num_nodes(), 4);
/// assert_eq!(mesh.num_edges(), 5);
/// assert_eq!(mesh.num_triangles(), 2);
/// ```
pub fn build_from_triangles(triangles: &[[f64; 6]]) -> Result<Mesh> {
    let records: Vec<ElementRecord> = triangles
        .iter()
        .map(|t| {
            ElementRecord::Triangle([
                Point2::new(t[0], t[1]),
                Point2::new(t[2], t[3]),
                Point2::new(t[4], t[5]),
            ])
        })
        .collect();
    build_from_records(&records)
}

/// Build a mesh from element records.
///
/// # Errors
/// - [`MeshError::EmptyMesh`] if there are no records.
/// - [`MeshError::DegenerateElement`] if an element repeats a corner or has
///   zero area.
/// - [`MeshError::NonManifoldEdge`] if a side would be shared by a third
///   element.
pub fn build_from_records(records: &[ElementRecord]) -> Result<Mesh> {
    if records.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let mut mesh = Mesh::with_capacity(records.len() * 2, records.len());
    let mut node_map: HashMap<(u64, u64), NodeId> = HashMap::new();

    for (ri, record) in records.iter().enumerate() {
        let corners = record.corners();
        if polygon_signed_area(corners).abs() < COINCIDENCE_TOLERANCE {
            return Err(MeshError::DegenerateElement { element: ri });
        }

        let nodes: Vec<NodeId> = corners
            .iter()
            .map(|p| find_or_add_node(&mut mesh, &mut node_map, *p))
            .collect();
        for i in 0..nodes.len() {
            if nodes[i + 1..].contains(&nodes[i]) {
                return Err(MeshError::DegenerateElement { element: ri });
            }
        }

        let k = nodes.len();
        let mut sides = Vec::with_capacity(k);
        for i in 0..k {
            let (a, b) = (nodes[i], nodes[(i + 1) % k]);
            let e = mesh.ensure_edge(a, b);
            if mesh.edge(e).element_count() == 2 {
                let (pa, pb) = (corners[i], corners[(i + 1) % k]);
                return Err(MeshError::NonManifoldEdge {
                    element: ri,
                    x0: pa.x,
                    y0: pa.y,
                    x1: pb.x,
                    y1: pb.y,
                });
            }
            sides.push(e);
        }

        match record {
            ElementRecord::Triangle(_) => mesh.add_triangle(sides[0], sides[1], sides[2]),
            ElementRecord::Quad(_) => mesh.add_quad(sides[0], sides[1], sides[2], sides[3]),
        };
    }

    log::debug!(
        "built mesh: {} nodes, {} edges, {} elements",
        mesh.num_nodes(),
        mesh.num_edges(),
        mesh.num_elements()
    );
    Ok(mesh)
}

/// Merge corners with identical coordinates (signed zeros folded together).
fn find_or_add_node(
    mesh: &mut Mesh,
    node_map: &mut HashMap<(u64, u64), NodeId>,
    p: Point2<f64>,
) -> NodeId {
    // -0.0 + 0.0 == +0.0, so both zeros share a key
    let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
    *node_map.entry(key).or_insert_with(|| mesh.add_node(p))
}

/// Convert a mesh back to element records, corners counter-clockwise.
///
/// Fake quads are written as triangles.
pub fn to_records(mesh: &Mesh) -> Vec<ElementRecord> {
    mesh.element_ids()
        .map(|el| {
            let pts = mesh.element(el).positions(mesh);
            match pts[..] {
                [a, b, c, d] => ElementRecord::Quad([a, b, c, d]),
                _ => ElementRecord::Triangle([pts[0], pts[1], pts[2]]),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn test_single_triangle() {
        let mesh = build_from_triangles(&[[0.0, 0.0, 1.0, 0.0, 0.5, 1.0]]).unwrap();
        assert_eq!(mesh.num_nodes(), 3);
        assert_eq!(mesh.num_edges(), 3);
        assert_eq!(mesh.num_triangles(), 1);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_shared_corners_and_sides_merge() {
        let mesh = build_from_triangles(&[
            [0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        ])
        .unwrap();
        assert_eq!(mesh.num_nodes(), 4);
        assert_eq!(mesh.num_edges(), 5);
        let interior = mesh.edge_ids().filter(|&e| mesh.edge(e).is_interior()).count();
        assert_eq!(interior, 1);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_signed_zero_merges() {
        let mesh = build_from_triangles(&[
            [0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            [1.0, -0.0, 1.0, 1.0, -0.0, 1.0],
        ])
        .unwrap();
        assert_eq!(mesh.num_nodes(), 4);
    }

    #[test]
    fn test_clockwise_input_is_reoriented() {
        let mesh = build_from_triangles(&[[0.0, 0.0, 0.0, 1.0, 1.0, 0.0]]).unwrap();
        let el = mesh.element_ids().next().unwrap();
        assert!(mesh.element(el).signed_area(&mesh) > 0.0);
    }

    #[test]
    fn test_mixed_records() {
        let mesh = build_from_records(&[
            ElementRecord::Quad([p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]),
            ElementRecord::Triangle([p(1.0, 0.0), p(2.0, 0.5), p(1.0, 1.0)]),
        ])
        .unwrap();
        assert_eq!(mesh.num_quads(), 1);
        assert_eq!(mesh.num_triangles(), 1);
        assert_eq!(mesh.num_edges(), 6);
        assert!(mesh.is_valid());

        let records = to_records(&mesh);
        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], ElementRecord::Quad(_)));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(build_from_triangles(&[]), Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_degenerate_input() {
        let err = build_from_triangles(&[
            [0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0, 0.0, 2.0, 0.0],
        ])
        .unwrap_err();
        assert!(matches!(err, MeshError::DegenerateElement { element: 1 }));

        let err = build_from_records(&[ElementRecord::Quad([
            p(0.0, 0.0),
            p(1.0, 0.0),
            p(1.0, 0.0),
            p(0.0, 1.0),
        ])])
        .unwrap_err();
        assert!(matches!(err, MeshError::DegenerateElement { element: 0 }));
    }

    #[test]
    fn test_non_manifold_input() {
        let err = build_from_triangles(&[
            [0.0, 0.0, 1.0, 0.0, 0.5, 1.0],
            [0.0, 0.0, 1.0, 0.0, 0.5, -1.0],
            [0.0, 0.0, 1.0, 0.0, 0.5, 2.0],
        ])
        .unwrap_err();
        assert!(matches!(err, MeshError::NonManifoldEdge { element: 2, .. }));
    }
}
