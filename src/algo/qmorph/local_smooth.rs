//! Smoothing the corners of a freshly built quad.
//!
//! Front nodes with a single adjacent quad take the advancing-front proposal
//! from [`blacker`]; every other free node takes the length-weighted
//! Laplacian. A proposal is applied only if no element around the node ends
//! up inverted, flat or (for quads) crossed over itself; otherwise the move
//! is halved a few times and finally abandoned.

use nalgebra::Point2;

use super::options::QMorphOptions;
use crate::algo::smooth::{blacker, length_weighted_laplacian};
use crate::mesh::{ElementId, ElementShape, Mesh, NodeId};

/// Smooth every free corner of `quad`.
///
/// Returns how many corners moved.
pub(crate) fn smooth_quad_corners(mesh: &mut Mesh, options: &QMorphOptions, quad: ElementId) -> usize {
    let Some(corners) = mesh.element(quad).as_quad().map(|q| q.nodes().to_vec()) else {
        return 0;
    };
    let mut moved = 0;
    for n in corners {
        if !mesh.node(n).is_fixed() && smooth_node(mesh, options, n, quad) {
            moved += 1;
        }
    }
    moved
}

fn smooth_node(mesh: &mut Mesh, options: &QMorphOptions, n: NodeId, quad: ElementId) -> bool {
    let target = proposal(mesh, n, quad);
    try_move(mesh, n, target, options.smoothing_step_backs)
}

fn proposal(mesh: &Mesh, n: NodeId, quad: ElementId) -> Point2<f64> {
    let front = mesh.front_edges_at(n).len();
    let quads = mesh
        .elements_at(n)
        .into_iter()
        .filter(|&el| mesh.element(el).is_quad())
        .count();

    if front > 0 && front <= 2 && quads == 1 {
        if let Some(q) = mesh.element(quad).as_quad() {
            if let Some(p) = blacker(mesh, n, q) {
                return p;
            }
        }
    }
    length_weighted_laplacian(mesh, n)
}

/// Move `n` towards `target`, halving the step until the neighbourhood
/// stays valid. The node is put back if every step fails.
fn try_move(mesh: &mut Mesh, n: NodeId, target: Point2<f64>, step_backs: usize) -> bool {
    let original = *mesh.node(n).position();
    let mut candidate = target;

    for _ in 0..=step_backs {
        mesh.set_position(n, candidate);
        if neighbourhood_is_valid(mesh, n) {
            log::trace!(
                "smoothed {n}: ({:.4}, {:.4}) -> ({:.4}, {:.4})",
                original.x,
                original.y,
                candidate.x,
                candidate.y
            );
            return true;
        }
        candidate = original + (candidate - original) * 0.5;
    }

    mesh.set_position(n, original);
    false
}

fn neighbourhood_is_valid(mesh: &Mesh, n: NodeId) -> bool {
    mesh.elements_at(n).into_iter().all(|el| {
        let element = mesh.element(el);
        if element.is_invalid(mesh) {
            return false;
        }
        element.as_quad().map_or(true, |q| !q.is_bowtie(mesh))
    })
}
