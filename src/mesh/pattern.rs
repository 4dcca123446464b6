//! Node valence and neighbourhood pattern matching.
//!
//! A node's *pattern* is its own valence followed by the valences of its
//! neighbours in counter-clockwise order. Cleanup rules describe the
//! configurations they rewrite as small templates over such patterns.
//!
//! # Example
//!
//! ```
//! use qmorph::mesh::{pattern_match, Valence};
//!
//! // a valence-3 node whose neighbours are 5, 4, 4 in some rotation
//! let pattern = [3, 4, 5, 4];
//! let template = [Valence::Exact(3), Valence::Exact(5), Valence::Any, Valence::AtLeast(4)];
//! assert_eq!(pattern_match(&pattern, &template), Some(1));
//! ```

use std::f64::consts::FRAC_PI_2;

use super::element::ElementShape;
use super::index::NodeId;
use super::registry::Mesh;

/// One entry of a pattern template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Valence {
    /// Exactly this valence.
    Exact(u8),
    /// This valence or more.
    AtLeast(u8),
    /// Anything.
    Any,
}

impl Valence {
    /// Whether `v` satisfies this entry.
    #[inline]
    pub fn matches(self, v: u8) -> bool {
        match self {
            Valence::Exact(x) => v == x,
            Valence::AtLeast(x) => v >= x,
            Valence::Any => true,
        }
    }
}

/// Find the rotation under which `pattern` fits `template`.
///
/// Both start with the centre entry, which is compared directly. The
/// neighbour entries are compared cyclically; the returned offset `r` means
/// template neighbour `i` matched pattern neighbour `(i + r) % k`. The
/// smallest such offset is reported.
pub fn pattern_match(pattern: &[u8], template: &[Valence]) -> Option<usize> {
    if pattern.is_empty() || pattern.len() != template.len() {
        return None;
    }
    if !template[0].matches(pattern[0]) {
        return None;
    }
    let ring = &pattern[1..];
    let want = &template[1..];
    let k = ring.len();
    if k == 0 {
        return Some(0);
    }
    (0..k).find(|&r| {
        want.iter()
            .enumerate()
            .all(|(i, t)| t.matches(ring[(i + r) % k]))
    })
}

impl Mesh {
    /// Sum of the interior angles of the elements around `n`.
    pub fn angle_sum(&self, n: NodeId) -> f64 {
        self.elements_at(n)
            .into_iter()
            .map(|el| self.element(el).angle_at(n))
            .sum()
    }

    /// Valence of `n`, normalised so that 4 is ideal everywhere.
    ///
    /// Interior nodes count their edges. Boundary nodes count their edges plus
    /// the number missing for the interior angle they span: a straight
    /// boundary node with three edges and a right-angle corner with two both
    /// score 4.
    pub fn valence(&self, n: NodeId) -> u8 {
        let edges = self.node(n).edges().len();
        let v = if self.is_boundary_node(n) {
            let quarter_turns = (self.angle_sum(n) / FRAC_PI_2).round() as usize;
            (edges + 3).saturating_sub(quarter_turns)
        } else {
            edges
        };
        v.min(u8::MAX as usize) as u8
    }

    /// Own valence followed by the neighbours' valences in cyclic order.
    ///
    /// The result is cached on the node until its neighbourhood changes.
    pub fn valence_pattern(&mut self, n: NodeId) -> Vec<u8> {
        if let Some(cached) = self.node(n).cached_pattern() {
            return cached.to_vec();
        }
        let mut pattern = vec![self.valence(n)];
        pattern.extend(
            self.ordered_neighbors(n)
                .into_iter()
                .map(|m| self.valence(m)),
        );
        self.node_mut(n).pattern = Some(pattern.clone());
        pattern
    }
}
