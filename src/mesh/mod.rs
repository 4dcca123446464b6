//! Core mesh data structures.
//!
//! This module provides the connectivity registry the Q-Morph engine
//! operates on: nodes, edges and elements (triangles and quads) with mutual
//! back-references, plus the advancing-front state buckets.
//!
//! # Overview
//!
//! The primary type is [`Mesh`], an arena of [`Node`]s, [`Edge`]s and
//! [`Element`]s. Nodes list their incident edges; edges name their two
//! endpoints and up to two adjacent elements; elements list their bounding
//! edges and corner nodes. Every operation keeps these references in
//! agreement, which [`Mesh::is_valid`] checks.
//!
//! # Index Types
//!
//! Entities are identified by type-safe handles:
//! - [`NodeId`] - Identifies a node
//! - [`EdgeId`] - Identifies an edge
//! - [`ElementId`] - Identifies a triangle or quad
//!
//! # Construction
//!
//! Meshes are typically built from record files or from flat coordinate
//! arrays:
//!
//! ```
//! use qmorph::mesh::{build_from_triangles, Mesh};
//!
//! let mesh: Mesh = build_from_triangles(&[[0.0, 0.0, 1.0, 0.0, 0.5, 1.0]]).unwrap();
//! assert_eq!(mesh.num_triangles(), 1);
//! ```

mod builder;
mod edge;
mod element;
mod front;
mod index;
mod node;
mod ops;
mod pattern;
mod quad;
mod registry;
mod triangle;

pub use builder::{build_from_records, build_from_triangles, to_records, ElementRecord};
pub use edge::{canonical_order, Edge, End};
pub use element::{corner_angles, triangle_distortion, Element, ElementShape};
pub use front::{FrontStates, Wedge};
pub use index::{EdgeId, ElementId, NodeId};
pub use node::Node;
pub use pattern::{pattern_match, Valence};
pub use quad::Quad;
pub use registry::Mesh;
pub use triangle::Triangle;
